//! Key paths into nested JSON values.
//!
//! A key path addresses a field inside a structured value. Both dotted and
//! bracketed forms are accepted and can be mixed:
//!
//! | Path | Segments |
//! |------|----------|
//! | `user.active` | `user`, `active` |
//! | `items[0].id` | `items`, `0`, `id` |
//! | `[0].user` | `0`, `user` |
//! | `headers["x-request-id"]` | `headers`, `x-request-id` |
//!
//! Resolution never fails: a missing segment yields `None`.

use serde_json::Value;
use std::fmt;

/// One step of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named field. Also indexes arrays when the name is numeric.
    Key(String),
    /// A numeric index. Also addresses object fields named by the number.
    Index(usize),
}

impl Segment {
    fn from_raw(raw: &str) -> Self {
        match raw.parse::<usize>() {
            Ok(index) if is_canonical_index(raw) => Self::Index(index),
            _ => Self::Key(raw.to_string()),
        }
    }

    /// Returns the array index this segment addresses, if any.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Key(key) if is_canonical_index(key) => key.parse().ok(),
            Self::Key(_) => None,
        }
    }

    /// Looks this segment up in a single value.
    #[must_use]
    pub fn get<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match (self, value) {
            (Self::Key(key), Value::Object(map)) => map.get(key),
            (Self::Index(index), Value::Object(map)) => map.get(&index.to_string()),
            (segment, Value::Array(items)) => segment.as_index().and_then(|i| items.get(i)),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

// "01" is a field name, not index 1.
fn is_canonical_index(raw: &str) -> bool {
    !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && (raw == "0" || !raw.starts_with('0'))
}

/// A parsed key path.
///
/// # Example
///
/// ```
/// use flowgate_core::KeyPath;
/// use serde_json::json;
///
/// let value = json!({ "items": [{ "id": 7 }] });
/// let path = KeyPath::parse("items[0].id");
///
/// assert_eq!(path.resolve(&value), Some(&json!(7)));
/// assert_eq!(KeyPath::parse("items[1].id").resolve(&value), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    raw: String,
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Parses a dotted/bracketed key path.
    ///
    /// Parsing is lenient: an unterminated bracket takes the rest of the
    /// input as its segment, and empty segments are dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '.' => flush(&mut current, &mut segments),
                '[' => {
                    flush(&mut current, &mut segments);
                    let quote = match chars.peek() {
                        Some(&q @ ('"' | '\'')) => {
                            chars.next();
                            Some(q)
                        }
                        _ => None,
                    };

                    let mut inner = String::new();
                    for c in chars.by_ref() {
                        match quote {
                            Some(q) if c == q => {
                                // Closing quote.
                                continue;
                            }
                            _ if c == ']' => break,
                            _ => inner.push(c),
                        }
                    }

                    if quote.is_some() {
                        segments.push(Segment::Key(inner));
                    } else if !inner.is_empty() {
                        segments.push(Segment::from_raw(&inner));
                    }
                }
                _ => current.push(c),
            }
        }
        flush(&mut current, &mut segments);

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// Returns the path as it was written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolves the path inside `root`.
    ///
    /// Returns `None` when any segment is missing. An empty path addresses
    /// nothing and also returns `None`.
    #[must_use]
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        if self.segments.is_empty() {
            return None;
        }
        resolve_segments(&self.segments, root)
    }
}

/// Resolves a segment list inside `root`; an empty list yields `root`.
pub(crate) fn resolve_segments<'v>(segments: &[Segment], root: &'v Value) -> Option<&'v Value> {
    segments
        .iter()
        .try_fold(root, |current, segment| segment.get(current))
}

fn flush(current: &mut String, segments: &mut Vec<Segment>) {
    if !current.is_empty() {
        segments.push(Segment::from_raw(current));
        current.clear();
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for KeyPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for KeyPath {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}
