//! Argument tuples and key-path lookup against them.
//!
//! Predicates and handlers share one argument type. [`ArgumentContext`] is the
//! capability a dispatcher needs from it: resolving a [`KeyPath`].
//!
//! For an [`Args`] tuple a path is resolved twice: first against the tuple as
//! a whole (so `0.user` or `[1].status` address a specific argument), then, if
//! nothing was found, against argument 0. JSON `null` counts as not found at
//! both steps, so a `null` in the tuple falls through to argument 0.

use crate::keypath::{resolve_segments, KeyPath};
use serde_json::Value;

/// Something key paths can be resolved against.
pub trait ArgumentContext {
    /// Resolves `path`, returning `None` when it is not found.
    ///
    /// Implementations must treat JSON `null` as not found.
    fn lookup(&self, path: &KeyPath) -> Option<&Value>;
}

/// The argument tuple passed to a dispatcher.
///
/// # Example
///
/// ```
/// use flowgate_core::{Args, ArgumentContext, KeyPath};
/// use serde_json::json;
///
/// let args = Args::new()
///     .with(json!({ "body": { "type": "order" } }))
///     .with(json!({ "status": 200 }));
///
/// assert_eq!(args.lookup(&KeyPath::parse("body.type")), Some(&json!("order")));
/// assert_eq!(args.lookup(&KeyPath::parse("[1].status")), Some(&json!(200)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    /// Creates an empty argument tuple.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument.
    #[must_use]
    pub fn with(mut self, value: Value) -> Self {
        self.values.push(value);
        self
    }

    /// Appends an argument in place.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Returns the argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the first argument, the structured fallback for lookups.
    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    /// Returns all arguments.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolves `path` against the tuple as a whole.
    fn lookup_in_tuple(&self, path: &KeyPath) -> Option<&Value> {
        let (head, rest) = path.segments().split_first()?;
        let argument = self.values.get(head.as_index()?)?;
        resolve_segments(rest, argument)
    }
}

impl ArgumentContext for Args {
    fn lookup(&self, path: &KeyPath) -> Option<&Value> {
        self.lookup_in_tuple(path)
            .filter(|value| !value.is_null())
            .or_else(|| {
                self.first()
                    .and_then(|first| path.resolve(first))
                    .filter(|value| !value.is_null())
            })
    }
}

impl ArgumentContext for Value {
    fn lookup(&self, path: &KeyPath) -> Option<&Value> {
        path.resolve(self).filter(|value| !value.is_null())
    }
}

impl<T: ArgumentContext + ?Sized> ArgumentContext for &T {
    fn lookup(&self, path: &KeyPath) -> Option<&Value> {
        (**self).lookup(path)
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Args {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
