//! Dispatch predicates.
//!
//! A [`When`] decides whether a [`DispatchOption`](crate::DispatchOption)
//! matches a call. It is a closed set of four shapes:
//!
//! | Variant | Matches when |
//! |---------|--------------|
//! | [`When::Path`] | the value at the path is present and not `false` |
//! | [`When::AllPaths`] | every path passes the [`When::Path`] rule |
//! | [`When::Matches`] | every entry's value equals its expected value |
//! | [`When::Predicate`] | the function returns `true` |

use flowgate_core::value::{self, CoercionTarget};
use flowgate_core::{ArgumentContext, DispatchResult, KeyPath};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A boolean function over the argument context.
pub type PredicateFn<A> = Arc<dyn Fn(&A) -> bool + Send + Sync>;

/// The condition under which an option matches.
///
/// # Example
///
/// ```
/// use flowgate_core::Args;
/// use flowgate_dispatch::When;
/// use serde_json::json;
///
/// let args = Args::from(vec![json!({ "user": { "active": true, "age": "30" } })]);
///
/// assert!(When::path("user.active").evaluate(&args, false).unwrap());
/// assert!(When::matches([("user.age", json!(30))]).evaluate(&args, false).unwrap());
/// assert!(!When::matches([("user.age", json!(30))]).evaluate(&args, true).unwrap());
/// ```
pub enum When<A> {
    /// A single key path.
    Path(KeyPath),
    /// Several key paths, all of which must pass.
    AllPaths(Vec<KeyPath>),
    /// Key paths mapped to expected values, compared in order.
    Matches(Vec<(KeyPath, Value)>),
    /// An arbitrary boolean function.
    Predicate(PredicateFn<A>),
}

impl<A> When<A> {
    /// Matches when the value at `path` is present and not `false`.
    pub fn path(path: impl Into<KeyPath>) -> Self {
        Self::Path(path.into())
    }

    /// Matches when every path passes the single-path rule.
    pub fn all_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPath>,
    {
        Self::AllPaths(paths.into_iter().map(Into::into).collect())
    }

    /// Matches when every path resolves to its expected value.
    pub fn matches<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, Value)>,
        P: Into<KeyPath>,
    {
        Self::Matches(
            entries
                .into_iter()
                .map(|(path, expected)| (path.into(), expected))
                .collect(),
        )
    }

    /// Builds a mapping predicate from a JSON object, keeping its key order.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self::matches(map)
    }

    /// Matches when `f` returns `true`.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Returns a short name for the predicate shape, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::AllPaths(_) => "all_paths",
            Self::Matches(_) => "matches",
            Self::Predicate(_) => "predicate",
        }
    }
}

impl<A: ArgumentContext> When<A> {
    /// Evaluates the predicate against `args`.
    ///
    /// `strict` only affects [`When::Matches`]. Returns an error only when a
    /// non-strict mapping entry expects a kind values cannot be coerced to.
    pub fn evaluate(&self, args: &A, strict: bool) -> DispatchResult<bool> {
        match self {
            Self::Predicate(f) => Ok(f(args)),
            Self::Path(path) => Ok(value::is_present(args.lookup(path))),
            Self::AllPaths(paths) => Ok(paths
                .iter()
                .all(|path| value::is_present(args.lookup(path)))),
            Self::Matches(entries) => {
                // Every entry is evaluated, so a type error surfaces even when
                // an earlier entry already failed.
                let mut all = true;
                for (path, expected) in entries {
                    all &= entry_matches(args.lookup(path), expected, path, strict)?;
                }
                Ok(all)
            }
        }
    }
}

fn entry_matches(
    found: Option<&Value>,
    expected: &Value,
    path: &KeyPath,
    strict: bool,
) -> DispatchResult<bool> {
    // Missing and falsy non-boolean values never compare.
    let actual = match found {
        Some(actual) if actual.is_boolean() || value::is_truthy(actual) => actual,
        _ => return Ok(false),
    };

    let both_structured = value::is_structured(actual) && value::is_structured(expected);

    if both_structured {
        return Ok(if strict {
            value::serialized_eq(actual, expected)
        } else {
            value::semantic_eq(actual, expected)
        });
    }

    if strict {
        return Ok(value::strict_eq(actual, expected));
    }

    let target = CoercionTarget::for_expected(expected, path.as_str())?;
    let coerced = value::coerce(actual, target, path.as_str())?;
    Ok(coerced.matches(expected))
}

impl<A> Clone for When<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Path(path) => Self::Path(path.clone()),
            Self::AllPaths(paths) => Self::AllPaths(paths.clone()),
            Self::Matches(entries) => Self::Matches(entries.clone()),
            Self::Predicate(f) => Self::Predicate(Arc::clone(f)),
        }
    }
}

impl<A> fmt::Debug for When<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(&path.as_str()).finish(),
            Self::AllPaths(paths) => f
                .debug_tuple("AllPaths")
                .field(&paths.iter().map(KeyPath::as_str).collect::<Vec<_>>())
                .finish(),
            Self::Matches(entries) => f
                .debug_tuple("Matches")
                .field(
                    &entries
                        .iter()
                        .map(|(path, expected)| (path.as_str(), expected))
                        .collect::<Vec<_>>(),
                )
                .finish(),
            Self::Predicate(_) => f.debug_tuple("Predicate").field(&"<fn>").finish(),
        }
    }
}
