//! Error types for predicate evaluation.
//!
//! Only a non-strict mapping predicate can fail: it coerces the value found at
//! a key path to the kind of the expected value, and some kinds have no
//! coercion. Every other mismatch is a silent no-match.

use thiserror::Error;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors raised while evaluating dispatch predicates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The expected value of a mapping entry has a kind that values cannot
    /// be coerced to (array, object or null).
    #[error("INVALID_TYPE: cannot coerce value at `{path}` to {expected}")]
    InvalidType {
        /// Key path of the failing mapping entry.
        path: String,
        /// Kind of the expected value.
        expected: &'static str,
    },

    /// The value could not be converted to a big integer.
    #[error("cannot convert value at `{path}` to a big integer: {value}")]
    Coercion {
        /// Key path of the failing mapping entry.
        path: String,
        /// JSON text of the value that failed to convert.
        value: String,
    },
}

impl DispatchError {
    /// Creates an invalid type error.
    pub fn invalid_type(path: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidType {
            path: path.into(),
            expected,
        }
    }

    /// Creates a big-integer conversion error.
    pub fn coercion(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Coercion {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Returns the key path of the mapping entry that failed.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidType { path, .. } | Self::Coercion { path, .. } => path,
        }
    }
}
