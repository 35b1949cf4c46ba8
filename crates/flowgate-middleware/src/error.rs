//! Flow error types.

use flowgate_core::DispatchError;
use thiserror::Error;

/// Result type for handlers and flows.
pub type FlowResult<T = ()> = Result<T, FlowError>;

/// Errors raised by handlers or by dispatch inside a flow.
///
/// Flows never catch these; they propagate to whoever ran the flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A dispatch predicate failed.
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// A handler reported a failure.
    #[error("handler `{name}` failed: {message}")]
    Handler {
        /// Handler name.
        name: String,
        /// Failure description.
        message: String,
    },

    /// Any other error raised inside a handler.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    /// Creates a handler error.
    pub fn handler(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            name: name.into(),
            message: message.into(),
        }
    }
}
