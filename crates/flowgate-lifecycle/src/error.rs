//! Lifecycle error types.

use std::time::Duration;
use thiserror::Error;

/// Boxed error returned by components.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for startup and shutdown failures.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// A startup hook failed.
    #[error("Startup hook failed: {0}")]
    StartupFailed(String),

    /// One or more shutdown hooks failed.
    #[error("Shutdown hook failed: {0}")]
    ShutdownFailed(String),

    /// A component operation failed.
    #[error("{component} failed to {operation}: {source}")]
    Component {
        /// Component name (server, scheduler, consumer, store name).
        component: String,
        /// What was being done.
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: BoxError,
    },

    /// In-flight messages did not drain in time.
    #[error("{pending} message(s) still in flight after {waited:?}")]
    DrainTimeout {
        /// Messages still pending when the timeout elapsed.
        pending: usize,
        /// How long draining waited.
        waited: Duration,
    },

    /// Generic hook error.
    #[error("Lifecycle hook error: {message}")]
    HookError {
        /// Error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },
}

impl LifecycleError {
    /// Creates a new hook error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::HookError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new hook error with a source.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::HookError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a component error.
    pub fn component(
        component: impl Into<String>,
        operation: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Component {
            component: component.into(),
            operation,
            source: source.into(),
        }
    }
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T = ()> = Result<T, LifecycleError>;
