//! Observability for flowgate services.
//!
//! - **Logging**: structured JSON or pretty output through `tracing-subscriber`
//! - **Metrics**: dispatch and flow counters through the `metrics` facade
//!
//! Metrics are recorded against whatever recorder the embedding application
//! installs; without one they are no-ops.
//!
//! # Example
//!
//! ```rust,ignore
//! use flowgate_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(component = "consumer", "draining queue");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{describe_metrics, DispatchOutcome};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
