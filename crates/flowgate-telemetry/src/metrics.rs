//! Metrics for dispatch and flow execution.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `flowgate_dispatch_total` | Counter | `outcome` | Dispatcher calls by outcome |
//! | `flowgate_flow_steps_total` | Counter | `handler` | Handlers entered by a flow |
//! | `flowgate_flow_finish_total` | Counter | `finished` | Handler lists completed, by whether `finish` ran |
//! | `flowgate_shutdown_duration_seconds` | Histogram | `outcome` | Graceful shutdown duration |

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Outcome of one dispatcher call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// An option matched and its handler ran.
    Matched,
    /// No option matched.
    Unmatched,
    /// A predicate raised an error.
    Error,
}

impl DispatchOutcome {
    /// Label value for this outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Unmatched => "unmatched",
            Self::Error => "error",
        }
    }
}

/// Registers descriptions for all standard metrics.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        "flowgate_dispatch_total",
        "Total dispatcher calls by outcome"
    );
    describe_counter!(
        "flowgate_flow_steps_total",
        "Total handlers entered by sequential flows"
    );
    describe_counter!(
        "flowgate_flow_finish_total",
        "Total handler lists completed, labelled by whether finish ran"
    );
    describe_histogram!(
        "flowgate_shutdown_duration_seconds",
        "Graceful shutdown duration in seconds"
    );
}

/// Records one dispatcher call.
pub fn record_dispatch(outcome: DispatchOutcome) {
    counter!("flowgate_dispatch_total", "outcome" => outcome.as_str()).increment(1);
}

/// Records a handler being entered by a flow.
pub fn record_flow_step(handler: &str) {
    counter!("flowgate_flow_steps_total", "handler" => handler.to_string()).increment(1);
}

/// Records a handler list completing.
pub fn record_flow_finish(finished: bool) {
    let label = if finished { "true" } else { "false" };
    counter!("flowgate_flow_finish_total", "finished" => label).increment(1);
}

/// Records a graceful shutdown run.
pub fn record_shutdown(outcome: &'static str, duration: Duration) {
    histogram!("flowgate_shutdown_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
}
