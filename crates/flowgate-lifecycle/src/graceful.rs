//! Graceful shutdown sequencing.
//!
//! Components are stopped in a fixed order:
//!
//! ```text
//! server → scheduler → consumer (cancel, drain, close) → relational store → document store
//! ```
//!
//! A component that is enabled but has graceful shutdown disabled ends the
//! sequence at once with [`ShutdownOutcome::Immediate`]; nothing after it
//! is stopped. Disabled components are skipped.

use crate::components::{Components, DataStore, MessageConsumer};
use crate::error::{LifecycleError, LifecycleResult};
use flowgate_config::FlowgateConfig;
use flowgate_telemetry::metrics::record_shutdown;
use std::time::{Duration, Instant};

/// How a shutdown run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every step ran.
    Completed,
    /// A component asked for an immediate stop; later steps were skipped.
    Immediate {
        /// The component that ended the sequence.
        component: &'static str,
    },
}

impl ShutdownOutcome {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Immediate { .. } => "immediate",
        }
    }

    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        0
    }
}

/// Runs the shutdown sequence over a set of [`Components`].
///
/// # Example
///
/// ```rust,ignore
/// let graceful = GracefulShutdown::new(&config, components);
/// let outcome = graceful.run().await?;
/// std::process::exit(outcome.exit_code());
/// ```
#[derive(Debug, Clone)]
pub struct GracefulShutdown {
    config: FlowgateConfig,
    components: Components,
}

impl GracefulShutdown {
    /// Creates a shutdown sequence for `components` under `config`.
    #[must_use]
    pub fn new(config: &FlowgateConfig, components: Components) -> Self {
        Self {
            config: config.clone(),
            components,
        }
    }

    /// Runs the sequence.
    ///
    /// The first component error aborts the sequence and is returned.
    pub async fn run(&self) -> LifecycleResult<ShutdownOutcome> {
        let started = Instant::now();
        tracing::info!("graceful shutdown initialized");

        let result = self.run_steps().await;
        let elapsed = started.elapsed();

        match &result {
            Ok(outcome) => {
                record_shutdown(outcome.as_str(), elapsed);
                tracing::info!(
                    outcome = outcome.as_str(),
                    ?elapsed,
                    "shutdown finished"
                );
            }
            Err(e) => {
                record_shutdown("failed", elapsed);
                tracing::error!(error = %e, "shutdown failed");
            }
        }

        result
    }

    async fn run_steps(&self) -> LifecycleResult<ShutdownOutcome> {
        let server = &self.config.server;
        if server.enabled {
            if !server.graceful_shutdown_enabled {
                return Ok(immediate("server"));
            }
            if let Some(component) = &self.components.server {
                tracing::debug!("closing server");
                component
                    .close()
                    .await
                    .map_err(|e| LifecycleError::component("server", "close", e))?;
            }
        }

        let scheduler = &self.config.scheduler;
        if scheduler.enabled {
            if !scheduler.graceful_shutdown_enabled {
                return Ok(immediate("scheduler"));
            }
            if let Some(component) = &self.components.scheduler {
                tracing::debug!("waiting for scheduled jobs");
                component
                    .graceful_shutdown()
                    .await
                    .map_err(|e| LifecycleError::component("scheduler", "shut down", e))?;
            }
        }

        let consumer = &self.config.consumer;
        if consumer.enabled {
            if !consumer.graceful_shutdown_enabled {
                return Ok(immediate("consumer"));
            }
            if let Some(component) = &self.components.consumer {
                self.stop_consumer(component.as_ref()).await?;
            }
        }

        for store in self.components.stores() {
            disconnect(store.as_ref()).await?;
        }

        Ok(ShutdownOutcome::Completed)
    }

    async fn stop_consumer(&self, consumer: &dyn MessageConsumer) -> LifecycleResult {
        consumer
            .cancel_consumers()
            .await
            .map_err(|e| LifecycleError::component("consumer", "cancel consumers", e))?;

        let settings = &self.config.consumer;
        match drain(
            consumer,
            settings.drain_poll_interval(),
            settings.drain_timeout(),
        )
        .await
        {
            Ok(()) => {}
            // Timed out: log it and close the consumer regardless.
            Err(e @ LifecycleError::DrainTimeout { .. }) => {
                tracing::warn!(error = %e, "closing consumer with messages in flight");
            }
            Err(e) => return Err(e),
        }

        consumer
            .close_channel()
            .await
            .map_err(|e| LifecycleError::component("consumer", "close channel", e))?;
        consumer
            .close()
            .await
            .map_err(|e| LifecycleError::component("consumer", "close", e))?;
        Ok(())
    }
}

fn immediate(component: &'static str) -> ShutdownOutcome {
    tracing::info!(component, "graceful shutdown disabled, stopping immediately");
    ShutdownOutcome::Immediate { component }
}

async fn disconnect(store: &dyn DataStore) -> LifecycleResult {
    tracing::debug!(store = store.name(), "disconnecting");
    store
        .disconnect()
        .await
        .map_err(|e| LifecycleError::component(store.name(), "disconnect", e))
}

/// Waits until `consumer` reports no pending messages.
///
/// Polls every `poll_interval`. Fails with [`LifecycleError::DrainTimeout`]
/// if messages are still pending after `timeout`.
pub async fn drain(
    consumer: &dyn MessageConsumer,
    poll_interval: Duration,
    timeout: Duration,
) -> LifecycleResult {
    let mut last_pending = 0usize;

    let wait = async {
        loop {
            let pending = match consumer.pending_messages().await {
                Ok(pending) => pending,
                Err(e) => {
                    return Err(LifecycleError::component(
                        "consumer",
                        "count pending messages",
                        e,
                    ))
                }
            };
            last_pending = pending;
            if pending == 0 {
                return Ok(());
            }
            tracing::debug!(pending, "waiting for in-flight messages");
            tokio::time::sleep(poll_interval).await;
        }
    };

    let result = tokio::time::timeout(timeout, wait).await;
    match result {
        Ok(result) => result,
        Err(_) => Err(LifecycleError::DrainTimeout {
            pending: last_pending,
            waited: timeout,
        }),
    }
}
