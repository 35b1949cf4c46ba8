//! Service bootstrap.
//!
//! [`Bootstrap`] ties the pieces together: run startup hooks, connect the
//! stores, start the server, then wait for a shutdown signal and stop
//! everything in order.

use flowgate_config::FlowgateConfig;
use flowgate_telemetry::logging::{create_env_filter, init_logging as init_subscriber};
use futures_util::future::try_join_all;

use crate::components::{Components, DataStore, StoreSettings};
use crate::error::{LifecycleError, LifecycleResult};
use crate::graceful::{GracefulShutdown, ShutdownOutcome};
use crate::lifecycle::Lifecycle;
use crate::shutdown::ShutdownSignal;

/// Boots a service and shuts it down on signal.
///
/// # Example
///
/// ```rust,ignore
/// let bootstrap = Bootstrap::new(config)
///     .components(Components::new().with_server(server))
///     .lifecycle(Lifecycle::new().on_startup(|_| async { Ok(()) }));
///
/// let outcome = bootstrap.run().await?;
/// std::process::exit(outcome.exit_code());
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct Bootstrap {
    config: FlowgateConfig,
    lifecycle: Lifecycle,
    components: Components,
}

impl Bootstrap {
    /// Creates a bootstrap with no hooks and no components.
    pub fn new(config: FlowgateConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::new(),
            components: Components::new(),
        }
    }

    /// Sets the lifecycle hooks.
    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Sets the components.
    pub fn components(mut self, components: Components) -> Self {
        self.components = components;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FlowgateConfig {
        &self.config
    }

    /// Returns the shutdown sequence for the registered components.
    pub fn graceful_shutdown(&self) -> GracefulShutdown {
        GracefulShutdown::new(&self.config, self.components.clone())
    }

    /// Installs the global subscriber described by the `logging` section.
    ///
    /// The level is always checked. An already installed subscriber is kept.
    pub fn init_logging(&self) -> LifecycleResult {
        let log_config = self.config.logging.to_log_config();
        if !log_config.enabled {
            return Ok(());
        }
        create_env_filter(&log_config.level)
            .map_err(|e| LifecycleError::component("logging", "initialize", e))?;

        if tracing::dispatcher::has_been_set() {
            tracing::debug!("global subscriber already installed");
            return Ok(());
        }
        init_subscriber(&log_config)
            .map_err(|e| LifecycleError::component("logging", "initialize", e))
    }

    /// Runs startup hooks, connects the stores and starts the server.
    ///
    /// Each store receives its configuration section. Stores connect
    /// concurrently; the first failure is returned.
    pub async fn start(&self) -> LifecycleResult {
        self.lifecycle.run_startup(&self.config).await?;

        let relational = self.components.relational_store.iter().map(|store| {
            connect(
                store.as_ref(),
                StoreSettings::Relational(&self.config.relational_store),
            )
        });
        let document = self.components.document_store.iter().map(|store| {
            connect(
                store.as_ref(),
                StoreSettings::Document(&self.config.document_store),
            )
        });
        try_join_all(relational.chain(document)).await?;

        if self.config.server.enabled {
            if let Some(server) = &self.components.server {
                let addr = self.config.server.http_addr.as_str();
                server.start(addr).await.map_err(|e| {
                    tracing::error!(addr, error = %e, "server failed to start");
                    LifecycleError::component("server", "start", e)
                })?;
                tracing::info!(addr, "server is running");
            }
        }

        Ok(())
    }

    /// Waits for `signal`, then runs the shutdown sequence and shutdown hooks.
    ///
    /// Shutdown hooks run even when a component fails to stop. The component
    /// error takes precedence over hook failures.
    pub async fn run_until_shutdown(
        &self,
        signal: ShutdownSignal,
    ) -> LifecycleResult<ShutdownOutcome> {
        signal.recv().await;

        let outcome = self.graceful_shutdown().run().await;
        let hooks = self.lifecycle.run_shutdown(&self.config).await;
        let outcome = outcome?;
        hooks?;
        Ok(outcome)
    }

    /// Initializes logging, starts the service and runs until SIGTERM or
    /// SIGINT.
    pub async fn run(&self) -> LifecycleResult<ShutdownOutcome> {
        self.init_logging()?;
        self.start().await?;
        self.run_until_shutdown(ShutdownSignal::with_os_signals()).await
    }
}

async fn connect(store: &dyn DataStore, settings: StoreSettings<'_>) -> LifecycleResult {
    let name = store.name();
    store.connect(settings).await.map_err(|e| {
        tracing::error!(store = name, error = %e, "failed to connect");
        LifecycleError::component(name, "connect", e)
    })?;
    tracing::info!(store = name, "connected");
    Ok(())
}
