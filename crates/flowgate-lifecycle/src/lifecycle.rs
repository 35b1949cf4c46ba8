//! Startup and shutdown hooks.
//!
//! # Execution Order
//!
//! - **Startup hooks**: run in registration order before stores connect
//! - **Shutdown hooks**: run in reverse registration order after the
//!   graceful shutdown sequence

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use flowgate_config::FlowgateConfig;
use futures_util::future::BoxFuture;

use crate::error::{LifecycleError, LifecycleResult};

/// A lifecycle hook callback.
///
/// Receives the service configuration; the returned future must own what
/// it needs.
pub type LifecycleHook =
    Arc<dyn Fn(&FlowgateConfig) -> BoxFuture<'static, LifecycleResult> + Send + Sync>;

/// Registered startup and shutdown hooks.
///
/// # Example
///
/// ```rust
/// use flowgate_lifecycle::Lifecycle;
///
/// let lifecycle = Lifecycle::new()
///     .on_startup(|_config| async { Ok(()) })
///     .on_shutdown_named("flush_metrics", |_config| async { Ok(()) });
///
/// assert_eq!(lifecycle.startup_hook_count(), 1);
/// assert_eq!(lifecycle.shutdown_hook_count(), 1);
/// ```
#[must_use]
#[derive(Clone, Default)]
pub struct Lifecycle {
    startup_hooks: Vec<(String, LifecycleHook)>,
    shutdown_hooks: Vec<(String, LifecycleHook)>,
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("startup_hooks", &self.startup_hooks.len())
            .field("shutdown_hooks", &self.shutdown_hooks.len())
            .finish()
    }
}

impl Lifecycle {
    /// Creates an empty lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a startup hook.
    pub fn on_startup<F, Fut>(self, hook: F) -> Self
    where
        F: Fn(&FlowgateConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LifecycleResult> + Send + 'static,
    {
        let name = format!("startup_{}", self.startup_hooks.len());
        self.on_startup_named(name, hook)
    }

    /// Registers a named startup hook.
    pub fn on_startup_named<F, Fut>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&FlowgateConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LifecycleResult> + Send + 'static,
    {
        let hook: LifecycleHook = Arc::new(
            move |config: &FlowgateConfig| -> BoxFuture<'static, LifecycleResult> {
                Box::pin(hook(config))
            },
        );
        self.startup_hooks.push((name.into(), hook));
        self
    }

    /// Registers a shutdown hook.
    pub fn on_shutdown<F, Fut>(self, hook: F) -> Self
    where
        F: Fn(&FlowgateConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LifecycleResult> + Send + 'static,
    {
        let name = format!("shutdown_{}", self.shutdown_hooks.len());
        self.on_shutdown_named(name, hook)
    }

    /// Registers a named shutdown hook.
    pub fn on_shutdown_named<F, Fut>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&FlowgateConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LifecycleResult> + Send + 'static,
    {
        let hook: LifecycleHook = Arc::new(
            move |config: &FlowgateConfig| -> BoxFuture<'static, LifecycleResult> {
                Box::pin(hook(config))
            },
        );
        self.shutdown_hooks.push((name.into(), hook));
        self
    }

    /// Returns the number of startup hooks.
    pub fn startup_hook_count(&self) -> usize {
        self.startup_hooks.len()
    }

    /// Returns the number of shutdown hooks.
    pub fn shutdown_hook_count(&self) -> usize {
        self.shutdown_hooks.len()
    }

    /// Runs startup hooks in order, stopping at the first failure.
    pub async fn run_startup(&self, config: &FlowgateConfig) -> LifecycleResult {
        for (name, hook) in &self.startup_hooks {
            tracing::debug!(hook = %name, "running startup hook");
            if let Err(e) = hook(config).await {
                tracing::error!(hook = %name, error = %e, "startup hook failed");
                return Err(LifecycleError::StartupFailed(format!(
                    "Hook '{}' failed: {}",
                    name, e
                )));
            }
        }
        Ok(())
    }

    /// Runs shutdown hooks in reverse order.
    ///
    /// Every hook runs; failures are collected into one error.
    pub async fn run_shutdown(&self, config: &FlowgateConfig) -> LifecycleResult {
        let mut errors: Vec<String> = Vec::new();

        for (name, hook) in self.shutdown_hooks.iter().rev() {
            tracing::debug!(hook = %name, "running shutdown hook");
            if let Err(e) = hook(config).await {
                tracing::error!(hook = %name, error = %e, "shutdown hook failed");
                errors.push(format!("{}: {}", name, e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::ShutdownFailed(errors.join("; ")))
        }
    }

    /// Appends another lifecycle's hooks to this one.
    pub fn merge(mut self, other: Lifecycle) -> Self {
        self.startup_hooks.extend(other.startup_hooks);
        self.shutdown_hooks.extend(other.shutdown_hooks);
        self
    }
}
