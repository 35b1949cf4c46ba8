//! Startup, signal handling and graceful shutdown for flowgate services.
//!
//! A service registers the [`Components`] it runs (HTTP server, job
//! scheduler, message consumer, data stores) and optional [`Lifecycle`]
//! hooks. [`Bootstrap`] starts them, waits for a [`ShutdownSignal`] and
//! then hands over to [`GracefulShutdown`], which stops each component in
//! a fixed order according to the service's
//! [`FlowgateConfig`](flowgate_config::FlowgateConfig).
//!
//! # Example
//!
//! ```rust,ignore
//! use flowgate_lifecycle::{Bootstrap, Components};
//!
//! let config = flowgate_config::ConfigLoader::new()
//!     .with_defaults()
//!     .with_env_prefix("FLOWGATE")
//!     .load()?;
//!
//! let outcome = Bootstrap::new(config)
//!     .components(Components::new().with_server(server))
//!     .run()
//!     .await?;
//! std::process::exit(outcome.exit_code());
//! ```

#![doc(html_root_url = "https://docs.rs/flowgate-lifecycle/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bootstrap;
mod components;
mod error;
mod graceful;
mod lifecycle;
mod shutdown;

pub use bootstrap::Bootstrap;
pub use components::{
    ComponentResult, Components, DataStore, HttpServer, JobScheduler, MessageConsumer,
    StoreSettings,
};
pub use error::{BoxError, LifecycleError, LifecycleResult};
pub use graceful::{drain, GracefulShutdown, ShutdownOutcome};
pub use lifecycle::{Lifecycle, LifecycleHook};
pub use shutdown::{ShutdownReceiver, ShutdownSignal};
