//! Typed configuration for flowgate services.
//!
//! This crate provides a strongly-typed configuration with support for:
//! - TOML and JSON configuration files
//! - `.env` files via `dotenvy`
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`FlowgateConfig`] holds one section per component the service runs or
//! connects to:
//!
//! - [`ServerConfig`] - HTTP server (enabled, graceful shutdown, address)
//! - [`SchedulerConfig`] - job scheduler
//! - [`ConsumerConfig`] - message consumer and its drain settings
//! - [`DocumentStoreConfig`] / [`RelationalStoreConfig`] - data stores
//! - [`LoggingConfig`] - log level and format
//!
//! # Example
//!
//! ```no_run
//! use flowgate_config::{ConfigLoader, FlowgateConfig};
//!
//! # fn main() -> Result<(), flowgate_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("flowgate.toml")?
//!     .with_env_prefix("FLOWGATE")
//!     .load()?;
//!
//! println!("Server will listen on: {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! enabled = true
//! graceful_shutdown_enabled = true
//! http_addr = "0.0.0.0:8080"
//!
//! [scheduler]
//! enabled = true
//! graceful_shutdown_enabled = true
//!
//! [consumer]
//! enabled = true
//! graceful_shutdown_enabled = true
//! drain_poll_interval_ms = 1000
//! drain_timeout_secs = 30
//!
//! [document_store]
//! url = "mongodb://localhost:27017"
//! name = "orders"
//! auth_source = "admin"
//!
//! [relational_store]
//! url = "mssql://localhost:1433/orders"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY`, for example:
//!
//! - `FLOWGATE__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `FLOWGATE__CONSUMER__GRACEFUL_SHUTDOWN_ENABLED=false`
//! - `FLOWGATE__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
