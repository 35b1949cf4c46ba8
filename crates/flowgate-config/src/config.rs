//! Main configuration types.
//!
//! This module provides the top-level [`FlowgateConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, ConsumerConfig, DocumentStoreConfig, LogFormat, LoggingConfig,
    RelationalStoreConfig, SchedulerConfig, ServerConfig,
};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use flowgate_config::FlowgateConfig;
///
/// let config = FlowgateConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct FlowgateConfig {
    /// HTTP server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Job scheduler.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Message consumer.
    #[serde(default)]
    pub consumer: ConsumerConfig,

    /// Document store connection.
    #[serde(default)]
    pub document_store: DocumentStoreConfig,

    /// Relational store connection.
    #[serde(default)]
    pub relational_store: RelationalStoreConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FlowgateConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> FlowgateConfigBuilder {
        FlowgateConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the server is enabled and its address is empty or not a socket address
    /// - the consumer drain poll interval is zero
    /// - the log level is not one of trace, debug, info, warn, error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.enabled {
            if self.server.http_addr.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "server.http_addr",
                    "must not be empty",
                ));
            }
            if self
                .server
                .http_addr
                .parse::<std::net::SocketAddr>()
                .is_err()
            {
                return Err(ConfigError::invalid_value(
                    "server.http_addr",
                    format!("invalid socket address: {}", self.server.http_addr),
                ));
            }
        }

        if self.consumer.drain_poll_interval_ms == 0 {
            return Err(ConfigError::invalid_value(
                "consumer.drain_poll_interval_ms",
                "must be greater than zero",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        Ok(())
    }

    /// Development preset: debug level, pretty output.
    ///
    /// # Example
    ///
    /// ```
    /// use flowgate_config::FlowgateConfig;
    ///
    /// let config = FlowgateConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.server.http_addr = "127.0.0.1:8080".to_string();
        config
    }

    /// Production preset: info level, JSON output, graceful shutdown on
    /// every component.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.server.graceful_shutdown_enabled = true;
        config.scheduler.graceful_shutdown_enabled = true;
        config.consumer.graceful_shutdown_enabled = true;
        config
    }
}

/// Builder for [`FlowgateConfig`].
#[derive(Debug, Default)]
pub struct FlowgateConfigBuilder {
    server: Option<ServerConfig>,
    scheduler: Option<SchedulerConfig>,
    consumer: Option<ConsumerConfig>,
    document_store: Option<DocumentStoreConfig>,
    relational_store: Option<RelationalStoreConfig>,
    logging: Option<LoggingConfig>,
}

impl FlowgateConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server section.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the scheduler section.
    #[must_use]
    pub fn scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Set the consumer section.
    #[must_use]
    pub fn consumer(mut self, consumer: ConsumerConfig) -> Self {
        self.consumer = Some(consumer);
        self
    }

    /// Set the document store section.
    #[must_use]
    pub fn document_store(mut self, document_store: DocumentStoreConfig) -> Self {
        self.document_store = Some(document_store);
        self
    }

    /// Set the relational store section.
    #[must_use]
    pub fn relational_store(mut self, relational_store: RelationalStoreConfig) -> Self {
        self.relational_store = Some(relational_store);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> FlowgateConfig {
        FlowgateConfig {
            server: self.server.unwrap_or_default(),
            scheduler: self.scheduler.unwrap_or_default(),
            consumer: self.consumer.unwrap_or_default(),
            document_store: self.document_store.unwrap_or_default(),
            relational_store: self.relational_store.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }
}
