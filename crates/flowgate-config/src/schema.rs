//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP server section.
///
/// # Example
///
/// ```
/// use flowgate_config::ServerConfig;
///
/// let config = ServerConfig {
///     http_addr: "0.0.0.0:3000".to_string(),
///     ..Default::default()
/// };
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Whether the HTTP server runs.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Close the server gracefully on shutdown instead of stopping at once.
    #[serde(default = "default_true")]
    pub graceful_shutdown_enabled: bool,

    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            graceful_shutdown_enabled: true,
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// Job scheduler section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Whether the scheduler runs.
    #[serde(default)]
    pub enabled: bool,

    /// Wait for running jobs on shutdown instead of stopping at once.
    #[serde(default = "default_true")]
    pub graceful_shutdown_enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            graceful_shutdown_enabled: true,
        }
    }
}

/// Message consumer section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConsumerConfig {
    /// Whether the message consumer runs.
    #[serde(default)]
    pub enabled: bool,

    /// Drain in-flight messages on shutdown instead of stopping at once.
    #[serde(default = "default_true")]
    pub graceful_shutdown_enabled: bool,

    /// How often to check for in-flight messages while draining.
    #[serde(default = "default_drain_poll_interval")]
    pub drain_poll_interval_ms: u64,

    /// Upper bound on draining.
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_secs: u64,
}

impl ConsumerConfig {
    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn drain_poll_interval(&self) -> Duration {
        Duration::from_millis(self.drain_poll_interval_ms)
    }

    /// Drain timeout as a [`Duration`].
    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            graceful_shutdown_enabled: true,
            drain_poll_interval_ms: default_drain_poll_interval(),
            drain_timeout_secs: default_drain_timeout(),
        }
    }
}

fn default_drain_poll_interval() -> u64 {
    1000
}

fn default_drain_timeout() -> u64 {
    30
}

/// Document store section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocumentStoreConfig {
    /// Connection URL. Empty disables the store.
    #[serde(default)]
    pub url: String,

    /// Database name.
    #[serde(default)]
    pub name: String,

    /// Database holding the credentials.
    #[serde(default = "default_auth_source")]
    pub auth_source: String,

    /// Authentication mechanism.
    #[serde(default = "default_auth_mechanism")]
    pub auth_mechanism: String,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            name: String::new(),
            auth_source: default_auth_source(),
            auth_mechanism: default_auth_mechanism(),
        }
    }
}

fn default_auth_source() -> String {
    "admin".to_string()
}

fn default_auth_mechanism() -> String {
    "SCRAM-SHA-1".to_string()
}

/// Relational store section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RelationalStoreConfig {
    /// Connection URL. Empty disables the store.
    #[serde(default)]
    pub url: String,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Converts into the subscriber settings used by `init_logging`.
    #[must_use]
    pub fn to_log_config(&self) -> flowgate_telemetry::LogConfig {
        let base = match self.format {
            LogFormat::Json => flowgate_telemetry::LogConfig::production(),
            LogFormat::Pretty => flowgate_telemetry::LogConfig::development(),
        };
        flowgate_telemetry::LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            ..base
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
