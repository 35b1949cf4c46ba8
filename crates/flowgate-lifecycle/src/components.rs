//! Components started at boot and stopped on shutdown.
//!
//! Each trait is the slice of a driver or client the lifecycle needs. They
//! are object-safe so [`Components`] can hold any implementation.

use crate::error::BoxError;
use flowgate_config::{DocumentStoreConfig, RelationalStoreConfig};
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Result type for component operations.
pub type ComponentResult<T = ()> = Result<T, BoxError>;

/// The HTTP server.
pub trait HttpServer: Send + Sync {
    /// Starts accepting connections on `addr`.
    fn start<'a>(&'a self, addr: &'a str) -> BoxFuture<'a, ComponentResult>;

    /// Stops accepting connections and lets in-flight requests finish.
    fn close(&self) -> BoxFuture<'_, ComponentResult>;
}

/// The job scheduler.
pub trait JobScheduler: Send + Sync {
    /// Cancels future runs and waits for running jobs.
    fn graceful_shutdown(&self) -> BoxFuture<'_, ComponentResult>;
}

/// The message queue consumer.
pub trait MessageConsumer: Send + Sync {
    /// Stops receiving new deliveries.
    fn cancel_consumers(&self) -> BoxFuture<'_, ComponentResult>;

    /// Returns the number of deliveries still being processed.
    fn pending_messages(&self) -> BoxFuture<'_, ComponentResult<usize>>;

    /// Closes the channel.
    fn close_channel(&self) -> BoxFuture<'_, ComponentResult>;

    /// Closes the connection.
    fn close(&self) -> BoxFuture<'_, ComponentResult>;
}

/// Connection settings handed to a [`DataStore`] at startup.
#[derive(Debug, Clone, Copy)]
pub enum StoreSettings<'a> {
    /// The `relational_store` section.
    Relational(&'a RelationalStoreConfig),
    /// The `document_store` section.
    Document(&'a DocumentStoreConfig),
}

impl StoreSettings<'_> {
    /// Connection URL of either section.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Relational(config) => &config.url,
            Self::Document(config) => &config.url,
        }
    }
}

/// A database connection.
pub trait DataStore: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Connects with the settings of the store's configuration section.
    fn connect<'a>(&'a self, settings: StoreSettings<'a>) -> BoxFuture<'a, ComponentResult>;

    /// Closes the connection.
    fn disconnect(&self) -> BoxFuture<'_, ComponentResult>;
}

/// The set of components a service runs.
///
/// Any of them may be absent; the lifecycle skips what is not registered.
#[derive(Clone, Default)]
pub struct Components {
    /// HTTP server.
    pub server: Option<Arc<dyn HttpServer>>,
    /// Job scheduler.
    pub scheduler: Option<Arc<dyn JobScheduler>>,
    /// Message consumer.
    pub consumer: Option<Arc<dyn MessageConsumer>>,
    /// Relational store, disconnected first.
    pub relational_store: Option<Arc<dyn DataStore>>,
    /// Document store, disconnected last.
    pub document_store: Option<Arc<dyn DataStore>>,
}

impl Components {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP server.
    #[must_use]
    pub fn with_server(mut self, server: Arc<dyn HttpServer>) -> Self {
        self.server = Some(server);
        self
    }

    /// Sets the job scheduler.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn JobScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Sets the message consumer.
    #[must_use]
    pub fn with_consumer(mut self, consumer: Arc<dyn MessageConsumer>) -> Self {
        self.consumer = Some(consumer);
        self
    }

    /// Sets the relational store.
    #[must_use]
    pub fn with_relational_store(mut self, store: Arc<dyn DataStore>) -> Self {
        self.relational_store = Some(store);
        self
    }

    /// Sets the document store.
    #[must_use]
    pub fn with_document_store(mut self, store: Arc<dyn DataStore>) -> Self {
        self.document_store = Some(store);
        self
    }

    /// Returns the registered stores in disconnect order.
    pub fn stores(&self) -> impl Iterator<Item = &Arc<dyn DataStore>> {
        self.relational_store.iter().chain(self.document_store.iter())
    }
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Components")
            .field("server", &self.server.is_some())
            .field("scheduler", &self.scheduler.is_some())
            .field("consumer", &self.consumer.is_some())
            .field(
                "relational_store",
                &self.relational_store.as_ref().map(|s| s.name().to_string()),
            )
            .field(
                "document_store",
                &self.document_store.as_ref().map(|s| s.name().to_string()),
            )
            .finish()
    }
}
