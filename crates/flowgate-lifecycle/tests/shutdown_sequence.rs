//! Startup and shutdown ordering across components.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use flowgate_config::FlowgateConfig;
use flowgate_lifecycle::{
    Bootstrap, ComponentResult, Components, DataStore, HttpServer, JobScheduler, Lifecycle,
    LifecycleError, MessageConsumer, ShutdownOutcome, ShutdownSignal, StoreSettings,
};
use futures_util::future::BoxFuture;

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

struct FakeServer {
    log: Log,
}

impl HttpServer for FakeServer {
    fn start<'a>(&'a self, addr: &'a str) -> BoxFuture<'a, ComponentResult> {
        Box::pin(async move {
            push(&self.log, format!("server.start {addr}"));
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, ComponentResult> {
        Box::pin(async move {
            push(&self.log, "server.close");
            Ok(())
        })
    }
}

struct FakeScheduler {
    log: Log,
}

impl JobScheduler for FakeScheduler {
    fn graceful_shutdown(&self) -> BoxFuture<'_, ComponentResult> {
        Box::pin(async move {
            push(&self.log, "scheduler.graceful_shutdown");
            Ok(())
        })
    }
}

struct FakeConsumer {
    log: Log,
    pending: Mutex<usize>,
}

impl MessageConsumer for FakeConsumer {
    fn cancel_consumers(&self) -> BoxFuture<'_, ComponentResult> {
        Box::pin(async move {
            push(&self.log, "consumer.cancel");
            Ok(())
        })
    }

    fn pending_messages(&self) -> BoxFuture<'_, ComponentResult<usize>> {
        Box::pin(async move {
            let mut pending = self.pending.lock().unwrap();
            let current = *pending;
            push(&self.log, format!("consumer.pending {current}"));
            *pending = current.saturating_sub(1);
            Ok(current)
        })
    }

    fn close_channel(&self) -> BoxFuture<'_, ComponentResult> {
        Box::pin(async move {
            push(&self.log, "consumer.close_channel");
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, ComponentResult> {
        Box::pin(async move {
            push(&self.log, "consumer.close");
            Ok(())
        })
    }
}

struct FakeStore {
    name: &'static str,
    log: Log,
    fail_connect: bool,
    connected_with: Mutex<Option<String>>,
}

impl DataStore for FakeStore {
    fn name(&self) -> &str {
        self.name
    }

    fn connect<'a>(&'a self, settings: StoreSettings<'a>) -> BoxFuture<'a, ComponentResult> {
        Box::pin(async move {
            if self.fail_connect {
                return Err("authentication failed".into());
            }
            let described = match settings {
                StoreSettings::Relational(config) => config.url.clone(),
                StoreSettings::Document(config) => format!(
                    "{} db={} authSource={} mechanism={}",
                    config.url, config.name, config.auth_source, config.auth_mechanism
                ),
            };
            *self.connected_with.lock().unwrap() = Some(described);
            push(&self.log, format!("{}.connect", self.name));
            Ok(())
        })
    }

    fn disconnect(&self) -> BoxFuture<'_, ComponentResult> {
        Box::pin(async move {
            push(&self.log, format!("{}.disconnect", self.name));
            Ok(())
        })
    }
}

fn store(name: &'static str, log: &Log) -> Arc<FakeStore> {
    Arc::new(FakeStore {
        name,
        log: Arc::clone(log),
        fail_connect: false,
        connected_with: Mutex::new(None),
    })
}

fn full_components(log: &Log, pending: usize) -> Components {
    Components::new()
        .with_server(Arc::new(FakeServer {
            log: Arc::clone(log),
        }))
        .with_scheduler(Arc::new(FakeScheduler {
            log: Arc::clone(log),
        }))
        .with_consumer(Arc::new(FakeConsumer {
            log: Arc::clone(log),
            pending: Mutex::new(pending),
        }))
        .with_relational_store(store("sql", log))
        .with_document_store(store("mongo", log))
}

fn all_enabled() -> FlowgateConfig {
    let mut config = FlowgateConfig::default();
    config.scheduler.enabled = true;
    config.consumer.enabled = true;
    config.consumer.drain_poll_interval_ms = 100;
    config
}

#[tokio::test(start_paused = true)]
async fn test_full_shutdown_order() {
    let log: Log = Arc::default();
    let bootstrap = Bootstrap::new(all_enabled()).components(full_components(&log, 2));

    let outcome = bootstrap.graceful_shutdown().run().await.unwrap();

    assert_eq!(outcome, ShutdownOutcome::Completed);
    assert_eq!(
        entries(&log),
        vec![
            "server.close",
            "scheduler.graceful_shutdown",
            "consumer.cancel",
            "consumer.pending 2",
            "consumer.pending 1",
            "consumer.pending 0",
            "consumer.close_channel",
            "consumer.close",
            "sql.disconnect",
            "mongo.disconnect",
        ]
    );
}

#[tokio::test]
async fn test_scheduler_without_graceful_stops_after_server() {
    let log: Log = Arc::default();
    let mut config = all_enabled();
    config.scheduler.graceful_shutdown_enabled = false;

    let outcome = Bootstrap::new(config)
        .components(full_components(&log, 0))
        .graceful_shutdown()
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ShutdownOutcome::Immediate {
            component: "scheduler"
        }
    );
    assert_eq!(entries(&log), vec!["server.close"]);
}

#[tokio::test]
async fn test_disabled_components_are_skipped() {
    let log: Log = Arc::default();
    let mut config = FlowgateConfig::default();
    config.server.enabled = false;

    let outcome = Bootstrap::new(config)
        .components(full_components(&log, 5))
        .graceful_shutdown()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, ShutdownOutcome::Completed);
    assert_eq!(entries(&log), vec!["sql.disconnect", "mongo.disconnect"]);
}

#[tokio::test]
async fn test_start_connects_stores_then_starts_server() {
    let log: Log = Arc::default();
    let hook_log = Arc::clone(&log);
    let lifecycle = Lifecycle::new().on_startup(move |_| {
        let log = Arc::clone(&hook_log);
        async move {
            push(&log, "startup hook");
            Ok(())
        }
    });

    let bootstrap = Bootstrap::new(all_enabled())
        .components(full_components(&log, 0))
        .lifecycle(lifecycle);
    bootstrap.start().await.unwrap();

    let log = entries(&log);
    assert_eq!(log[0], "startup hook");
    assert!(log.contains(&"sql.connect".to_string()));
    assert!(log.contains(&"mongo.connect".to_string()));
    assert_eq!(log.last().unwrap(), "server.start 0.0.0.0:8080");
}

#[tokio::test]
async fn test_start_hands_store_sections_to_stores() {
    let log: Log = Arc::default();
    let sql = store("sql", &log);
    let mongo = store("mongo", &log);

    let mut config = FlowgateConfig::default();
    config.relational_store.url = "mssql://sql.internal:1433/orders".to_string();
    config.document_store.url = "mongodb://mongo.internal:27017".to_string();
    config.document_store.name = "orders".to_string();

    let components = Components::new()
        .with_relational_store(sql.clone())
        .with_document_store(mongo.clone());
    Bootstrap::new(config)
        .components(components)
        .start()
        .await
        .unwrap();

    assert_eq!(
        sql.connected_with.lock().unwrap().as_deref(),
        Some("mssql://sql.internal:1433/orders")
    );
    assert_eq!(
        mongo.connected_with.lock().unwrap().as_deref(),
        Some("mongodb://mongo.internal:27017 db=orders authSource=admin mechanism=SCRAM-SHA-1")
    );
}

#[tokio::test]
async fn test_store_connect_failure_aborts_start() {
    let log: Log = Arc::default();
    let components = full_components(&log, 0).with_document_store(Arc::new(FakeStore {
        name: "mongo",
        log: Arc::clone(&log),
        fail_connect: true,
        connected_with: Mutex::new(None),
    }));

    let err = Bootstrap::new(all_enabled())
        .components(components)
        .start()
        .await
        .unwrap_err();

    match &err {
        LifecycleError::Component {
            component,
            operation,
            ..
        } => {
            assert_eq!(component, "mongo");
            assert_eq!(*operation, "connect");
        }
        other => panic!("expected component error, got {other:?}"),
    }
    assert!(!entries(&log).iter().any(|e| e.starts_with("server.start")));
}

#[tokio::test]
async fn test_run_until_shutdown_waits_for_signal() {
    let log: Log = Arc::default();
    let hook_log = Arc::clone(&log);
    let bootstrap = Bootstrap::new(FlowgateConfig::default())
        .components(Components::new().with_server(Arc::new(FakeServer {
            log: Arc::clone(&log),
        })))
        .lifecycle(Lifecycle::new().on_shutdown(move |_| {
            let log = Arc::clone(&hook_log);
            async move {
                push(&log, "shutdown hook");
                Ok(())
            }
        }));

    let signal = ShutdownSignal::new();
    let trigger = signal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.trigger();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(1),
        bootstrap.run_until_shutdown(signal),
    )
    .await
    .expect("shutdown should finish")
    .unwrap();

    assert_eq!(outcome, ShutdownOutcome::Completed);
    assert_eq!(entries(&log), vec!["server.close", "shutdown hook"]);
}

struct StuckServer;

impl HttpServer for StuckServer {
    fn start<'a>(&'a self, _addr: &'a str) -> BoxFuture<'a, ComponentResult> {
        Box::pin(async { Ok(()) })
    }

    fn close(&self) -> BoxFuture<'_, ComponentResult> {
        Box::pin(async { Err("listener already closed".into()) })
    }
}

#[tokio::test]
async fn test_shutdown_hooks_run_when_component_fails_to_stop() {
    let log: Log = Arc::default();
    let hook_log = Arc::clone(&log);
    let bootstrap = Bootstrap::new(FlowgateConfig::default())
        .components(Components::new().with_server(Arc::new(StuckServer)))
        .lifecycle(Lifecycle::new().on_shutdown(move |_| {
            let log = Arc::clone(&hook_log);
            async move {
                push(&log, "shutdown hook");
                Ok(())
            }
        }));

    let signal = ShutdownSignal::new();
    signal.trigger();
    let err = bootstrap.run_until_shutdown(signal).await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Component {
            operation: "close",
            ..
        }
    ));
    assert_eq!(entries(&log), vec!["shutdown hook"]);
}
