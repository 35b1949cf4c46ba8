//! # Flowgate
//!
//! **Predicate dispatch and composable handler flows for async services**
//!
//! Flowgate provides:
//!
//! - **Dispatch** – pick the first handler whose condition matches the
//!   call's arguments (key paths, value matches, predicates)
//! - **Handler lists** – run a sequence of handlers as one, then continue
//!   the outer flow unless a handler sent the response
//! - **Configuration** – typed TOML/JSON/env configuration with validation
//! - **Lifecycle** – startup hooks, OS signals and ordered graceful shutdown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowgate::prelude::*;
//!
//! let routes = DispatchMiddleware::new(
//!     Dispatcher::builder(
//!         DispatchOption::constant(Some(When::path("[2].user.active")), active_user)
//!     )
//!     .option(DispatchOption::constant(None, guest))
//!     .build(),
//! );
//!
//! let flow = Flow::builder()
//!     .handler(authenticate)
//!     .then(routes)
//!     .build();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Handler → Handler → HandlerList[Handler, Handler] → finish
//!                       │
//!                       └─ DispatchMiddleware: first matching When → Handler
//! ```

#![doc(html_root_url = "https://docs.rs/flowgate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Key paths, argument lists and coercion
pub use flowgate_core as core;

// Predicate dispatch
pub use flowgate_dispatch as dispatch;

// Handlers, flows and handler lists
pub use flowgate_middleware as middleware;

// Logging and metrics
pub use flowgate_telemetry as telemetry;

// Configuration loading
pub use flowgate_config as config;

// Startup and graceful shutdown
pub use flowgate_lifecycle as lifecycle;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use flowgate::prelude::*;
/// ```
pub mod prelude {
    pub use flowgate_core::{Args, DispatchError, DispatchResult, KeyPath};

    pub use flowgate_dispatch::{DispatchOption, Dispatcher, When};

    pub use flowgate_middleware::{
        DispatchMiddleware, Flow, FlowError, FlowResult, FlowState, Handler, HandlerList,
        Middleware, Next, Request, Response,
    };

    pub use flowgate_config::{ConfigLoader, FlowgateConfig};

    pub use flowgate_lifecycle::{
        Bootstrap, Components, GracefulShutdown, Lifecycle, ShutdownOutcome, ShutdownSignal,
    };
}
