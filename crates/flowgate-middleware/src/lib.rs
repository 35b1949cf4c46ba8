//! # Flowgate Middleware
//!
//! Sequential middleware flows for flowgate.
//!
//! A flow threads one [`Request`], one [`Response`] and one [`FlowState`]
//! through an ordered list of [`Handler`]s. Each handler either calls its
//! [`Next`] continuation or stops the flow by returning without calling it.
//!
//! ```text
//! HandlerList::run
//!   └─ Flow: h1 → next → h2 → next → h3
//!   └─ finish   (skipped when the response was sent)
//! ```
//!
//! ## Handler Shapes
//!
//! | Shape | Constructed with | Invoked as |
//! |-------|------------------|------------|
//! | Plain callable | [`Handler::from_fn`], [`Handler::named_fn`] | `f(request, response, next, state)` |
//! | Handler object | [`Handler::object`] | `m.handle(request, response, state, next)` |
//!
//! ## Key Features
//!
//! - **Short-circuit**: remaining handlers are skipped once the response is sent
//! - **Nesting**: a [`HandlerList`] is itself a handler object
//! - **Dispatch**: [`DispatchMiddleware`] selects one handler per call from a
//!   predicate [`Dispatcher`](flowgate_dispatch::Dispatcher)
//! - **Errors propagate**: nothing in a flow catches handler errors
//!
//! ## Example
//!
//! ```
//! use flowgate_middleware::{FlowState, Handler, HandlerList, Next, Request, Response};
//! use http::{Method, StatusCode, Uri};
//!
//! # tokio_test::block_on(async {
//! let list = HandlerList::new([Handler::named_fn("greet", |req, res, next, state| {
//!     Box::pin(async move {
//!         state.set("greeted", true);
//!         next.run(req, res, state).await
//!     })
//! })]);
//!
//! let finish = Next::terminal(|_req, res, _state| {
//!     Box::pin(async move {
//!         res.send(StatusCode::OK, "hello");
//!         Ok(())
//!     })
//! });
//!
//! let mut request = Request::new(Method::GET, Uri::from_static("/"));
//! let mut response = Response::new();
//! let mut state = FlowState::new();
//! list.run(&mut request, &mut response, &mut state, finish).await.unwrap();
//!
//! assert!(response.is_sent());
//! assert_eq!(state.get("greeted"), Some(&serde_json::json!(true)));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/flowgate-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod adapter;
pub mod dispatch;
pub mod error;
pub mod flow;
pub mod middleware;
pub mod state;
pub mod types;

pub use adapter::HandlerList;
pub use dispatch::{snapshot, DispatchMiddleware};
pub use error::{FlowError, FlowResult};
pub use flow::{Flow, FlowBuilder};
pub use middleware::{BoxFuture, Handler, HandlerFn, Middleware, Next};
pub use state::FlowState;
pub use types::{Request, Response};
