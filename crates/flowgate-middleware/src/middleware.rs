//! Handler shapes and the `next` continuation.
//!
//! A flow step is a [`Handler`], which comes in two shapes:
//!
//! - [`Handler::Fn`]: a plain callable invoked as
//!   `(request, response, next, state)`;
//! - [`Handler::Object`]: a value implementing [`Middleware`], invoked as
//!   `handle(request, response, state, next)`.
//!
//! The two parameter orders differ and both are part of the contract.
//!
//! # Example
//!
//! ```ignore
//! use flowgate_middleware::{Handler, Middleware, Next, BoxFuture, FlowResult};
//!
//! // Plain callable
//! let auth = Handler::named_fn("auth", |req, res, next, state| {
//!     Box::pin(async move {
//!         if req.headers().contains_key("authorization") {
//!             next.run(req, res, state).await
//!         } else {
//!             res.send_error(StatusCode::UNAUTHORIZED, "missing credentials");
//!             Ok(())
//!         }
//!     })
//! });
//!
//! // Handler object
//! struct Audit;
//!
//! impl Middleware for Audit {
//!     fn name(&self) -> &'static str {
//!         "audit"
//!     }
//!
//!     fn handle<'a>(
//!         &'a self,
//!         request: &'a mut Request,
//!         response: &'a mut Response,
//!         state: &'a mut FlowState,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, FlowResult> {
//!         Box::pin(async move {
//!             tracing::info!(path = request.path(), "audited");
//!             next.run(request, response, state).await
//!         })
//!     }
//! }
//! ```

use crate::error::FlowResult;
use crate::state::FlowState;
use crate::types::{Request, Response};
use flowgate_telemetry::metrics::record_flow_step;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The handler-object capability.
///
/// Implementors either call `next.run(..)` to continue the flow or return
/// without calling it to stop the flow.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this handler, used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Handles one step of the flow.
    fn handle<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
        state: &'a mut FlowState,
        next: Next<'a>,
    ) -> BoxFuture<'a, FlowResult>;
}

/// A plain callable handler.
pub type HandlerFn = Arc<
    dyn for<'a> Fn(
            &'a mut Request,
            &'a mut Response,
            Next<'a>,
            &'a mut FlowState,
        ) -> BoxFuture<'a, FlowResult>
        + Send
        + Sync,
>;

/// One step of a flow.
#[derive(Clone)]
pub enum Handler {
    /// A plain callable.
    Fn {
        /// Name used in logs and metrics.
        name: &'static str,
        /// The callable.
        func: HandlerFn,
    },
    /// A value exposing [`Middleware::handle`].
    Object(Arc<dyn Middleware>),
}

impl Handler {
    /// Wraps a plain callable.
    pub fn from_fn<F>(func: F) -> Self
    where
        F: for<'a> Fn(
                &'a mut Request,
                &'a mut Response,
                Next<'a>,
                &'a mut FlowState,
            ) -> BoxFuture<'a, FlowResult>
            + Send
            + Sync
            + 'static,
    {
        Self::named_fn("fn", func)
    }

    /// Wraps a plain callable with a name.
    pub fn named_fn<F>(name: &'static str, func: F) -> Self
    where
        F: for<'a> Fn(
                &'a mut Request,
                &'a mut Response,
                Next<'a>,
                &'a mut FlowState,
            ) -> BoxFuture<'a, FlowResult>
            + Send
            + Sync
            + 'static,
    {
        Self::Fn {
            name,
            func: Arc::new(func),
        }
    }

    /// Wraps a handler object.
    pub fn object<M: Middleware>(middleware: M) -> Self {
        Self::Object(Arc::new(middleware))
    }

    /// Returns the handler's name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fn { name, .. } => name,
            Self::Object(middleware) => middleware.name(),
        }
    }

    /// Invokes the handler with the argument order of its shape.
    pub fn invoke<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
        state: &'a mut FlowState,
        next: Next<'a>,
    ) -> BoxFuture<'a, FlowResult> {
        match self {
            Self::Fn { func, .. } => func(request, response, next, state),
            Self::Object(middleware) => middleware.handle(request, response, state, next),
        }
    }
}

impl<M: Middleware> From<M> for Handler {
    fn from(middleware: M) -> Self {
        Self::object(middleware)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fn { name, .. } => f.debug_struct("Fn").field("name", name).finish(),
            Self::Object(middleware) => f
                .debug_tuple("Object")
                .field(&middleware.name())
                .finish(),
        }
    }
}

/// A terminal continuation.
type TerminalFn<'a> = Box<
    dyn for<'b> FnOnce(
            &'b mut Request,
            &'b mut Response,
            &'b mut FlowState,
        ) -> BoxFuture<'b, FlowResult>
        + Send
        + 'a,
>;

/// Continuation to the rest of the flow.
///
/// Consumed by [`Next::run`], so it runs at most once. A handler that does
/// not call it stops the flow.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More handlers to run.
    Chain {
        handler: &'a Handler,
        next: Box<Next<'a>>,
    },
    /// End of the chain - run a caller-supplied continuation.
    Terminal(TerminalFn<'a>),
    /// End of the chain - nothing left to do.
    End,
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke `handler`, then `next`.
    pub(crate) fn new(handler: &'a Handler, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                handler,
                next: Box::new(next),
            },
        }
    }

    /// A continuation that does nothing.
    pub fn end() -> Self {
        Self {
            inner: NextInner::End,
        }
    }

    /// A continuation that runs `f`.
    pub fn terminal<F>(f: F) -> Self
    where
        F: for<'b> FnOnce(
                &'b mut Request,
                &'b mut Response,
                &'b mut FlowState,
            ) -> BoxFuture<'b, FlowResult>
            + Send
            + 'a,
    {
        Self {
            inner: NextInner::Terminal(Box::new(f)),
        }
    }

    /// Runs the rest of the flow.
    ///
    /// Remaining handlers are skipped once the response has been sent.
    pub fn run<'b>(
        self,
        request: &'b mut Request,
        response: &'b mut Response,
        state: &'b mut FlowState,
    ) -> BoxFuture<'b, FlowResult>
    where
        'a: 'b,
    {
        match self.inner {
            NextInner::Chain { handler, next } => {
                if response.is_sent() {
                    tracing::trace!(
                        handler = handler.name(),
                        invocation_id = %state.invocation_id(),
                        "response already sent, skipping rest of flow"
                    );
                    return Box::pin(async { Ok(()) });
                }
                record_flow_step(handler.name());
                tracing::trace!(
                    handler = handler.name(),
                    invocation_id = %state.invocation_id(),
                    "entering handler"
                );
                handler.invoke(request, response, state, *next)
            }
            NextInner::Terminal(f) => f(request, response, state),
            NextInner::End => Box::pin(async { Ok(()) }),
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            NextInner::Chain { handler, .. } => {
                f.debug_tuple("Next").field(&handler.name()).finish()
            }
            NextInner::Terminal(_) => f.write_str("Next(<terminal>)"),
            NextInner::End => f.write_str("Next(<end>)"),
        }
    }
}
