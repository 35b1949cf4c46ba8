//! Sequential flow composer.
//!
//! A [`Flow`] runs its handlers in order. Each handler receives a [`Next`]
//! pointing at the rest of the flow; a handler that does not call it stops
//! the flow. Once the response has been sent, remaining handlers are skipped.
//!
//! Handler errors are not caught here; they surface from [`Flow::run`].

use crate::error::FlowResult;
use crate::middleware::{Handler, Middleware, Next};
use crate::state::FlowState;
use crate::types::{Request, Response};

/// An ordered list of handlers run one after another.
///
/// # Example
///
/// ```ignore
/// use flowgate_middleware::{Flow, FlowState, Request, Response};
///
/// let flow = Flow::builder()
///     .then_fn("load_user", |req, res, next, state| {
///         Box::pin(async move {
///             state.set("user", json!({ "active": true }));
///             next.run(req, res, state).await
///         })
///     })
///     .then(Audit)
///     .build();
///
/// flow.run(&mut request, &mut response, &mut FlowState::new()).await?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct Flow {
    handlers: Vec<Handler>,
}

impl Flow {
    /// Creates a flow from handlers, in order.
    pub fn new(handlers: impl IntoIterator<Item = Handler>) -> Self {
        Self {
            handlers: handlers.into_iter().collect(),
        }
    }

    /// Creates a new flow builder.
    #[must_use]
    pub fn builder() -> FlowBuilder {
        FlowBuilder::new()
    }

    /// Appends a handler.
    pub fn push(&mut self, handler: impl Into<Handler>) {
        self.handlers.push(handler.into());
    }

    /// Returns the handlers.
    #[must_use]
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Returns the handler names in order.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(Handler::name).collect()
    }

    /// Returns the number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if the flow has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Builds the continuation chain ending in `terminal`.
    pub fn chain<'a>(&'a self, terminal: Next<'a>) -> Next<'a> {
        let mut next = terminal;
        for handler in self.handlers.iter().rev() {
            next = Next::new(handler, next);
        }
        next
    }

    /// Runs the flow to completion.
    ///
    /// Returns once the last handler finishes, a handler stops the chain by
    /// not calling `next`, or the response is sent.
    pub async fn run(
        &self,
        request: &mut Request,
        response: &mut Response,
        state: &mut FlowState,
    ) -> FlowResult {
        tracing::debug!(
            invocation_id = %state.invocation_id(),
            handlers = self.handlers.len(),
            "running flow"
        );
        self.chain(Next::end()).run(request, response, state).await
    }
}

impl FromIterator<Handler> for Flow {
    fn from_iter<I: IntoIterator<Item = Handler>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Builder for constructing a [`Flow`].
#[derive(Default)]
pub struct FlowBuilder {
    handlers: Vec<Handler>,
}

impl FlowBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    #[must_use]
    pub fn handler(mut self, handler: Handler) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Appends a handler object.
    #[must_use]
    pub fn then<M: Middleware>(self, middleware: M) -> Self {
        self.handler(Handler::object(middleware))
    }

    /// Appends a named plain callable.
    #[must_use]
    pub fn then_fn<F>(self, name: &'static str, func: F) -> Self
    where
        F: for<'a> Fn(
                &'a mut Request,
                &'a mut Response,
                Next<'a>,
                &'a mut FlowState,
            ) -> crate::middleware::BoxFuture<'a, FlowResult>
            + Send
            + Sync
            + 'static,
    {
        self.handler(Handler::named_fn(name, func))
    }

    /// Builds the flow.
    #[must_use]
    pub fn build(self) -> Flow {
        Flow {
            handlers: self.handlers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Uri};
    use serde_json::{json, Value};

    fn record(name: &'static str) -> Handler {
        Handler::named_fn(name, move |req, res, next, state| {
            Box::pin(async move {
                let mut seen = state
                    .get("seen")
                    .cloned()
                    .unwrap_or_else(|| Value::Array(Vec::new()));
                if let Value::Array(items) = &mut seen {
                    items.push(json!(name));
                }
                state.set("seen", seen);
                next.run(req, res, state).await
            })
        })
    }

    fn request() -> Request {
        Request::new(Method::GET, Uri::from_static("/"))
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let flow = Flow::new([record("a"), record("b"), record("c")]);
        assert_eq!(flow.handler_names(), vec!["a", "b", "c"]);

        let mut state = FlowState::new();
        flow.run(&mut request(), &mut Response::new(), &mut state)
            .await
            .unwrap();
        assert_eq!(state.get("seen"), Some(&json!(["a", "b", "c"])));
    }

    #[tokio::test]
    async fn test_stop_without_next() {
        let stop = Handler::named_fn("stop", |_req, _res, _next, _state| {
            Box::pin(async { Ok(()) })
        });
        let flow = Flow::new([record("a"), stop, record("c")]);

        let mut state = FlowState::new();
        flow.run(&mut request(), &mut Response::new(), &mut state)
            .await
            .unwrap();
        assert_eq!(state.get("seen"), Some(&json!(["a"])));
    }

    #[tokio::test]
    async fn test_sent_response_stops_flow() {
        let send = Handler::named_fn("send", |req, res, next, state| {
            Box::pin(async move {
                res.send(StatusCode::OK, "early");
                next.run(req, res, state).await
            })
        });
        let flow = Flow::builder()
            .handler(send)
            .handler(record("late"))
            .build();

        let mut state = FlowState::new();
        let mut response = Response::new();
        flow.run(&mut request(), &mut response, &mut state)
            .await
            .unwrap();
        assert!(response.is_sent());
        assert!(state.get("seen").is_none());
    }

    #[tokio::test]
    async fn test_code_after_next_runs_after_rest() {
        let outer = Handler::named_fn("outer", |req, res, next, state| {
            Box::pin(async move {
                next.run(&mut *req, &mut *res, &mut *state).await?;
                let seen = state.get("seen").cloned().unwrap_or(Value::Null);
                state.set("after", seen);
                Ok(())
            })
        });
        let flow = Flow::new([outer, record("inner")]);

        let mut state = FlowState::new();
        flow.run(&mut request(), &mut Response::new(), &mut state)
            .await
            .unwrap();
        assert_eq!(state.get("after"), Some(&json!(["inner"])));
    }

    #[tokio::test]
    async fn test_empty_flow() {
        let flow = Flow::default();
        assert!(flow.is_empty());
        flow.run(&mut request(), &mut Response::new(), &mut FlowState::new())
            .await
            .unwrap();
    }
}
