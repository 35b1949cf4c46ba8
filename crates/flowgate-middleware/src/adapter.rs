//! Handler list adapter.
//!
//! [`HandlerList`] wraps plain callables and handler objects into a [`Flow`]
//! and ends the flow with a caller-supplied `finish` continuation. `finish`
//! runs exactly once after the flow completes, unless a handler sent the
//! response.

use crate::error::FlowResult;
use crate::flow::Flow;
use crate::middleware::{BoxFuture, Handler, Middleware, Next};
use crate::state::FlowState;
use crate::types::{Request, Response};
use flowgate_telemetry::metrics::record_flow_finish;

/// A list of handlers run in order, followed by `finish`.
///
/// `finish` still runs when a handler stops the flow by not calling `next`;
/// it is only skipped when the response was sent.
///
/// # Example
///
/// ```ignore
/// use flowgate_middleware::{HandlerList, Next};
///
/// let list = HandlerList::new([authenticate, load_user]);
/// let finish = Next::terminal(|_req, res, _state| {
///     Box::pin(async move {
///         res.send(StatusCode::NOT_FOUND, "no route");
///         Ok(())
///     })
/// });
///
/// list.run(&mut request, &mut response, &mut state, finish).await?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct HandlerList {
    flow: Flow,
}

impl HandlerList {
    /// Wraps `handlers`, in order.
    pub fn new(handlers: impl IntoIterator<Item = Handler>) -> Self {
        Self {
            flow: Flow::new(handlers),
        }
    }

    /// Returns the underlying flow.
    #[must_use]
    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Runs every handler, then `finish` unless the response was sent.
    ///
    /// Handler errors propagate and `finish` is not called.
    pub async fn run<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
        state: &'a mut FlowState,
        finish: Next<'a>,
    ) -> FlowResult {
        self.flow.run(request, response, state).await?;

        if response.is_sent() {
            record_flow_finish(false);
            tracing::debug!(
                invocation_id = %state.invocation_id(),
                status = response.status().as_u16(),
                "response sent, skipping finish"
            );
            return Ok(());
        }

        record_flow_finish(true);
        finish.run(request, response, state).await
    }
}

impl FromIterator<Handler> for HandlerList {
    fn from_iter<I: IntoIterator<Item = Handler>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Middleware for HandlerList {
    fn name(&self) -> &'static str {
        "handler_list"
    }

    fn handle<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
        state: &'a mut FlowState,
        next: Next<'a>,
    ) -> BoxFuture<'a, FlowResult> {
        Box::pin(self.run(request, response, state, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Uri};
    use serde_json::json;

    fn request() -> Request {
        Request::new(Method::GET, Uri::from_static("/"))
    }

    fn finish_marker<'a>() -> Next<'a> {
        Next::terminal(|_req, _res, state| {
            Box::pin(async move {
                state.set("finished", true);
                Ok(())
            })
        })
    }

    #[tokio::test]
    async fn test_finish_runs_after_flow() {
        let list = HandlerList::new([Handler::named_fn("mark", |req, res, next, state| {
            Box::pin(async move {
                state.set("mark", 1);
                next.run(req, res, state).await
            })
        })]);

        let mut state = FlowState::new();
        list.run(&mut request(), &mut Response::new(), &mut state, finish_marker())
            .await
            .unwrap();
        assert_eq!(state.to_value(), json!({ "mark": 1, "finished": true }));
    }

    #[tokio::test]
    async fn test_finish_skipped_when_sent() {
        let list = HandlerList::new([Handler::named_fn("send", |_req, res, _next, _state| {
            Box::pin(async move {
                res.send(StatusCode::OK, "ok");
                Ok(())
            })
        })]);

        let mut state = FlowState::new();
        let mut response = Response::new();
        list.run(&mut request(), &mut response, &mut state, finish_marker())
            .await
            .unwrap();
        assert!(response.is_sent());
        assert!(state.get("finished").is_none());
    }

    #[tokio::test]
    async fn test_empty_list_still_finishes() {
        let list = HandlerList::default();
        let mut state = FlowState::new();
        list.run(&mut request(), &mut Response::new(), &mut state, finish_marker())
            .await
            .unwrap();
        assert_eq!(state.get("finished"), Some(&json!(true)));
    }

    #[test]
    fn test_middleware_name() {
        assert_eq!(Handler::object(HandlerList::default()).name(), "handler_list");
    }
}
