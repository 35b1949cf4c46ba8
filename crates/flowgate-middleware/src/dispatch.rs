//! Predicate dispatch as a flow step.
//!
//! [`DispatchMiddleware`] picks one [`Handler`] from a [`Dispatcher`] and
//! runs it in place of itself. Predicates see the call as the argument tuple
//! `[request, response, state]`, each snapshotted as JSON, so an unprefixed
//! path such as `body.type` reads the request and `[1].sent` or
//! `[2].user.id` reach the response and state.
//!
//! When no option matches, the flow continues with `next`.

use crate::error::FlowResult;
use crate::middleware::{BoxFuture, Handler, Middleware, Next};
use crate::state::FlowState;
use crate::types::{Request, Response};
use flowgate_core::Args;
use flowgate_dispatch::{DispatchOption, Dispatcher, When};

/// Snapshots one call as the dispatch argument tuple.
#[must_use]
pub fn snapshot(request: &Request, response: &Response, state: &FlowState) -> Args {
    Args::from(vec![
        request.to_value(),
        response.to_value(),
        state.to_value(),
    ])
}

/// A flow step that selects and runs one handler.
///
/// # Example
///
/// ```ignore
/// use flowgate_dispatch::{Dispatcher, When};
/// use flowgate_middleware::DispatchMiddleware;
/// use serde_json::json;
///
/// let routes = DispatchMiddleware::new(
///     Dispatcher::builder(DispatchMiddleware::route(
///         When::matches([("body.type", json!("refund"))]),
///         refunds,
///     ))
///     .option(DispatchMiddleware::route(When::path("[2].user.admin"), admin))
///     .option(DispatchMiddleware::fallback(not_found))
///     .build(),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct DispatchMiddleware {
    dispatcher: Dispatcher<Args, Handler>,
}

impl DispatchMiddleware {
    /// Wraps a dispatcher whose options yield handlers.
    #[must_use]
    pub fn new(dispatcher: Dispatcher<Args, Handler>) -> Self {
        Self { dispatcher }
    }

    /// An option selecting `handler` when `condition` matches.
    pub fn route(condition: When<Args>, handler: Handler) -> DispatchOption<Args, Handler> {
        let name = handler.name();
        DispatchOption::constant(Some(condition), handler).named(name)
    }

    /// An option that always selects `handler`.
    pub fn fallback(handler: Handler) -> DispatchOption<Args, Handler> {
        let name = handler.name();
        DispatchOption::constant(None, handler).named(name)
    }

    /// Returns the wrapped dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<Args, Handler> {
        &self.dispatcher
    }
}

impl Middleware for DispatchMiddleware {
    fn name(&self) -> &'static str {
        "dispatch"
    }

    fn handle<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
        state: &'a mut FlowState,
        next: Next<'a>,
    ) -> BoxFuture<'a, FlowResult> {
        Box::pin(async move {
            let args = snapshot(request, response, state);
            match self.dispatcher.dispatch(&args)? {
                Some(handler) => {
                    tracing::debug!(
                        handler = handler.name(),
                        invocation_id = %state.invocation_id(),
                        "dispatching to handler"
                    );
                    handler.invoke(request, response, state, next).await
                }
                None => next.run(request, response, state).await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use http::{Method, StatusCode, Uri};
    use serde_json::json;

    fn reply(name: &'static str) -> Handler {
        Handler::named_fn(name, move |_req, res, _next, _state| {
            Box::pin(async move {
                res.send(StatusCode::OK, name);
                Ok(())
            })
        })
    }

    fn order(kind: &str) -> Request {
        Request::new(Method::POST, Uri::from_static("/orders"))
            .with_json(&json!({ "type": kind, "amount": "12" }))
    }

    fn routes() -> DispatchMiddleware {
        DispatchMiddleware::new(
            Dispatcher::builder(DispatchMiddleware::route(
                When::matches([("body.type", json!("refund"))]),
                reply("refunds"),
            ))
            .option(DispatchMiddleware::route(
                When::matches([("body.amount", json!(12))]),
                reply("payments"),
            ))
            .build(),
        )
    }

    #[test]
    fn test_snapshot_shape() {
        let mut state = FlowState::new();
        state.set("user", json!({ "id": 7 }));
        let args = snapshot(&order("refund"), &Response::new(), &state);

        assert_eq!(args.len(), 3);
        assert_eq!(args.get(0).unwrap()["body"]["type"], json!("refund"));
        assert_eq!(args.get(1).unwrap()["sent"], json!(false));
        assert_eq!(args.get(2).unwrap()["user"]["id"], json!(7));
    }

    #[tokio::test]
    async fn test_first_match_runs() {
        let mut response = Response::new();
        routes()
            .handle(&mut order("refund"), &mut response, &mut FlowState::new(), Next::end())
            .await
            .unwrap();
        assert_eq!(response.body().as_ref(), b"refunds");
    }

    #[tokio::test]
    async fn test_coerced_match() {
        let mut response = Response::new();
        routes()
            .handle(&mut order("sale"), &mut response, &mut FlowState::new(), Next::end())
            .await
            .unwrap();
        assert_eq!(response.body().as_ref(), b"payments");
    }

    #[tokio::test]
    async fn test_no_match_continues() {
        let only_refunds = DispatchMiddleware::new(
            Dispatcher::builder(DispatchMiddleware::route(
                When::path("[2].admin"),
                reply("admin"),
            ))
            .build(),
        );
        let next = Next::terminal(|_req, _res, state| {
            Box::pin(async move {
                state.set("continued", true);
                Ok(())
            })
        });

        let mut state = FlowState::new();
        let mut response = Response::new();
        only_refunds
            .handle(&mut order("sale"), &mut response, &mut state, next)
            .await
            .unwrap();
        assert!(!response.is_sent());
        assert_eq!(state.get("continued"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_coercion_error_propagates() {
        let bad = DispatchMiddleware::new(
            Dispatcher::builder(DispatchMiddleware::route(
                When::matches([("body", json!(["not", "coercible"]))]),
                reply("never"),
            ))
            .build(),
        );
        let request = &mut Request::new(Method::POST, Uri::from_static("/")).with_body("text");
        let err = bad
            .handle(request, &mut Response::new(), &mut FlowState::new(), Next::end())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Dispatch(_)));
    }

    #[test]
    fn test_options_named_after_handlers() {
        let routes = routes();
        let names: Vec<_> = routes
            .dispatcher()
            .options()
            .iter()
            .map(|o| o.name())
            .collect();
        assert_eq!(names, vec![Some("refunds"), Some("payments")]);
    }
}
