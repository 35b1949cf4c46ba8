//! End-to-end tests for handler lists, nesting and dispatch inside flows.

use flowgate_dispatch::{Dispatcher, When};
use flowgate_middleware::{
    BoxFuture, DispatchMiddleware, FlowError, FlowResult, FlowState, Handler, HandlerList,
    Middleware, Next, Request, Response,
};
use http::{Method, StatusCode, Uri};
use serde_json::{json, Value};

fn trace(state: &mut FlowState, step: &str) {
    let mut steps = state
        .get("trace")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    if let Value::Array(items) = &mut steps {
        items.push(json!(step));
    }
    state.set("trace", steps);
}

fn pass(name: &'static str) -> Handler {
    Handler::named_fn(name, move |req, res, next, state| {
        Box::pin(async move {
            trace(state, name);
            next.run(req, res, state).await
        })
    })
}

fn stop(name: &'static str) -> Handler {
    Handler::named_fn(name, move |_req, _res, _next, state| {
        Box::pin(async move {
            trace(state, name);
            Ok(())
        })
    })
}

fn send(name: &'static str) -> Handler {
    Handler::named_fn(name, move |_req, res, _next, state| {
        Box::pin(async move {
            trace(state, name);
            res.send(StatusCode::OK, name);
            Ok(())
        })
    })
}

fn finish<'a>() -> Next<'a> {
    Next::terminal(|_req, _res, state| {
        Box::pin(async move {
            trace(state, "finish");
            Ok(())
        })
    })
}

fn request() -> Request {
    Request::new(Method::GET, Uri::from_static("/orders"))
}

/// Handler object recording the argument order it was called with.
struct Recorder;

impl Middleware for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn handle<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
        state: &'a mut FlowState,
        next: Next<'a>,
    ) -> BoxFuture<'a, FlowResult> {
        Box::pin(async move {
            trace(state, request.path());
            next.run(request, response, state).await
        })
    }
}

#[tokio::test]
async fn test_stopping_handler_skips_rest_but_finishes() {
    let list = HandlerList::new([stop("mwA"), pass("mwB")]);
    let mut state = FlowState::new();
    let mut response = Response::new();

    list.run(&mut request(), &mut response, &mut state, finish())
        .await
        .unwrap();

    assert_eq!(state.get("trace"), Some(&json!(["mwA", "finish"])));
}

#[tokio::test]
async fn test_sending_handler_skips_rest_and_finish() {
    let list = HandlerList::new([send("mwA"), pass("mwB")]);
    let mut state = FlowState::new();
    let mut response = Response::new();

    list.run(&mut request(), &mut response, &mut state, finish())
        .await
        .unwrap();

    assert!(response.is_sent());
    assert_eq!(response.body().as_ref(), b"mwA");
    assert_eq!(state.get("trace"), Some(&json!(["mwA"])));
}

#[tokio::test]
async fn test_mixed_shapes_run_in_order() {
    let list = HandlerList::new([pass("first"), Handler::object(Recorder), pass("last")]);
    let mut state = FlowState::new();

    list.run(&mut request(), &mut Response::new(), &mut state, finish())
        .await
        .unwrap();

    assert_eq!(
        state.get("trace"),
        Some(&json!(["first", "/orders", "last", "finish"]))
    );
}

#[tokio::test]
async fn test_nested_lists() {
    let inner = HandlerList::new([pass("inner-1"), pass("inner-2")]);
    let outer = HandlerList::new([pass("outer-1"), Handler::object(inner), pass("outer-2")]);
    let mut state = FlowState::new();

    outer
        .run(&mut request(), &mut Response::new(), &mut state, finish())
        .await
        .unwrap();

    assert_eq!(
        state.get("trace"),
        Some(&json!(["outer-1", "inner-1", "inner-2", "outer-2", "finish"]))
    );
}

#[tokio::test]
async fn test_nested_list_stop_continues_outer() {
    // The inner list's finish is the outer `next`, so a stopped inner flow
    // still hands control back.
    let inner = HandlerList::new([stop("inner-stop"), pass("inner-skipped")]);
    let outer = HandlerList::new([Handler::object(inner), pass("outer-after")]);
    let mut state = FlowState::new();

    outer
        .run(&mut request(), &mut Response::new(), &mut state, finish())
        .await
        .unwrap();

    assert_eq!(
        state.get("trace"),
        Some(&json!(["inner-stop", "outer-after", "finish"]))
    );
}

#[tokio::test]
async fn test_handler_error_propagates_without_finish() {
    let failing = Handler::named_fn("failing", |_req, _res, _next, _state| {
        Box::pin(async { Err(FlowError::handler("failing", "boom")) })
    });
    let list = HandlerList::new([pass("before"), failing, pass("after")]);
    let mut state = FlowState::new();

    let err = list
        .run(&mut request(), &mut Response::new(), &mut state, finish())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "handler `failing` failed: boom");
    assert_eq!(state.get("trace"), Some(&json!(["before"])));
}

#[tokio::test]
async fn test_dispatch_inside_list() {
    let routes = DispatchMiddleware::new(
        Dispatcher::builder(DispatchMiddleware::route(
            When::path("[2].user.active"),
            send("active"),
        ))
        .option(DispatchMiddleware::fallback(pass("inactive")))
        .build(),
    );

    let load_user = |active: bool| {
        Handler::named_fn("load_user", move |req, res, next, state| {
            Box::pin(async move {
                state.set("user", json!({ "active": active }));
                next.run(req, res, state).await
            })
        })
    };

    let list = HandlerList::new([load_user(true), Handler::object(routes.clone())]);
    let mut state = FlowState::new();
    let mut response = Response::new();
    list.run(&mut request(), &mut response, &mut state, finish())
        .await
        .unwrap();
    assert!(response.is_sent());
    assert_eq!(state.get("trace"), Some(&json!(["active"])));

    let list = HandlerList::new([load_user(false), Handler::object(routes)]);
    let mut state = FlowState::new();
    let mut response = Response::new();
    list.run(&mut request(), &mut response, &mut state, finish())
        .await
        .unwrap();
    assert!(!response.is_sent());
    assert_eq!(state.get("trace"), Some(&json!(["inactive", "finish"])));
}

#[tokio::test]
async fn test_dispatch_on_response_state() {
    // `[1].headersSent` reads the response snapshot.
    let routes = DispatchMiddleware::new(
        Dispatcher::builder(DispatchMiddleware::route(
            When::matches([("[1].headersSent", json!(false))]),
            pass("unsent"),
        ))
        .build(),
    );
    let list = HandlerList::new([Handler::object(routes)]);
    let mut state = FlowState::new();

    list.run(&mut request(), &mut Response::new(), &mut state, finish())
        .await
        .unwrap();

    assert_eq!(state.get("trace"), Some(&json!(["unsent", "finish"])));
}
