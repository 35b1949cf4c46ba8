//! Request and response types threaded through a flow.
//!
//! Both are plain owned values. [`Response`] carries a `sent` flag: once a
//! handler sends it, the rest of the flow is skipped and a handler list does
//! not call its `finish` continuation.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode, Uri};
use http_body_util::Full;
use serde_json::{Map, Value};

/// An inbound request.
///
/// # Example
///
/// ```
/// use flowgate_middleware::Request;
/// use http::{Method, Uri};
/// use serde_json::json;
///
/// let request = Request::new(Method::POST, Uri::from_static("/orders?page=2"))
///     .with_json(&json!({ "type": "refund" }));
///
/// assert_eq!(request.path(), "/orders");
/// assert_eq!(request.json_body(), Some(json!({ "type": "refund" })));
/// assert_eq!(request.to_value()["query"]["page"], json!("2"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: Map<String, Value>,
}

impl Request {
    /// Creates a request with an empty body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: Map::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and content type.
    #[must_use]
    pub fn with_json(mut self, body: &Value) -> Self {
        self.body = Bytes::from(body.to_string());
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Sets a route parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the URI path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the route parameters.
    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Returns the route parameters mutably.
    pub fn params_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.params
    }

    /// Parses the body as JSON, if it is JSON.
    #[must_use]
    pub fn json_body(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }

    /// Decodes the query string. Later duplicates win.
    #[must_use]
    pub fn query(&self) -> Map<String, Value> {
        self.uri
            .query()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    }

    /// Snapshots the request as JSON for key-path predicates.
    ///
    /// Shape: `{ method, path, query, headers, params, body }`. Header names
    /// are lowercase; non-UTF-8 header values are skipped. `body` is the
    /// parsed JSON body, the body text, or `null`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let headers: Map<String, Value> = self
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
            })
            .collect();

        let body = self.json_body().unwrap_or_else(|| {
            if self.body.is_empty() {
                Value::Null
            } else {
                Value::String(String::from_utf8_lossy(&self.body).into_owned())
            }
        });

        serde_json::json!({
            "method": self.method.as_str(),
            "path": self.path(),
            "query": self.query(),
            "headers": headers,
            "params": self.params,
            "body": body,
        })
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: Map::new(),
        }
    }
}

/// An outbound response under construction.
///
/// # Example
///
/// ```
/// use flowgate_middleware::Response;
/// use http::StatusCode;
///
/// let mut response = Response::new();
/// assert!(!response.is_sent());
///
/// response.send(StatusCode::ACCEPTED, "queued");
/// assert!(response.is_sent());
/// assert_eq!(response.status(), StatusCode::ACCEPTED);
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    sent: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates an unsent `200 OK` response with no body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            sent: false,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code without sending.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns `true` once the response has been sent.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Sets status and body and marks the response as sent.
    pub fn send(&mut self, status: StatusCode, body: impl Into<Bytes>) {
        self.status = status;
        self.body = body.into();
        self.sent = true;
    }

    /// Sends a JSON body.
    pub fn send_json(&mut self, status: StatusCode, body: &Value) {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.send(status, body.to_string());
    }

    /// Sends a plain-text error.
    pub fn send_error(&mut self, status: StatusCode, message: &str) {
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.send(status, message.to_string());
    }

    /// Sends a JSON error envelope `{ "error": { "code", "message" } }`.
    pub fn send_json_error(&mut self, status: StatusCode, code: &str, message: &str) {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        self.send_json(status, &body);
    }

    /// Snapshots the response as JSON: `{ status, sent, headersSent, headers }`.
    ///
    /// `headersSent` is an alias of `sent`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let headers: Map<String, Value> = self
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
            })
            .collect();

        serde_json::json!({
            "status": self.status.as_u16(),
            "sent": self.sent,
            "headersSent": self.sent,
            "headers": headers,
        })
    }

    /// Converts into an `http::Response` for the transport layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the response parts are rejected by the builder.
    pub fn into_http(self) -> Result<http::Response<Full<Bytes>>, http::Error> {
        let mut builder = http::Response::builder().status(self.status);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers);
        }
        builder.body(Full::new(self.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_snapshot() {
        let request = Request::new(Method::GET, Uri::from_static("/users/7?expand=roles&x=a%20b"))
            .with_header(
                HeaderName::from_static("x-tenant"),
                HeaderValue::from_static("acme"),
            )
            .with_param("id", "7");

        let value = request.to_value();
        assert_eq!(value["method"], json!("GET"));
        assert_eq!(value["path"], json!("/users/7"));
        assert_eq!(value["query"]["expand"], json!("roles"));
        assert_eq!(value["query"]["x"], json!("a b"));
        assert_eq!(value["headers"]["x-tenant"], json!("acme"));
        assert_eq!(value["params"]["id"], json!("7"));
        assert_eq!(value["body"], Value::Null);
    }

    #[test]
    fn test_request_text_body() {
        let request = Request::new(Method::POST, Uri::from_static("/")).with_body("plain text");
        assert_eq!(request.json_body(), None);
        assert_eq!(request.to_value()["body"], json!("plain text"));
    }

    #[test]
    fn test_request_from_http() {
        let http_request = http::Request::builder()
            .method(Method::PUT)
            .uri("/items/1")
            .body(Bytes::from_static(b"{\"qty\":3}"))
            .unwrap();
        let request = Request::from(http_request);
        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(request.json_body(), Some(json!({ "qty": 3 })));
    }

    #[test]
    fn test_send_json_error() {
        let mut response = Response::new();
        response.send_json_error(StatusCode::UNAUTHORIZED, "AUTH_REQUIRED", "Authentication required");

        assert!(response.is_sent());
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], json!("AUTH_REQUIRED"));
    }

    #[test]
    fn test_send_error_text() {
        let mut response = Response::new();
        response.send_error(StatusCode::BAD_REQUEST, "Invalid input");
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_response_snapshot_and_http() {
        let mut response = Response::new();
        response.set_status(StatusCode::CREATED);
        assert_eq!(response.to_value()["headersSent"], json!(false));

        response.send(StatusCode::CREATED, "done");
        assert_eq!(response.to_value()["sent"], json!(true));

        let http_response = response.into_http().unwrap();
        assert_eq!(http_response.status(), StatusCode::CREATED);
    }
}
