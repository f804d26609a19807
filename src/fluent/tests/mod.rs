//! Test helpers and utilities for route pipeline tests
//!
//! These tests call [`ExecutableRoute::execute`] directly with an in-memory
//! request, so no router or network is involved. Router-level tests live in
//! `tests/`.
//!
//! ## Available Helpers
//!
//! - Schemas: `non_empty_string_field()`, `numeric_id()`, `reject_all()`
//! - Request helpers: `get_request()`, `json_request()`, `form_request()`
//! - Response helpers: `get_body_json()`, `get_body_string()`

use crate::{ExecutableRoute, Issue, ParamMap, RouteContext, Validation, schema_fn, Schema};
use axum::{body::Body, http::Request, response::Response};
use serde_json::{Value, json};

pub(crate) mod builder;

// ============================================================================
// Schema Helpers
// ============================================================================

/// Requires `field` to be a non-empty string; returns just that field.
pub(crate) fn non_empty_string_field(field: &'static str) -> impl Schema {
    schema_fn(move |value: Value| match value.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(json!({ field: s })),
        _ => Err(vec![
            Issue::new("too_small", format!("{field} must be a non-empty string")).at([field]),
        ]),
    })
}

/// Requires an `id` that parses as an integer, coercing it to a number.
pub(crate) fn numeric_id() -> impl Schema {
    schema_fn(|value: Value| -> Validation {
        match value.get("id").and_then(Value::as_str).map(str::parse::<i64>) {
            Some(Ok(id)) => Ok(json!({ "id": id })),
            _ => Err(vec![Issue::new("invalid_type", "id must be an integer").at(["id"])]),
        }
    })
}

/// Rejects every value with a single issue tagged `code`.
pub(crate) fn reject_all(code: &'static str) -> impl Schema {
    schema_fn(move |_| Err(vec![Issue::new(code, "rejected")]))
}

/// Builds a params mapping from string pairs.
pub(crate) fn params(pairs: &[(&str, &str)]) -> ParamMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

/// Executes `route` with already-resolved params.
pub(crate) async fn execute_with_params(
    route: &ExecutableRoute,
    request: Request<Body>,
    pairs: &[(&str, &str)],
) -> Response {
    route
        .execute(request, RouteContext::with_params(params(pairs)))
        .await
}

// ============================================================================
// Request Helpers
// ============================================================================

/// Creates a GET request to the specified URI.
pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Creates a request with a JSON body and content type.
pub(crate) fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

/// Creates a urlencoded form POST.
pub(crate) fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Extracts the body from a response as a String.
pub(crate) async fn get_body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

/// Extracts the body from a response as JSON.
pub(crate) async fn get_body_json(response: Response) -> Value {
    serde_json::from_str(&get_body_string(response).await).expect("response body is not JSON")
}
