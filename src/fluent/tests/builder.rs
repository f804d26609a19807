//! Builder immutability, branching and slot replacement.

use super::{execute_with_params, get_body_json, get_request, json_request, reject_all};
use crate::{RouteBuilder, RouteOptions, schema_fn};
use axum::http::StatusCode;
use serde_json::{Value, json};
use std::{
    convert::Infallible,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

fn tag(label: &'static str) -> impl crate::Schema {
    schema_fn(move |value: Value| Ok(json!({ "seen": value, "by": label })))
}

#[tokio::test]
async fn test_chaining_leaves_original_untouched() {
    let base = RouteBuilder::new();
    let _strict = base.query(reject_all("strict"));

    let route = base.handler(|_, ctx| async move { Ok::<_, Infallible>(ctx.query) });
    let response = route.execute(get_request("/?a=1"), Default::default()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await, json!({ "a": "1" }));
}

#[tokio::test]
async fn test_branches_from_shared_base_are_independent() {
    let base = RouteBuilder::new().use_middleware(|_, _| async { Ok::<_, Infallible>(json!({ "shared": true })) });

    let left = base
        .use_middleware(|_, _| async { Ok::<_, Infallible>(json!({ "branch": "left" })) })
        .handler(|_, ctx| async move { Ok::<_, Infallible>(ctx.data) });
    let right = base
        .body(reject_all("right_only"))
        .handler(|_, ctx| async move { Ok::<_, Infallible>(ctx.data) });

    let response = left
        .execute(json_request("POST", "/", "{}"), Default::default())
        .await;
    assert_eq!(
        get_body_json(response).await,
        json!({ "shared": true, "branch": "left" })
    );

    let response = right
        .execute(json_request("POST", "/", "{}"), Default::default())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["errors"][0]["code"], "right_only");

    assert_eq!(base.middleware_len(), 1);
}

#[tokio::test]
async fn test_last_schema_for_a_slot_wins() {
    let route = RouteBuilder::new()
        .params(tag("first"))
        .params(tag("second"))
        .handler(|_, ctx| async move { Ok::<_, Infallible>(ctx.params) });

    let response = execute_with_params(&route, get_request("/x/1"), &[("id", "1")]).await;
    assert_eq!(
        get_body_json(response).await,
        json!({ "seen": { "id": "1" }, "by": "second" })
    );
}

#[tokio::test]
async fn test_each_slot_keeps_its_own_schema() {
    let route = RouteBuilder::new()
        .params(tag("params"))
        .query(tag("query"))
        .body(tag("body"))
        .handler(|_, ctx| async move {
            Ok::<_, Infallible>(json!({
                "params": ctx.params["by"],
                "query": ctx.query["by"],
                "body": ctx.body["by"],
            }))
        });

    let response = execute_with_params(&route, json_request("PATCH", "/x/1?q=1", "[]"), &[("id", "1")]).await;
    assert_eq!(
        get_body_json(response).await,
        json!({ "params": "params", "query": "query", "body": "body" })
    );
}

#[test]
fn test_handler_not_called_at_build_time() {
    let called = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&called);

    let _route = RouteBuilder::new().handler(move |_, _| {
        flag.store(true, Ordering::SeqCst);
        async { Ok::<_, Infallible>(json!({})) }
    });

    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_route_is_reusable_across_requests() {
    let route = RouteBuilder::new().handler(|_, ctx| async move { Ok::<_, Infallible>(ctx.query) });

    let mut tasks = Vec::new();
    for n in 0..8 {
        let route = route.clone();
        tasks.push(tokio::spawn(async move {
            let response = route
                .execute(get_request(&format!("/?n={n}")), Default::default())
                .await;
            get_body_json(response).await
        }));
    }

    for (n, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap(), json!({ "n": n.to_string() }));
    }
}

#[test]
fn test_builder_debug_reports_configured_slots() {
    let builder = RouteBuilder::with_options(RouteOptions::new().with_max_payload_size_bytes(64))
        .body(reject_all("x"));
    let debug = format!("{builder:?}");

    assert!(debug.contains("params: false"));
    assert!(debug.contains("body: true"));
    assert!(debug.contains("max_payload_size_bytes: 64"));
}

#[tokio::test]
async fn test_untyped_keeps_chain_for_loops() {
    let mut builder = RouteBuilder::new();
    for n in 0..3 {
        builder = builder
            .use_middleware(move |_, _| async move { Ok::<_, Infallible>(json!({ format!("m{n}"): n })) })
            .untyped();
    }
    assert_eq!(builder.middleware_len(), 3);

    let route = builder.handler(|_, ctx| async move { Ok::<_, Infallible>(ctx.data) });
    let response = route.execute(get_request("/"), Default::default()).await;
    assert_eq!(
        get_body_json(response).await,
        json!({ "m0": 0, "m1": 1, "m2": 2 })
    );
}
