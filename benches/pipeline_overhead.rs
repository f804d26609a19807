//! Benchmarks for measuring route pipeline overhead.
//!
//! These benchmarks compare a bare axum handler with routes built through
//! `RouteBuilder`, with and without schemas and context middleware.

use axum::{Router, body::Body, http::Request, routing::post};
use axum_conduit::{ExecutableRoute, Issue, RouteBuilder, RouteContext, Typed};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{convert::Infallible, hint::black_box};
use tower::ServiceExt;

#[derive(Deserialize, Serialize)]
struct Payload {
    name: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Simple handler that returns immediately
async fn bare_handler() -> &'static str {
    "OK"
}

/// Creates a small JSON POST request for benchmarking
fn test_request(path: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name":"bench","tags":["a","b"]}"#))
        .unwrap()
}

/// Builds a route with `layers` no-op middleware and optional body schema
fn build_route(layers: usize, with_schema: bool) -> ExecutableRoute {
    let mut builder = RouteBuilder::new();
    if with_schema {
        builder = builder.body(Typed::<Payload>::new().check(|p| {
            if p.name.is_empty() {
                vec![Issue::new("too_small", "name must not be empty").at(["name"])]
            } else {
                vec![]
            }
        }));
    }

    for layer in 0..layers {
        let key = format!("layer_{layer}");
        builder = builder
            .use_middleware(move |_, _| {
                let fragment = json!({ key.as_str(): true });
                async move { Ok::<_, Infallible>(fragment) }
            })
            .untyped();
    }

    builder.handler(|_, ctx| async move { Ok::<_, Infallible>(json!({ "name": ctx.body["name"] })) })
}

/// Benchmark: Bare axum router (no pipeline)
fn bench_bare_axum(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = Router::new().route("/", post(bare_handler));

    c.bench_function("bare_axum", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router.clone().oneshot(test_request("/")).await.unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: ExecutableRoute::execute with increasing middleware counts
fn bench_middleware_chain(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("middleware_chain");

    for layers in [0, 1, 3, 8] {
        let route = build_route(layers, false);
        group.bench_with_input(BenchmarkId::from_parameter(layers), &layers, |b, _| {
            b.to_async(&rt).iter(|| async {
                let response = route.execute(test_request("/"), RouteContext::new()).await;
                black_box(response)
            })
        });
    }

    group.finish();
}

/// Benchmark: Body schema cost with and without middleware
fn bench_schema(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("body_schema");

    for (name, layers, with_schema) in [
        ("no_schema", 0, false),
        ("schema", 0, true),
        ("schema_3_middleware", 3, true),
    ] {
        let route = build_route(layers, with_schema);
        group.bench_function(name, |b| {
            b.to_async(&rt).iter(|| async {
                let response = route.execute(test_request("/"), RouteContext::new()).await;
                black_box(response)
            })
        });
    }

    group.finish();
}

/// Benchmark: Pipeline mounted on a Router, params from axum's matcher
fn bench_router_mounted(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = Router::new().route("/items/{id}", post(build_route(3, true)));

    c.bench_function("router_mounted", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router
                .clone()
                .oneshot(test_request("/items/42"))
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_bare_axum,
    bench_middleware_chain,
    bench_schema,
    bench_router_mounted,
);
criterion_main!(benches);
