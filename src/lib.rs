//! # axum-conduit
//!
//! Declarative request pipelines for Axum handlers.
//!
//! Describe a route once: schemas for its path params, query string and body,
//! an ordered chain of context middleware, and the handler itself. The
//! resulting [`ExecutableRoute`] validates every request, assembles a typed
//! [`RequestContext`], calls the handler and normalizes what it returns.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::post};
//! use axum_conduit::{Config, Issue, Result, RouteBuilder, RouteOptions, Typed};
//! use serde::{Deserialize, Serialize};
//! use std::convert::Infallible;
//!
//! #[derive(Deserialize, Serialize)]
//! struct NewComment {
//!     text: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Author {
//!     author: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::default(); // Loads from config/{RUST_ENV}.toml
//!     config.setup_tracing();
//!
//!     let create_comment = RouteBuilder::with_options(RouteOptions::from_config(&config))
//!         .body(Typed::<NewComment>::new().check(|c| {
//!             if c.text.is_empty() {
//!                 vec![Issue::new("too_small", "text must not be empty").at(["text"])]
//!             } else {
//!                 vec![]
//!             }
//!         }))
//!         .use_middleware(|parts, _data| async move {
//!             let author = parts
//!                 .headers
//!                 .get("x-user")
//!                 .and_then(|v| v.to_str().ok())
//!                 .unwrap_or("anonymous")
//!                 .to_owned();
//!             Ok::<_, Infallible>(Author { author })
//!         })
//!         .handler(|_parts, ctx| async move {
//!             Ok::<_, Infallible>(serde_json::json!({
//!                 "post": ctx.params["post_id"],
//!                 "text": ctx.body["text"],
//!                 "author": ctx.data["author"],
//!             }))
//!         });
//!
//!     let app = Router::new().route("/posts/{post_id}/comments", post(create_comment));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Request Pipeline
//!
//! | Stage | Behaviour | Failure |
//! |-------|-----------|---------|
//! | Extraction | params from the route, query from the URL, body by `Content-Type` (skipped for `GET` and `DELETE`) | `500` / custom handler |
//! | Validation | params, then query, then body, each only if a schema is set | `400 { "message": "Invalid <slot>", "errors": [...] }` |
//! | Middleware | sequential, fragments shallow-merged left to right | `500` / custom handler |
//! | Handler | receives `{ params, query, body, data }` | `500` / custom handler |
//! | Normalization | a `Response` passes through, anything else becomes `200` JSON | `500` / custom handler |
//!
//! # Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Configuration loading and validation ([`Config`]) |
//! | [`fluent`] | Route builder and pipeline ([`RouteBuilder`], [`ExecutableRoute`]) |
//! | [`schema`] | Validation capability ([`Schema`], [`Typed`], [`schema_fn`]) |
//! | [`context`] | Per-request context ([`RequestContext`], [`RouteContext`]) |
//! | [`error`] | Error types ([`PipelineError`], [`Error`]) |
mod config;
mod context;
mod error;
mod fluent;
mod schema;
mod utils;

pub use config::*;
pub use context::*;
pub use error::*;
pub use fluent::*;
pub use schema::*;
pub use utils::*;

pub type Result<T> = std::result::Result<T, Error>;
