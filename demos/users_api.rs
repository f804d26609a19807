//! A small in-memory users API built from route pipelines.
//!
//! ```sh
//! RUST_ENV=dev RUST_LOG=axum_conduit=debug cargo run --example users_api
//! curl -X POST localhost:3000/users -H 'content-type: application/json' -d '{"name":"Ada","email":"ada@example.com"}'
//! curl localhost:3000/users/1
//! curl -X DELETE localhost:3000/users/1 -H 'x-role: admin'
//! ```

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_conduit::{BoxError, Config, Issue, Result, RouteBuilder, RouteOptions, Typed};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    collections::BTreeMap,
    convert::Infallible,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

#[derive(Debug, Clone, Deserialize, Serialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

#[derive(Deserialize, Serialize)]
struct NewUser {
    name: String,
    email: String,
}

#[derive(Deserialize, Serialize)]
struct UserPath {
    #[serde(deserialize_with = "parse_id")]
    id: u64,
}

fn parse_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

#[derive(Deserialize, Serialize)]
struct Caller {
    role: String,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("user {0} not found")]
    NotFound(u64),
    #[error("admin role required")]
    Forbidden,
}

#[derive(Default)]
struct Store {
    next_id: AtomicU64,
    users: RwLock<BTreeMap<u64, User>>,
}

impl Store {
    fn insert(&self, new: NewUser) -> User {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User {
            id,
            name: new.name,
            email: new.email,
        };
        if let Ok(mut users) = self.users.write() {
            users.insert(id, user.clone());
        }
        user
    }

    fn get(&self, id: u64) -> Option<User> {
        self.users.read().ok()?.get(&id).cloned()
    }

    fn remove(&self, id: u64) -> Option<User> {
        self.users.write().ok()?.remove(&id)
    }
}

/// Maps domain errors to their status codes; everything else is a 500.
fn server_error(err: BoxError) -> Response {
    match err.downcast::<ApiError>() {
        Ok(api) => {
            let status = match *api {
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::Forbidden => StatusCode::FORBIDDEN,
            };
            (status, Json(json!({ "message": api.to_string() }))).into_response()
        }
        Err(other) => {
            tracing::error!(error = %other, "Unexpected failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal server error" })),
            )
                .into_response()
        }
    }
}

fn app(config: &Config, store: Arc<Store>) -> Router {
    let base = RouteBuilder::with_options(RouteOptions::from_config(config).handle_server_error(server_error));
    let by_id = base.params(Typed::<UserPath>::new());

    let create = {
        let store = Arc::clone(&store);
        base.body(Typed::<NewUser>::new().check(|user| {
            let mut issues = vec![];
            if user.name.trim().is_empty() {
                issues.push(Issue::new("too_small", "name must not be empty").at(["name"]));
            }
            if !user.email.contains('@') {
                issues.push(Issue::new("invalid_string", "email must contain '@'").at(["email"]));
            }
            issues
        }))
        .handler(move |_parts, ctx| {
            let store = Arc::clone(&store);
            async move {
                let user = store.insert(ctx.body_as::<NewUser>()?);
                Ok::<_, BoxError>((StatusCode::CREATED, Json(user)).into_response())
            }
        })
    };

    let show = {
        let store = Arc::clone(&store);
        by_id.clone().handler(move |_parts, ctx| {
            let store = Arc::clone(&store);
            async move {
                let UserPath { id } = ctx.params_as()?;
                let user = store.get(id).ok_or(ApiError::NotFound(id))?;
                Ok::<_, BoxError>(Json(user))
            }
        })
    };

    let remove = by_id
        .use_middleware(|parts, _data| async move {
            let role = parts
                .headers
                .get("x-role")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("guest")
                .to_owned();
            Ok::<_, Infallible>(Caller { role })
        })
        .handler(move |_parts, ctx| {
            let store = Arc::clone(&store);
            async move {
                let caller: Caller = ctx.fragment::<Caller, _>()?;
                if caller.role != "admin" {
                    return Err(ApiError::Forbidden.into());
                }
                let UserPath { id } = ctx.params_as()?;
                let user = store.remove(id).ok_or(ApiError::NotFound(id))?;
                Ok::<_, BoxError>(json!({ "deleted": user.id }))
            }
        });

    Router::new()
        .route("/users", post(create))
        .route("/users/{id}", get(show).delete(remove))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::default();
    config.setup_tracing();

    let app = app(&config, Arc::new(Store::default()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Listening on http://127.0.0.1:3000");
    axum::serve(listener, app).await?;
    Ok(())
}
