//! The executable request pipeline produced by [`RouteBuilder::handler`](crate::RouteBuilder::handler).

use super::{
    builder::BuilderConfig,
    extract::{self, BodyKind},
    middleware::{self, BoxedMiddleware},
    options::RouteOptions,
};
use crate::{BoxError, ContextData, ParamMap, PipelineError, RequestParts, RouteContext, Schema, Slot};

use {
    axum::{
        body::Body,
        extract::{FromRequestParts, RawPathParams, rejection::RawPathParamsRejection},
        handler::Handler,
        response::Response,
    },
    futures_util::future::BoxFuture,
    http::Request,
    serde_json::Value,
    std::{fmt, future, sync::Arc},
    tracing::Instrument,
};

/// Slot values after validation, plus merged middleware data.
pub(crate) struct Validated {
    pub(crate) params: Value,
    pub(crate) query: Value,
    pub(crate) body: Value,
    pub(crate) data: ContextData,
}

/// Type-erased user handler. Normalizes its result into a response.
pub(crate) type BoxedHandler =
    Arc<dyn Fn(RequestParts, Validated) -> BoxFuture<'static, Result<Response, BoxError>> + Send + Sync>;

struct Pipeline {
    config: BuilderConfig,
    middleware: Vec<BoxedMiddleware>,
    options: RouteOptions,
    handler: BoxedHandler,
}

/// A fully configured route: validates, runs middleware, calls the handler
/// and maps failures to responses.
///
/// Cloning is cheap and invocations share no mutable state, so one route can
/// serve any number of concurrent requests.
///
/// `ExecutableRoute` implements [`axum::handler::Handler`] and can be
/// mounted directly:
///
/// ```rust
/// use axum::{Router, routing::post};
/// use axum_conduit::RouteBuilder;
///
/// let create = RouteBuilder::new()
///     .handler(|_parts, ctx| async move { Ok::<_, std::convert::Infallible>(ctx.body) });
///
/// let app: Router = Router::new().route("/items/{id}", post(create));
/// # let _ = app;
/// ```
#[derive(Clone)]
pub struct ExecutableRoute {
    inner: Arc<Pipeline>,
}

impl ExecutableRoute {
    pub(crate) fn new(
        config: BuilderConfig,
        middleware: Vec<BoxedMiddleware>,
        options: RouteOptions,
        handler: BoxedHandler,
    ) -> Self {
        Self {
            inner: Arc::new(Pipeline {
                config,
                middleware,
                options,
                handler,
            }),
        }
    }

    /// Handles one request. Never fails: every error becomes a response.
    pub async fn execute(&self, request: Request<Body>, route: RouteContext) -> Response {
        let span = tracing::debug_span!(
            "route",
            method = %request.method(),
            path = %request.uri().path(),
        );

        async move {
            match self.try_execute(request, route).await {
                Ok(response) => response,
                Err(err) => err.into_response_with(self.inner.options.handle_server_error.as_ref()),
            }
        }
        .instrument(span)
        .await
    }

    /// Runs the pipeline, returning failures instead of mapping them.
    ///
    /// Stages run strictly in order: extraction, params/query/body
    /// validation, middleware, handler. The first failure aborts the rest.
    pub async fn try_execute(
        &self,
        request: Request<Body>,
        route: RouteContext,
    ) -> Result<Response, PipelineError> {
        let pipeline = &self.inner;

        let params = route.resolve().await.map_err(PipelineError::Unclassified)?;
        let (parts, body) = request.into_parts();
        let query = extract::query_map(&parts.uri);
        let kind = BodyKind::detect(&parts.method, &parts.headers);
        tracing::debug!(body_kind = ?kind, "Extracting request");

        let body = extract::body_value(
            kind,
            &parts.headers,
            body,
            pipeline.options.max_payload_size_bytes,
        )
        .await
        .map_err(PipelineError::unclassified)?;

        let params = validate_slot(Slot::Params, pipeline.config.params.as_deref(), Value::Object(params)).await?;
        let query = validate_slot(Slot::Query, pipeline.config.query.as_deref(), Value::Object(query)).await?;
        let body = validate_slot(Slot::Body, pipeline.config.body.as_deref(), body).await?;

        let parts: RequestParts = Arc::new(parts);
        let data = middleware::run_chain(&pipeline.middleware, &parts)
            .await
            .map_err(PipelineError::Unclassified)?;
        tracing::debug!(middleware = pipeline.middleware.len(), "Context assembled");

        let validated = Validated {
            params,
            query,
            body,
            data,
        };
        (pipeline.handler)(parts, validated)
            .await
            .map_err(PipelineError::Unclassified)
    }
}

/// Runs `schema` over `value`, or passes `value` through when the slot has
/// no schema.
async fn validate_slot(slot: Slot, schema: Option<&dyn Schema>, value: Value) -> Result<Value, PipelineError> {
    let Some(schema) = schema else {
        return Ok(value);
    };

    schema
        .validate(value)
        .await
        .map_err(|issues| PipelineError::validation(slot, issues))
}

impl fmt::Debug for ExecutableRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableRoute")
            .field("middleware", &self.inner.middleware.len())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

/// Converts axum's matched path params into a route context. A route
/// without params resolves to an empty mapping.
fn path_params(params: Result<RawPathParams, RawPathParamsRejection>) -> Result<Option<ParamMap>, BoxError> {
    match params {
        Ok(params) => Ok(Some(
            params
                .iter()
                .map(|(key, value)| (key.to_owned(), Value::String(value.to_owned())))
                .collect(),
        )),
        Err(RawPathParamsRejection::MissingPathParams(_)) => Ok(None),
        Err(rejection) => Err(rejection.into()),
    }
}

impl<S> Handler<(), S> for ExecutableRoute
where
    S: Send + Sync + 'static,
{
    type Future = BoxFuture<'static, Response>;

    fn call(self, req: Request<Body>, state: S) -> Self::Future {
        Box::pin(async move {
            let (mut parts, body) = req.into_parts();
            let params = path_params(RawPathParams::from_request_parts(&mut parts, &state).await);
            let route = RouteContext::pending(future::ready(params));
            self.execute(Request::from_parts(parts, body), route).await
        })
    }
}
