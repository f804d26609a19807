//! Immutable route builder: schema slots, middleware chain and options.

use super::{
    middleware::{self, BoxedMiddleware},
    options::RouteOptions,
    reply::IntoReply,
    route::{BoxedHandler, ExecutableRoute, Validated},
};
use crate::{BoxError, ContextData, RequestContext, RequestParts, Schema};

use {
    axum::response::Response,
    futures_util::future::BoxFuture,
    serde::Serialize,
    std::{fmt, future::Future, marker::PhantomData, sync::Arc},
};

/// Schema slots accumulated by a builder. Absent slots pass their value
/// through unchanged.
#[derive(Clone, Default)]
pub(crate) struct BuilderConfig {
    pub(crate) params: Option<Arc<dyn Schema>>,
    pub(crate) query: Option<Arc<dyn Schema>>,
    pub(crate) body: Option<Arc<dyn Schema>>,
}

/// Fluent, copy-on-write builder for an [`ExecutableRoute`].
///
/// Every chaining call borrows the builder and returns a new one, so a
/// partially configured builder can be shared and branched freely:
///
/// ```rust
/// use axum_conduit::{RouteBuilder, Typed};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Deserialize, Serialize)]
/// struct UserId {
///     id: String,
/// }
///
/// #[derive(Serialize)]
/// struct Caller {
///     caller: &'static str,
/// }
///
/// let base = RouteBuilder::new()
///     .params(Typed::<UserId>::new())
///     .use_middleware(|_parts, _data| async { Ok::<_, std::convert::Infallible>(Caller { caller: "svc" }) });
///
/// // Two routes sharing the same params schema and middleware.
/// let show = base.clone().handler(|_parts, ctx| async move { Ok::<_, std::convert::Infallible>(json!({ "id": ctx.params["id"] })) });
/// let remove = base.handler(|_parts, _ctx| async { Ok::<_, std::convert::Infallible>(json!({ "deleted": true })) });
/// # let _ = (show, remove);
/// ```
///
/// `Ctx` records the fragment types produced by the middleware registered
/// so far; see [`RequestContext::fragment`].
pub struct RouteBuilder<Ctx = ()> {
    config: BuilderConfig,
    middleware: Vec<BoxedMiddleware>,
    options: RouteOptions,
    _ctx: PhantomData<fn() -> Ctx>,
}

impl RouteBuilder {
    /// Creates a builder with no schemas, no middleware and default options.
    pub fn new() -> Self {
        Self::with_options(RouteOptions::default())
    }

    /// Creates an empty builder with the given options.
    pub fn with_options(options: RouteOptions) -> Self {
        RouteBuilder {
            config: BuilderConfig::default(),
            middleware: Vec::new(),
            options,
            _ctx: PhantomData,
        }
    }
}

impl Default for RouteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> Clone for RouteBuilder<Ctx> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            middleware: self.middleware.clone(),
            options: self.options.clone(),
            _ctx: PhantomData,
        }
    }
}

impl<Ctx> RouteBuilder<Ctx> {
    /// Returns a builder validating route params with `schema`.
    #[must_use]
    pub fn params<S>(&self, schema: S) -> Self
    where
        S: Schema + 'static,
    {
        let mut next = self.clone();
        next.config.params = Some(Arc::new(schema));
        next
    }

    /// Returns a builder validating the query string with `schema`.
    #[must_use]
    pub fn query<S>(&self, schema: S) -> Self
    where
        S: Schema + 'static,
    {
        let mut next = self.clone();
        next.config.query = Some(Arc::new(schema));
        next
    }

    /// Returns a builder validating the request body with `schema`.
    #[must_use]
    pub fn body<S>(&self, schema: S) -> Self
    where
        S: Schema + 'static,
    {
        let mut next = self.clone();
        next.config.body = Some(Arc::new(schema));
        next
    }

    /// Returns a builder with `middleware` appended to the chain.
    ///
    /// Middleware receive the request head and the data merged from every
    /// earlier middleware, and return a fragment that must serialize to a
    /// JSON object (or `null`). Nothing runs until a request arrives.
    #[must_use]
    pub fn use_middleware<F, Fut, Fragment, E>(&self, middleware: F) -> RouteBuilder<(Ctx, Fragment)>
    where
        F: Fn(RequestParts, ContextData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Fragment, E>> + Send + 'static,
        Fragment: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let mut chain = self.middleware.clone();
        chain.push(middleware::boxed(middleware));

        RouteBuilder {
            config: self.config.clone(),
            middleware: chain,
            options: self.options.clone(),
            _ctx: PhantomData,
        }
    }

    /// Returns a builder with a custom mapping for unclassified failures.
    #[must_use]
    pub fn handle_server_error<H>(&self, handler: H) -> Self
    where
        H: Fn(BoxError) -> Response + Send + Sync + 'static,
    {
        let mut next = self.clone();
        next.options = next.options.handle_server_error(handler);
        next
    }

    /// Forgets the fragment types recorded so far, keeping the chain itself.
    ///
    /// Useful when middleware are registered in a loop. Fragments remain
    /// reachable through [`RequestContext::data`] and
    /// [`RequestContext::data_as`].
    #[must_use]
    pub fn untyped(&self) -> RouteBuilder {
        RouteBuilder {
            config: self.config.clone(),
            middleware: self.middleware.clone(),
            options: self.options.clone(),
            _ctx: PhantomData,
        }
    }

    /// Number of middleware registered so far.
    pub fn middleware_len(&self) -> usize {
        self.middleware.len()
    }

    /// Finishes the builder, producing the request-handling route.
    ///
    /// `handler` is not called here; it runs once per request after
    /// validation and middleware succeed.
    pub fn handler<F, Fut, R, E>(self, handler: F) -> ExecutableRoute
    where
        Ctx: 'static,
        F: Fn(RequestParts, RequestContext<Ctx>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: IntoReply + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let handler: BoxedHandler = Arc::new(
            move |parts: RequestParts, validated: Validated| -> BoxFuture<'static, Result<Response, BoxError>> {
                let context = RequestContext::<Ctx>::new(
                    validated.params,
                    validated.query,
                    validated.body,
                    validated.data,
                );
                let fut = handler(parts, context);
                Box::pin(async move { fut.await.map_err(Into::<BoxError>::into)?.into_reply() })
            },
        );

        ExecutableRoute::new(self.config, self.middleware, self.options, handler)
    }
}

impl<Ctx> fmt::Debug for RouteBuilder<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBuilder")
            .field("params", &self.config.params.is_some())
            .field("query", &self.config.query.is_some())
            .field("body", &self.config.body.is_some())
            .field("middleware", &self.middleware.len())
            .field("options", &self.options)
            .finish()
    }
}
