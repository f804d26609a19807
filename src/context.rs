//! Per-request context handed to middleware and handlers.

use crate::BoxError;

use {
    futures_util::future::BoxFuture,
    http::request::Parts,
    serde::de::DeserializeOwned,
    serde_json::{Map, Value},
    std::{fmt, future::Future, marker::PhantomData, sync::Arc},
};

/// Merged output of every middleware that ran for the request.
pub type ContextData = Map<String, Value>;

/// Flat key/value mapping used for params, query and form bodies.
pub type ParamMap = Map<String, Value>;

/// Request head shared with middleware and the handler once the body has
/// been consumed by extraction.
pub type RequestParts = Arc<Parts>;

/// Route-level context supplied by the host framework alongside the request.
///
/// The params bag may still be pending; the pipeline awaits it before any
/// other stage runs.
pub struct RouteContext {
    params: BoxFuture<'static, Result<Option<ParamMap>, BoxError>>,
}

impl RouteContext {
    /// A route context without params.
    pub fn new() -> Self {
        Self {
            params: Box::pin(async { Ok::<Option<ParamMap>, BoxError>(None) }),
        }
    }

    /// A route context whose params are already resolved.
    pub fn with_params(params: ParamMap) -> Self {
        Self {
            params: Box::pin(async move { Ok::<_, BoxError>(Some(params)) }),
        }
    }

    /// A route context whose params resolve later. A failure of `params`
    /// aborts the request as an unclassified error.
    pub fn pending<F, E>(params: F) -> Self
    where
        F: Future<Output = Result<Option<ParamMap>, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            params: Box::pin(async move { params.await.map_err(Into::<BoxError>::into) }),
        }
    }

    /// Awaits the params bag, defaulting to an empty mapping.
    pub(crate) async fn resolve(self) -> Result<ParamMap, BoxError> {
        Ok(self.params.await?.unwrap_or_default())
    }
}

impl Default for RouteContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RouteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteContext").finish_non_exhaustive()
    }
}

/// Validated request facets plus merged middleware data.
///
/// `Ctx` records, at the type level, which fragments the registered
/// middleware produce. It carries no runtime data.
pub struct RequestContext<Ctx = ()> {
    pub params: Value,
    pub query: Value,
    pub body: Value,
    pub data: ContextData,
    _ctx: PhantomData<fn() -> Ctx>,
}

impl<Ctx> RequestContext<Ctx> {
    pub(crate) fn new(params: Value, query: Value, body: Value, data: ContextData) -> Self {
        Self {
            params,
            query,
            body,
            data,
            _ctx: PhantomData,
        }
    }

    /// Reads a fragment type produced by one of the registered middleware.
    ///
    /// Only compiles when `T` appears in the builder's middleware chain. The
    /// fragment is read from the merged data, so keys overwritten by later
    /// middleware show their final value.
    pub fn fragment<T, Index>(&self) -> Result<T, serde_json::Error>
    where
        Ctx: Provides<T, Index>,
        T: DeserializeOwned,
    {
        self.data_as()
    }

    /// Deserializes the merged middleware data into any type.
    pub fn data_as<T>(&self) -> Result<T, serde_json::Error>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(Value::Object(self.data.clone()))
    }

    /// Deserializes the validated params.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.params.clone())
    }

    /// Deserializes the validated query.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.query.clone())
    }

    /// Deserializes the validated body.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}

impl<Ctx> fmt::Debug for RequestContext<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("params", &self.params)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("data", &self.data)
            .finish()
    }
}

/// Index marking the fragment at the head of the chain.
pub struct Here;

/// Index marking a fragment further back in the chain.
pub struct There<I>(PhantomData<I>);

/// Type-level proof that a middleware chain produces fragment `T`.
///
/// Chains are nested pairs `(((), A), B)`, built one `use_middleware` call
/// at a time. `Index` is inferred and never written by callers.
pub trait Provides<T, Index> {}

impl<Prev, T> Provides<T, Here> for (Prev, T) {}

impl<Prev, Head, T, I> Provides<T, There<I>> for (Prev, Head) where Prev: Provides<T, I> {}
