//! Context middleware: boxing user functions and folding their fragments.

use crate::{BoxError, ContextData, RequestParts};

use {
    futures_util::future::BoxFuture,
    serde::Serialize,
    serde_json::Value,
    std::{future::Future, sync::Arc},
};

/// Type-erased middleware stored in a builder chain.
pub(crate) type BoxedMiddleware =
    Arc<dyn Fn(RequestParts, ContextData) -> BoxFuture<'static, Result<ContextData, BoxError>> + Send + Sync>;

/// Erases a typed middleware into a [`BoxedMiddleware`].
///
/// The fragment is serialized to JSON as soon as the middleware resolves.
pub(crate) fn boxed<F, Fut, Fragment, E>(middleware: F) -> BoxedMiddleware
where
    F: Fn(RequestParts, ContextData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Fragment, E>> + Send + 'static,
    Fragment: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    Arc::new(
        move |parts: RequestParts, data: ContextData| -> BoxFuture<'static, Result<ContextData, BoxError>> {
            let fut = middleware(parts, data);
            Box::pin(async move {
                let fragment = fut.await.map_err(Into::<BoxError>::into)?;
                into_fragment(&fragment)
            })
        },
    )
}

/// Serializes a middleware result into an object fragment. `null` is an
/// empty fragment.
pub(crate) fn into_fragment<T>(fragment: &T) -> Result<ContextData, BoxError>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(fragment)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ContextData::new()),
        other => Err(format!(
            "middleware must return an object fragment, got {}",
            kind_of(&other)
        )
        .into()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Runs `chain` strictly in order, awaiting each middleware before starting
/// the next and shallow-merging its fragment into the running data.
///
/// The first failure aborts the fold; no partial data escapes.
pub(crate) async fn run_chain(
    chain: &[BoxedMiddleware],
    parts: &RequestParts,
) -> Result<ContextData, BoxError> {
    let mut data = ContextData::new();
    for (index, middleware) in chain.iter().enumerate() {
        let fragment = middleware(Arc::clone(parts), data.clone()).await?;
        tracing::trace!(index, keys = fragment.len(), "Merging middleware fragment");
        data.extend(fragment);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn parts() -> RequestParts {
        let (parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        Arc::new(parts)
    }

    #[test]
    fn test_into_fragment_accepts_objects_and_null() {
        assert_eq!(into_fragment(&json!({ "a": 1 })).unwrap()["a"], 1);
        assert!(into_fragment(&()).unwrap().is_empty());
        assert!(into_fragment(&json!(null)).unwrap().is_empty());
    }

    #[test]
    fn test_into_fragment_rejects_scalars() {
        let err = into_fragment(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
        assert!(into_fragment(&42).is_err());
    }

    #[tokio::test]
    async fn test_run_chain_merges_left_to_right() {
        let chain = vec![
            boxed(|_, _| async { Ok::<_, BoxError>(json!({ "x": 1 })) }),
            boxed(|_, _| async { Ok::<_, BoxError>(json!({ "x": 2, "y": 3 })) }),
        ];
        let data = run_chain(&chain, &parts()).await.unwrap();
        assert_eq!(serde_json::Value::Object(data), json!({ "x": 2, "y": 3 }));
    }

    #[tokio::test]
    async fn test_run_chain_passes_prior_context_only() {
        let chain = vec![
            boxed(|_, data: ContextData| async move {
                assert!(data.is_empty());
                Ok::<_, BoxError>(json!({ "first": true }))
            }),
            boxed(|_, data: ContextData| async move {
                assert_eq!(data.get("first"), Some(&json!(true)));
                assert!(data.get("third").is_none());
                Ok::<_, BoxError>(json!({ "second": true }))
            }),
            boxed(|_, data: ContextData| async move {
                assert_eq!(data.len(), 2);
                Ok::<_, BoxError>(json!({ "third": true }))
            }),
        ];
        let data = run_chain(&chain, &parts()).await.unwrap();
        assert_eq!(data.len(), 3);
    }

    #[tokio::test]
    async fn test_run_chain_aborts_on_first_failure() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reached);
        let chain = vec![
            boxed(|_, _| async { Err::<serde_json::Value, _>("denied") }),
            boxed(move |_, _| {
                flag.store(true, Ordering::SeqCst);
                async { Ok::<_, BoxError>(json!({})) }
            }),
        ];
        let err = run_chain(&chain, &parts()).await.unwrap_err();
        assert_eq!(err.to_string(), "denied");
        assert!(!reached.load(Ordering::SeqCst));
    }
}
