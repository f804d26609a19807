//! Construction-time options shared by every route built from a builder.

use crate::{BoxError, Config, ServerErrorHandler};

use {
    axum::response::Response,
    std::{fmt, sync::Arc},
};

/// Default upper bound on request bodies read by the pipeline (1 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE_BYTES: usize = 1024 * 1024;

/// Options captured by [`RouteBuilder`](crate::RouteBuilder) and carried
/// into every [`ExecutableRoute`](crate::ExecutableRoute) it produces.
///
/// `handle_server_error` is the only behavioural option: without it,
/// unclassified failures become a generic `500`.
///
/// ```rust
/// use axum_conduit::RouteOptions;
/// use axum::{http::StatusCode, response::IntoResponse};
///
/// let options = RouteOptions::new()
///     .handle_server_error(|err| (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response());
/// # let _ = options;
/// ```
#[derive(Clone)]
pub struct RouteOptions {
    pub(crate) handle_server_error: Option<ServerErrorHandler>,
    pub(crate) max_payload_size_bytes: usize,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self {
            handle_server_error: None,
            max_payload_size_bytes: DEFAULT_MAX_PAYLOAD_SIZE_BYTES,
        }
    }

    /// Derives options from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new().with_max_payload_size_bytes(config.pipeline.max_payload_size_bytes.as_u64() as usize)
    }

    /// Installs a custom mapping for unclassified failures. Validation
    /// failures never reach it.
    #[must_use]
    pub fn handle_server_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(BoxError) -> Response + Send + Sync + 'static,
    {
        self.handle_server_error = Some(Arc::new(handler));
        self
    }

    /// Sets the maximum number of body bytes read before extraction fails.
    #[must_use]
    pub fn with_max_payload_size_bytes(mut self, limit: usize) -> Self {
        self.max_payload_size_bytes = limit;
        self
    }

    pub fn max_payload_size_bytes(&self) -> usize {
        self.max_payload_size_bytes
    }

    pub fn has_server_error_handler(&self) -> bool {
        self.handle_server_error.is_some()
    }
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("handle_server_error", &self.handle_server_error.is_some())
            .field("max_payload_size_bytes", &self.max_payload_size_bytes)
            .finish()
    }
}
