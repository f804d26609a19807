//! Error types and handling for route pipelines.
//!
//! Two families of errors live here:
//!
//! - [`Error`] / [`ErrorKind`]: setup-time failures (loading configuration,
//!   reading files). These never reach an HTTP client.
//! - [`PipelineError`]: request-time failures raised while an
//!   [`ExecutableRoute`](crate::ExecutableRoute) runs. They are mapped to a
//!   response at a single boundary.
//!
//! # Request-time taxonomy
//!
//! | Variant | Raised by | Response |
//! |---------|-----------|----------|
//! | [`PipelineError::Validation`] | a slot schema rejecting its value | always `400` with `{ "message": "Invalid <slot>", "errors": [...] }` |
//! | [`PipelineError::Unclassified`] | body extraction, middleware, the handler | custom `handle_server_error`, else `500` with `{ "message": "Internal server error" }` |
//!
//! # Example
//!
//! ```rust
//! use axum_conduit::{PipelineError, Slot, Issue};
//! use axum::{http::StatusCode, response::IntoResponse};
//!
//! let err = PipelineError::validation(Slot::Query, vec![Issue::new("too_small", "page must be >= 1")]);
//! assert_eq!(err.to_string(), "Invalid query");
//! assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
//! ```

use crate::schema::Issue;

use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde::Serialize,
    std::{fmt, sync::Arc},
    thiserror::Error,
};

/// Boxed error type accepted from middleware, handlers and pending params.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Custom mapping from an unclassified failure to a response.
pub type ServerErrorHandler = Arc<dyn Fn(BoxError) -> Response + Send + Sync>;

/// Message returned by the default unclassified-failure mapping.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// The kind of setup-time error that occurred.
///
/// This enum is marked `#[non_exhaustive]`; always include a wildcard arm
/// when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Configuration error (invalid TOML, missing values).
    #[error("configuration error")]
    Configuration,

    /// I/O error (reading configuration files).
    #[error("I/O error")]
    Io,

    /// Internal/unexpected error.
    #[error("internal error")]
    Internal,
}

/// A setup-time error from the axum-conduit library.
///
/// Opaque wrapper around an underlying source. Use [`Error::kind()`] to
/// match on the category.
///
/// ```rust
/// use axum_conduit::{Error, ErrorKind};
///
/// let err = Error::config("max_payload_size_bytes must be greater than zero");
/// assert_eq!(err.kind(), ErrorKind::Configuration);
/// ```
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

impl Error {
    /// Creates a new error with the given kind and source.
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            kind,
            source: error.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg.into())
    }

    /// Creates an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg.into())
    }

    /// Consumes the error and returns the inner error source.
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

// ============================================================================
// Request-time errors
// ============================================================================

/// One of the three validated request facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Params,
    Query,
    Body,
}

impl Slot {
    /// Lowercase name used in the `Invalid <slot>` message.
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Params => "params",
            Slot::Query => "query",
            Slot::Body => "body",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure while reading or decoding the request body.
///
/// Body failures are never validation failures: they always travel as
/// [`PipelineError::Unclassified`].
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("failed to read request body: {0}")]
    Read(#[source] axum::Error),

    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] multer::Error),
}

/// Request-time failure of an [`ExecutableRoute`](crate::ExecutableRoute).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A slot schema rejected its value.
    #[error("Invalid {slot}")]
    Validation { slot: Slot, issues: Vec<Issue> },

    /// Anything else: body extraction, middleware or handler failures.
    #[error(transparent)]
    Unclassified(BoxError),
}

impl PipelineError {
    pub fn validation(slot: Slot, issues: Vec<Issue>) -> Self {
        Self::Validation { slot, issues }
    }

    pub fn unclassified<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Unclassified(error.into())
    }

    /// Returns `true` for schema rejections.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Maps the error to a response, routing unclassified failures through
    /// `handler` when one is configured. Validation failures never reach it.
    pub fn into_response_with(self, handler: Option<&ServerErrorHandler>) -> Response {
        match (self, handler) {
            (Self::Unclassified(cause), Some(handler)) => {
                tracing::debug!(error = %cause, "Delegating to custom server error handler");
                handler(cause)
            }
            (err, _) => err.into_response(),
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation { slot, issues } => {
                tracing::warn!(
                    slot = %slot,
                    issue_count = issues.len(),
                    "Request validation failed"
                );
                let body = ErrorResponse::new(format!("Invalid {slot}")).with_errors(issues);
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::Unclassified(cause) => {
                tracing::error!(
                    error = %cause,
                    status = %StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    "Unhandled error in route pipeline"
                );
                let body = ErrorResponse::new(INTERNAL_SERVER_ERROR_MESSAGE);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

// ============================================================================
// ErrorResponse
// ============================================================================

/// JSON body of pipeline error responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub message: String,
    /// Structured schema issues, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Issue>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<Issue>) -> Self {
        self.errors = Some(errors);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
