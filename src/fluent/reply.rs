//! Normalization of handler results into responses.

use crate::{BoxError, ContextData};

use {
    axum::{
        Json,
        http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
        response::{IntoResponse, Response},
    },
    serde::Serialize,
    serde_json::Value,
};

/// Converts a handler result into the final response.
///
/// A [`Response`] is returned verbatim, status and headers included. Plain
/// values are serialized to JSON and sent as `200 OK` with
/// `Content-Type: application/json`.
pub trait IntoReply {
    fn into_reply(self) -> Result<Response, BoxError>;
}

impl IntoReply for Response {
    fn into_reply(self) -> Result<Response, BoxError> {
        Ok(self)
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Response, BoxError> {
        json_reply(&self)
    }
}

impl IntoReply for ContextData {
    fn into_reply(self) -> Result<Response, BoxError> {
        json_reply(&self)
    }
}

impl<T> IntoReply for Json<T>
where
    T: Serialize,
{
    fn into_reply(self) -> Result<Response, BoxError> {
        json_reply(&self.0)
    }
}

/// Serializes `value` as a `200` JSON response. Serialization failures are
/// returned instead of being turned into a response.
pub(crate) fn json_reply<T>(value: &T) -> Result<Response, BoxError>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(value)?;
    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    )
        .into_response())
}
