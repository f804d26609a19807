//! Raw extraction of the three request slots before validation.

use crate::{BodyError, ParamMap};

use {
    axum::body::{Body, Bytes},
    http::{HeaderMap, Method, Uri, header::CONTENT_TYPE},
    serde_json::{Value, json},
    std::convert::Infallible,
    url::form_urlencoded,
};

/// How a request body is decoded, chosen from its `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyKind {
    /// No body is read at all.
    Skip,
    Multipart,
    UrlEncoded,
    Json,
}

impl BodyKind {
    /// `GET` and `DELETE` never have their body read. Every other method is
    /// decoded according to its media type, defaulting to JSON.
    pub(crate) fn detect(method: &Method, headers: &HeaderMap) -> Self {
        if method == Method::GET || method == Method::DELETE {
            return BodyKind::Skip;
        }

        match media_type(headers).as_deref() {
            Some("multipart/form-data") => BodyKind::Multipart,
            Some("application/x-www-form-urlencoded") => BodyKind::UrlEncoded,
            _ => BodyKind::Json,
        }
    }
}

/// Lowercased media type without parameters.
fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next().unwrap_or_default().trim();
    Some(essence.to_ascii_lowercase())
}

/// Parses the query string into a flat mapping. Repeated keys keep their
/// last occurrence.
pub(crate) fn query_map(uri: &Uri) -> ParamMap {
    uri.query()
        .map(|query| pairs_to_map(query.as_bytes()))
        .unwrap_or_default()
}

fn pairs_to_map(input: &[u8]) -> ParamMap {
    form_urlencoded::parse(input)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

/// Reads and decodes the body. Skipped bodies are `null`.
pub(crate) async fn body_value(
    kind: BodyKind,
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<Value, BodyError> {
    if kind == BodyKind::Skip {
        return Ok(Value::Null);
    }

    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(BodyError::Read)?;

    match kind {
        BodyKind::Skip => Ok(Value::Null),
        BodyKind::UrlEncoded => Ok(Value::Object(pairs_to_map(&bytes))),
        BodyKind::Multipart => multipart_map(headers, bytes).await.map(Value::Object),
        BodyKind::Json => Ok(serde_json::from_slice(&bytes)?),
    }
}

/// Flattens a multipart body. Text fields become strings, file fields a
/// descriptor with their name, media type and size.
async fn multipart_map(headers: &HeaderMap, bytes: Bytes) -> Result<ParamMap, BodyError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let boundary = multer::parse_boundary(content_type)?;

    let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(bytes) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut map = ParamMap::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        let value = match field.file_name().map(str::to_owned) {
            Some(filename) => {
                let content_type = field.content_type().map(ToString::to_string);
                let data = field.bytes().await?;
                json!({
                    "filename": filename,
                    "content_type": content_type,
                    "size": data.len(),
                })
            }
            None => Value::String(field.text().await?),
        };
        map.insert(name, value);
    }
    Ok(map)
}
