//! Request body extraction.
//!
//! Clients send issue fields either as a JSON object or as an urlencoded
//! form. Both are flattened into [`FormFields`] so the handlers never see
//! the wire format.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::Value;
use trackr::input::FormFields;

/// Flat request fields, parsed from a JSON or urlencoded body.
#[derive(Debug, Clone, Default)]
pub struct RequestFields(pub FormFields);

impl<S> FromRequest<S> for RequestFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;

        let fields = if is_json {
            parse_json(&bytes)?
        } else {
            parse_form(&bytes)?
        };
        Ok(Self(fields))
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Parse a JSON object body. Scalars are stringified, `null` counts as
/// absent, nested values are skipped.
pub fn parse_json(bytes: &[u8]) -> Result<FormFields, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(FormFields::new());
    }

    let object: serde_json::Map<String, Value> =
        serde_json::from_slice(bytes).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let mut fields = FormFields::new();
    for (key, value) in object {
        match value {
            Value::Null => {}
            Value::String(s) => fields.insert(key, s),
            Value::Bool(b) => fields.insert(key, b.to_string()),
            Value::Number(n) => fields.insert(key, n.to_string()),
            Value::Array(_) | Value::Object(_) => {
                tracing::debug!(field = %key, "Ignoring non-scalar body field");
            }
        }
    }
    Ok(fields)
}

/// Parse an `application/x-www-form-urlencoded` body.
pub fn parse_form(bytes: &[u8]) -> Result<FormFields, ApiError> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_bytes(bytes).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    Ok(pairs.into_iter().collect())
}
