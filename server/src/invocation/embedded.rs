//! Embedded-document decoding
//!
//! The host delivers binding payloads as JSON text that has itself been
//! quoted into a JSON string, so `Data.value` looks like
//! `"\"{\\\"Container\\\":\\\"c\\\"}\""` on the wire. After the envelope is
//! parsed, the string is unquoted once and the result parsed again into the
//! route's payload type.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{InvocationError, InvokeRequest};

/// Data entry carrying the trigger payload
pub const VALUE_KEY: &str = "value";

/// Decode a document carried as a quoted JSON string
///
/// Stage one removes exactly one layer of string quoting, stage two parses
/// the unquoted text as `T`.
pub fn decode_embedded<T: DeserializeOwned>(value: &Value) -> Result<T, InvocationError> {
    let Value::String(raw) = value else {
        return Err(InvocationError::NotAString {
            key: VALUE_KEY.to_string(),
            found: value_kind(value),
        });
    };

    let document: String =
        serde_json::from_str(raw).map_err(|e| InvocationError::Unquote(e.to_string()))?;

    serde_json::from_str(&document).map_err(|e| InvocationError::Payload(e.to_string()))
}

/// Inverse of [`decode_embedded`]: serialize, then quote into a string value
pub fn encode_embedded<T: Serialize>(payload: &T) -> Result<Value, serde_json::Error> {
    let document = serde_json::to_string(payload)?;
    Ok(Value::String(serde_json::to_string(&document)?))
}

/// Parse a request body and decode its `Data.value` entry as `T`
pub fn unwrap_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, InvocationError> {
    let request: InvokeRequest =
        serde_json::from_slice(body).map_err(|e| InvocationError::Envelope(e.to_string()))?;

    tracing::debug!(
        data_keys = ?request.data.keys().collect::<Vec<_>>(),
        "Unwrapping invocation payload"
    );

    let value = request
        .data
        .get(VALUE_KEY)
        .ok_or_else(|| InvocationError::MissingValue(VALUE_KEY.to_string()))?;

    decode_embedded(value)
}

impl InvokeRequest {
    /// Build an envelope whose `Data.value` embeds `payload`
    pub fn with_value<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        let mut request = Self::default();
        request
            .data
            .insert(VALUE_KEY.to_string(), encode_embedded(payload)?);
        Ok(request)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
