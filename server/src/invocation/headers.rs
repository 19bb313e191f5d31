use axum::http::HeaderMap;
use uuid::Uuid;

/// Header the host sets on every invocation
pub const INVOCATION_ID_HEADER: &str = "x-azure-functions-invocationid";

/// Host-assigned invocation id, or a fresh one when the header is absent
pub fn invocation_id(headers: &HeaderMap) -> String {
    headers
        .get(INVOCATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
