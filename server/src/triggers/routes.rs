//! HTTP route handlers for the diagnostic triggers

use std::collections::HashMap;

use axum::{
    Json, Router,
    body::Bytes,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::invocation::{self, InvokeResponse, invocation_id};

use super::types::User;

/// Fixed body returned by the echo trigger
pub const ECHO_BODY: &str = "SimpleHttpTrigger handler from Rust";

/// ANY /api/SimpleHttpTrigger - Log request details and answer with fixed text
pub async fn simple_http_trigger(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> &'static str {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    info!(
        date = %Utc::now().format("%Y-%m-%d"),
        user_agent,
        invocation_id = %invocation_id(&headers),
        "SimpleHttpTrigger invoked"
    );
    for (key, value) in &params {
        info!(key = %key, value = %value, "Query parameter");
    }

    ECHO_BODY
}

/// ANY /QueueTrigger - Decode the queued `User` and acknowledge
pub async fn queue_trigger(headers: HeaderMap, body: Bytes) -> Response {
    let invocation_id = invocation_id(&headers);

    match invocation::unwrap_payload::<User>(&body) {
        Ok(user) => {
            info!(
                invocation_id = %invocation_id,
                id = user.id,
                name = %user.name,
                "Queue message received"
            );
            (StatusCode::OK, Json(InvokeResponse::success())).into_response()
        }
        Err(e) => {
            warn!(invocation_id = %invocation_id, error = %e, "Rejected queue message");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Build trigger routes
pub fn trigger_routes() -> Router {
    Router::new()
        .route("/api/SimpleHttpTrigger", any(simple_http_trigger))
        .route("/QueueTrigger", any(queue_trigger))
}
