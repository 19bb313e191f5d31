use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::image_half::{ImageHalfAppState, image_half_routes};
use crate::triggers::trigger_routes;

use super::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage = if state.image_half.has_storage() {
        "configured"
    } else {
        "missing_credentials"
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage,
    })
}

/// Endpoint to expose metrics in Prometheus format
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match state.prometheus {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let image_half_state = ImageHalfAppState {
        service: state.image_half.clone(),
    };

    Router::new()
        .route("/health", get(health))
        .route("/metrics/prometheus", get(prometheus_metrics))
        .with_state(state)
        .merge(image_half_routes(image_half_state))
        .merge(trigger_routes())
        .layer(TraceLayer::new_for_http())
}
