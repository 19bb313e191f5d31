//! HTTP route handler for the image-half invocation

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use std::sync::Arc;

use crate::invocation::invocation_id;
use crate::storage::RequestContext;

use super::pipeline::ImageHalfService;

/// Application state containing the image-half service
#[derive(Clone)]
pub struct ImageHalfAppState {
    pub service: Arc<ImageHalfService>,
}

/// POST /ImageHalf - Halve `<Container>/<Directory>/image.jpg`
///
/// The storage deadline starts when the request arrives. If the host drops
/// the connection, the handler future is dropped and the guard cancels any
/// transfer still in flight.
pub async fn image_half(
    State(state): State<ImageHalfAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = RequestContext::new(
        invocation_id(&headers),
        state.service.config().request_timeout,
    );
    let _cancel_on_drop = ctx.cancellation_token().clone().drop_guard();

    match state.service.run(&body, &ctx).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Build image-half routes
pub fn image_half_routes(state: ImageHalfAppState) -> Router {
    Router::new()
        .route("/ImageHalf", post(image_half))
        .with_state(state)
}
