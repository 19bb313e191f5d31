//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use image::{Rgb, RgbImage};
use imagehalf_server::config::ImageHalfConfig;
use imagehalf_server::image_half::codec;
use imagehalf_server::storage::{BlobStore, StorageOptions};
use imagehalf_server::{
    AppState, ImageHalfService, ImageLocation, InvokeRequest, MemoryContainers, ObjectStoreClient,
    build_router,
};
use std::sync::Arc;
use std::time::Duration;

/// Blob client type backing the stub store
pub type StubClient = ObjectStoreClient<MemoryContainers>;

/// Create a test application backed by an in-memory blob store
pub fn create_test_app_with_store() -> (Router, Arc<StubClient>) {
    create_test_app_with_config(ImageHalfConfig::default())
}

/// Same as `create_test_app_with_store` with custom pipeline settings
pub fn create_test_app_with_config(config: ImageHalfConfig) -> (Router, Arc<StubClient>) {
    let options = StorageOptions {
        read_retry_backoff: Duration::ZERO,
        ..Default::default()
    };
    let client = Arc::new(ObjectStoreClient::new(MemoryContainers::new(), options));
    let store: Arc<dyn BlobStore> = client.clone();
    let state = AppState::new(ImageHalfService::new(Some(store), config));

    (build_router(state), client)
}

/// Create a test application whose storage credentials were never provided
pub fn create_test_app_without_credentials() -> Router {
    build_router(AppState::new(ImageHalfService::new(
        None,
        ImageHalfConfig::default(),
    )))
}

/// Encode a patterned JPEG of the given size
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    });
    codec::encode(&img, 90).unwrap()
}

/// Request body wrapping `location` in the host's double-encoded envelope
pub fn envelope_body(location: &ImageLocation) -> Body {
    let request = InvokeRequest::with_value(location).unwrap();
    Body::from(serde_json::to_vec(&request).unwrap())
}

/// POST /ImageHalf request for `location`
pub fn image_half_request(location: &ImageLocation) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ImageHalf")
        .header("Content-Type", "application/json")
        .header("X-Azure-Functions-InvocationId", "integration-test")
        .body(envelope_body(location))
        .unwrap()
}

/// Collect a response body as bytes
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Initialize test logging for detailed output
#[allow(dead_code)]
pub fn init_test_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagehalf_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
