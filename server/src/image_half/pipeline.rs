//! Image-half orchestration
//!
//! One invocation walks
//! `Idle → ParsedPayload → Downloaded → Decoded → Resampled → Encoded →
//! Uploaded → Responded`, or drops to `Failed` on the first error. CPU-bound
//! stages run on the blocking pool.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::{ACCESS_KEY_VAR, ACCOUNT_VAR, ImageHalfConfig};
use crate::invocation::{self, InvokeResponse};
use crate::storage::{BlobStore, RequestContext};

use super::codec;
use super::resample::{self, HALF};
use super::types::{ImageHalfError, ImageLocation};

/// Pipeline position of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ParsedPayload,
    Downloaded,
    Decoded,
    Resampled,
    Encoded,
    Uploaded,
    Responded,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::ParsedPayload => "parsed_payload",
            Stage::Downloaded => "downloaded",
            Stage::Decoded => "decoded",
            Stage::Resampled => "resampled",
            Stage::Encoded => "encoded",
            Stage::Uploaded => "uploaded",
            Stage::Responded => "responded",
            Stage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Responded | Stage::Failed)
    }
}

/// Tracks the current stage and times each transition
struct Progress<'a> {
    invocation_id: &'a str,
    stage: Stage,
    since: Instant,
}

impl<'a> Progress<'a> {
    fn start(invocation_id: &'a str) -> Self {
        Self {
            invocation_id,
            stage: Stage::Idle,
            since: Instant::now(),
        }
    }

    fn advance(&mut self, next: Stage) {
        histogram!("imagehalf_phase_duration_seconds", "phase" => next.as_str())
            .record(self.since.elapsed());
        debug!(
            invocation_id = self.invocation_id,
            from = self.stage.as_str(),
            to = next.as_str(),
            elapsed_ms = self.since.elapsed().as_secs_f64() * 1000.0,
            "Pipeline transition"
        );
        self.stage = next;
        self.since = Instant::now();
    }

    fn fail(&mut self, e: &ImageHalfError) {
        counter!("imagehalf_errors_total", "kind" => e.kind()).increment(1);
        if e.status_code().is_client_error() {
            warn!(
                invocation_id = self.invocation_id,
                stage = self.stage.as_str(),
                error = %e,
                "Rejected image-half invocation"
            );
        } else {
            error!(
                invocation_id = self.invocation_id,
                stage = self.stage.as_str(),
                kind = e.kind(),
                error = %e,
                "Image-half invocation failed"
            );
        }
        self.stage = Stage::Failed;
    }
}

/// Halves `image.jpg` into `image-half.jpg` for each invocation
pub struct ImageHalfService {
    store: Option<Arc<dyn BlobStore>>,
    config: ImageHalfConfig,
}

impl ImageHalfService {
    /// `store` is `None` when storage credentials were not configured; every
    /// invocation then fails before touching the network.
    pub fn new(store: Option<Arc<dyn BlobStore>>, config: ImageHalfConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ImageHalfConfig {
        &self.config
    }

    pub fn has_storage(&self) -> bool {
        self.store.is_some()
    }

    /// Run one invocation from raw request body to host response
    pub async fn run(
        &self,
        body: &[u8],
        ctx: &RequestContext,
    ) -> Result<InvokeResponse, ImageHalfError> {
        counter!("imagehalf_requests_total").increment(1);
        let mut progress = Progress::start(ctx.invocation_id());

        let outcome = self.execute(body, ctx, &mut progress).await;
        match &outcome {
            Ok(_) => progress.advance(Stage::Responded),
            Err(e) => progress.fail(e),
        }
        debug_assert!(progress.stage.is_terminal());

        outcome
    }

    async fn execute(
        &self,
        body: &[u8],
        ctx: &RequestContext,
        progress: &mut Progress<'_>,
    ) -> Result<InvokeResponse, ImageHalfError> {
        let location: ImageLocation = invocation::unwrap_payload(body)?;
        location.validate()?;
        info!(
            invocation_id = ctx.invocation_id(),
            container = %location.container,
            directory = %location.directory,
            "Halving image"
        );
        progress.advance(Stage::ParsedPayload);

        let store = self.store.as_ref().ok_or_else(|| {
            ImageHalfError::Config(format!(
                "Either the {} or {} environment variable is not set",
                ACCOUNT_VAR, ACCESS_KEY_VAR
            ))
        })?;

        let source = store
            .download(&location.container, &location.source_path(), ctx)
            .await?;
        progress.advance(Stage::Downloaded);

        let decoded = blocking(move || codec::decode(&source)).await?;
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "Decoded source image"
        );
        progress.advance(Stage::Decoded);

        let halved = blocking(move || resample::scale(&decoded, HALF)).await?;
        progress.advance(Stage::Resampled);

        let quality = self.config.jpeg_quality;
        let encoded = blocking(move || codec::encode(&halved, quality)).await?;
        progress.advance(Stage::Encoded);

        let half_path = location.half_path();
        store
            .upload(&location.container, &half_path, Bytes::from(encoded), ctx)
            .await?;
        progress.advance(Stage::Uploaded);

        let mut response = InvokeResponse::success();
        if let Some(binding) = &self.config.output_binding {
            response = response.with_output(
                binding.clone(),
                Value::from(format!("{}/{}", location.container, half_path)),
            );
        }

        Ok(response)
    }
}

async fn blocking<T, F>(work: F) -> Result<T, ImageHalfError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ImageHalfError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ImageHalfError::Internal(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryContainers, ObjectStoreClient, StorageError};
    use crate::test_utils::{envelope_for, memory_client, test_jpeg};
    use std::time::Duration;

    fn context() -> RequestContext {
        RequestContext::new("pipeline-test", Duration::from_secs(30))
    }

    fn service_with(
        client: &Arc<ObjectStoreClient<MemoryContainers>>,
        config: ImageHalfConfig,
    ) -> ImageHalfService {
        let store: Arc<dyn BlobStore> = client.clone();
        ImageHalfService::new(Some(store), config)
    }

    #[tokio::test]
    async fn test_halves_source_image() {
        let client = memory_client();
        client
            .containers()
            .insert("c", "d/image.jpg", test_jpeg(200, 100))
            .await
            .unwrap();
        let service = service_with(&client, ImageHalfConfig::default());

        let response = service
            .run(&envelope_for(&ImageLocation::new("c", "d")), &context())
            .await
            .unwrap();

        assert_eq!(response, InvokeResponse::success());
        let half = client.containers().object("c", "d/image-half.jpg").await.unwrap();
        let decoded = codec::decode(&half).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));

        // Source untouched
        let source = client.containers().object("c", "d/image.jpg").await.unwrap();
        assert_eq!(codec::decode(&source).unwrap().dimensions(), (200, 100));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_storage() {
        let service = ImageHalfService::new(None, ImageHalfConfig::default());

        let err = service
            .run(&envelope_for(&ImageLocation::new("c", "d")), &context())
            .await
            .unwrap_err();

        assert!(matches!(err, ImageHalfError::Config(_)));
        assert!(err.to_string().contains(ACCOUNT_VAR));
    }

    #[tokio::test]
    async fn test_bad_payload_is_rejected_before_storage() {
        let client = memory_client();
        let service = service_with(&client, ImageHalfConfig::default());

        let err = service.run(b"{\"Data\":", &context()).await.unwrap_err();

        assert!(matches!(err, ImageHalfError::BadRequest(_)));
        assert_eq!(client.containers().lookups(), 0);
    }

    #[tokio::test]
    async fn test_missing_source_is_upstream_error() {
        let client = memory_client();
        let service = service_with(&client, ImageHalfConfig::default());

        let err = service
            .run(&envelope_for(&ImageLocation::new("c", "empty")), &context())
            .await
            .unwrap_err();

        assert!(matches!(err, ImageHalfError::Upstream(StorageError::NotFound(_))));
        assert!(client.containers().object("c", "empty/image-half.jpg").await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_source_is_decode_error() {
        let client = memory_client();
        client
            .containers()
            .insert("c", "d/image.jpg", b"GIF89a not a jpeg".to_vec())
            .await
            .unwrap();
        let service = service_with(&client, ImageHalfConfig::default());

        let err = service
            .run(&envelope_for(&ImageLocation::new("c", "d")), &context())
            .await
            .unwrap_err();

        assert!(matches!(err, ImageHalfError::Decode(_)));
    }

    #[tokio::test]
    async fn test_output_binding_is_populated_when_configured() {
        let client = memory_client();
        client
            .containers()
            .insert("c", "d/image.jpg", test_jpeg(40, 30))
            .await
            .unwrap();
        let config = ImageHalfConfig {
            output_binding: Some("halfImage".to_string()),
            ..Default::default()
        };
        let service = service_with(&client, config);

        let response = service
            .run(&envelope_for(&ImageLocation::new("c", "d")), &context())
            .await
            .unwrap();

        assert_eq!(response.logs, vec!["success".to_string()]);
        assert_eq!(response.outputs["halfImage"], "c/d/image-half.jpg");
    }

    #[tokio::test]
    async fn test_cancelled_invocation_uploads_nothing() {
        let client = memory_client();
        client
            .containers()
            .insert("c", "d/image.jpg", test_jpeg(40, 30))
            .await
            .unwrap();
        let service = service_with(&client, ImageHalfConfig::default());
        let ctx = context();
        ctx.cancel();

        let err = service
            .run(&envelope_for(&ImageLocation::new("c", "d")), &ctx)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "cancelled");
        assert!(client.containers().object("c", "d/image-half.jpg").await.is_none());
    }

    #[test]
    fn test_terminal_stages() {
        assert!(Stage::Responded.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(!Stage::Encoded.is_terminal());
    }
}
