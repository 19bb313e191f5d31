//! Object store client with read retry and parallel block upload

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use metrics::{counter, histogram};
use object_store::path::Path;
use object_store::{ObjectStore, ObjectStoreExt, WriteMultipart};
use tracing::{debug, error, info, warn};

use super::context::RequestContext;
use super::service::BlobStore;
use super::types::{StorageError, StorageOptions};

/// Resolves a container name to a store scoped to that container
pub trait ContainerProvider: Send + Sync {
    fn container(&self, name: &str) -> Result<Arc<dyn ObjectStore>, StorageError>;
}

/// Blob client on top of any `object_store` backend
pub struct ObjectStoreClient<P> {
    containers: P,
    options: StorageOptions,
}

impl<P: ContainerProvider> ObjectStoreClient<P> {
    pub fn new(containers: P, options: StorageOptions) -> Self {
        Self {
            containers,
            options,
        }
    }

    pub fn containers(&self) -> &P {
        &self.containers
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    async fn read_once(
        store: &Arc<dyn ObjectStore>,
        location: &Path,
    ) -> Result<Bytes, StorageError> {
        let result = store.get(location).await.map_err(read_error)?;
        result.bytes().await.map_err(read_error)
    }

    async fn abort(writer: WriteMultipart, location: &Path) {
        if let Err(e) = writer.abort().await {
            warn!(key = %location, error = %e, "Failed to abort block upload");
        }
    }
}

#[async_trait]
impl<P: ContainerProvider> BlobStore for ObjectStoreClient<P> {
    async fn download(
        &self,
        container: &str,
        path: &str,
        ctx: &RequestContext,
    ) -> Result<Bytes, StorageError> {
        let store = self.containers.container(container)?;
        let location = Path::from(path);
        let start = Instant::now();

        let read = retry_read(&self.options, |attempt| {
            debug!(container, key = %location, attempt, "Reading blob");
            Self::read_once(&store, &location)
        });
        let result = ctx.guard(read).await.and_then(|inner| inner);

        histogram!("imagehalf_storage_duration_seconds", "op" => "download")
            .record(start.elapsed());

        match &result {
            Ok(bytes) => info!(
                container,
                key = %location,
                size_bytes = bytes.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Blob download successful"
            ),
            Err(e) => error!(
                container,
                key = %location,
                error = %e,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Blob download failed"
            ),
        }

        result
    }

    async fn upload(
        &self,
        container: &str,
        path: &str,
        data: Bytes,
        ctx: &RequestContext,
    ) -> Result<(), StorageError> {
        let store = self.containers.container(container)?;
        let location = Path::from(path);
        let block_size = self.options.block_size.max(1);
        let parallelism = self.options.parallelism.max(1);
        let start = Instant::now();

        let upload = ctx
            .guard(store.put_multipart(&location))
            .await?
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        let mut writer = WriteMultipart::new_with_chunk_size(upload, block_size);

        let transfer = async {
            for block in data.chunks(block_size) {
                writer.wait_for_capacity(parallelism).await?;
                writer.write(block);
            }
            // Every block is committed here, so `finish` only completes the upload
            writer.wait_for_capacity(0).await?;
            Ok::<(), object_store::Error>(())
        };

        let transferred = ctx.guard(transfer).await;
        match transferred {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                Self::abort(writer, &location).await;
                error!(container, key = %location, error = %e, "Blob upload failed");
                return Err(StorageError::UploadFailed(e.to_string()));
            }
            Err(interrupted) => {
                Self::abort(writer, &location).await;
                warn!(container, key = %location, reason = %interrupted, "Blob upload interrupted");
                return Err(interrupted);
            }
        }

        // An interrupted `finish` drops the writer, which aborts its pending parts
        ctx.guard(writer.finish())
            .await?
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        histogram!("imagehalf_storage_duration_seconds", "op" => "upload").record(start.elapsed());
        info!(
            container,
            key = %location,
            size_bytes = data.len(),
            blocks = data.len().div_ceil(block_size),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Blob upload successful"
        );

        Ok(())
    }
}

/// Run `read` until it succeeds, fails permanently, or the attempt budget
/// in `options` is spent
pub(crate) async fn retry_read<T, F, Fut>(options: &StorageOptions, mut read: F) -> Result<T, StorageError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    let max_attempts = options.max_read_attempts.max(1);
    let mut attempt = 1;

    loop {
        match read(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                counter!("imagehalf_storage_retries_total").increment(1);
                warn!(attempt, max_attempts, error = %e, "Blob read failed, retrying");
                tokio::time::sleep(options.read_retry_backoff * attempt as u32).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn read_error(e: object_store::Error) -> StorageError {
    match e {
        object_store::Error::NotFound { path, .. } => StorageError::NotFound(path),
        other => StorageError::DownloadFailed(other.to_string()),
    }
}
