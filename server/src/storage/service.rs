//! BlobStore trait definition

use async_trait::async_trait;
use bytes::Bytes;

use super::context::RequestContext;
use super::types::StorageError;

/// Trait for blob stores addressed by container and path
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the full content of a blob
    async fn download(
        &self,
        container: &str,
        path: &str,
        ctx: &RequestContext,
    ) -> Result<Bytes, StorageError>;

    /// Create or overwrite a blob
    async fn upload(
        &self,
        container: &str,
        path: &str,
        data: Bytes,
        ctx: &RequestContext,
    ) -> Result<(), StorageError>;
}
