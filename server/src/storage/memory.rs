//! In-process containers backed by `object_store::memory::InMemory`

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload};

use super::client::ContainerProvider;
use super::types::StorageError;

/// Containers that live in process memory, created on first use
#[derive(Debug, Default)]
pub struct MemoryContainers {
    stores: DashMap<String, Arc<InMemory>>,
    lookups: AtomicUsize,
}

impl MemoryContainers {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, container: &str) -> Arc<InMemory> {
        self.stores
            .entry(container.to_string())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone()
    }

    /// Number of times a client resolved a container
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Seed a blob directly, bypassing the client
    pub async fn insert(
        &self,
        container: &str,
        path: &str,
        data: impl Into<Bytes>,
    ) -> Result<(), StorageError> {
        self.store(container)
            .put(&Path::from(path), PutPayload::from(data.into()))
            .await
            .map(|_| ())
            .map_err(|e| StorageError::UploadFailed(e.to_string()))
    }

    /// Read a blob directly, `None` when it does not exist
    pub async fn object(&self, container: &str, path: &str) -> Option<Bytes> {
        let store = self.stores.get(container)?.clone();
        let result = store.get(&Path::from(path)).await.ok()?;
        result.bytes().await.ok()
    }
}

impl ContainerProvider for MemoryContainers {
    fn container(&self, name: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let store: Arc<dyn ObjectStore> = self.store(name);
        Ok(store)
    }
}
