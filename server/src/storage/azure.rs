//! Azure Blob Storage containers

use std::sync::Arc;

use dashmap::DashMap;
use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
use object_store::{ObjectStore, RetryConfig};
use tracing::info;

use super::client::{ContainerProvider, ObjectStoreClient};
use super::types::{StorageCredentials, StorageEndpoint, StorageError, StorageOptions};

/// HTTP-level retries for a single blob request
const REQUEST_RETRIES: usize = 3;

/// Builds one `MicrosoftAzure` store per container and keeps it for the
/// life of the process
pub struct AzureContainers {
    credentials: StorageCredentials,
    endpoint: StorageEndpoint,
    stores: DashMap<String, Arc<dyn ObjectStore>>,
}

impl AzureContainers {
    pub fn new(credentials: StorageCredentials, endpoint: StorageEndpoint) -> Self {
        info!(
            account = %credentials.account,
            endpoint = %endpoint,
            "Configured Azure blob storage"
        );
        Self {
            credentials,
            endpoint,
            stores: DashMap::new(),
        }
    }

    pub fn endpoint(&self) -> &StorageEndpoint {
        &self.endpoint
    }

    fn build(&self, container: &str) -> Result<MicrosoftAzure, StorageError> {
        let retry = RetryConfig {
            max_retries: REQUEST_RETRIES,
            ..Default::default()
        };

        let builder = MicrosoftAzureBuilder::new()
            .with_account(&self.credentials.account)
            .with_access_key(&self.credentials.access_key)
            .with_container_name(container)
            .with_retry(retry);

        let builder = match &self.endpoint {
            StorageEndpoint::Emulator => builder.with_use_emulator(true),
            StorageEndpoint::Production => builder,
            StorageEndpoint::Custom(url) => builder
                .with_endpoint(url.clone())
                .with_allow_http(url.starts_with("http://")),
        };

        builder
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))
    }
}

impl ContainerProvider for AzureContainers {
    fn container(&self, name: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let store = self
            .stores
            .entry(name.to_string())
            .or_try_insert_with(|| {
                let store: Arc<dyn ObjectStore> = Arc::new(self.build(name)?);
                Ok::<_, StorageError>(store)
            })?;
        Ok(store.clone())
    }
}

/// Blob client for an Azure storage account
pub type AzureBlobClient = ObjectStoreClient<AzureContainers>;

impl AzureBlobClient {
    pub fn azure(
        credentials: StorageCredentials,
        endpoint: StorageEndpoint,
        options: StorageOptions,
    ) -> Self {
        Self::new(AzureContainers::new(credentials, endpoint), options)
    }
}
