use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

use crate::config::{ACCESS_KEY_VAR, ACCOUNT_VAR, Config};
use crate::image_half::ImageHalfService;
use crate::storage::{AzureBlobClient, BlobStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub image_half: Arc<ImageHalfService>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(image_half: ImageHalfService) -> Self {
        Self {
            image_half: Arc::new(image_half),
            prometheus: None,
        }
    }

    /// Build state from configuration loaded at startup
    ///
    /// Missing storage credentials do not stop the server; the image route
    /// reports them per invocation instead.
    pub fn from_config(config: &Config) -> Self {
        let store: Option<Arc<dyn BlobStore>> = match &config.storage.credentials {
            Some(credentials) => {
                info!(
                    account = %credentials.account,
                    endpoint = %config.storage.endpoint,
                    "Blob storage configured"
                );
                Some(Arc::new(AzureBlobClient::azure(
                    credentials.clone(),
                    config.storage.endpoint.clone(),
                    config.storage.options.clone(),
                )))
            }
            None => {
                warn!(
                    "{} or {} is not set - /ImageHalf will fail until both are provided",
                    ACCOUNT_VAR, ACCESS_KEY_VAR
                );
                None
            }
        };

        Self::new(ImageHalfService::new(store, config.image_half.clone()))
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
