//! Server configuration
//!
//! Configuration is loaded once from environment variables at startup.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::image_half::DEFAULT_JPEG_QUALITY;
use crate::storage::{StorageCredentials, StorageEndpoint, StorageOptions};

/// Storage account name variable
pub const ACCOUNT_VAR: &str = "AZURE_STORAGE_ACCOUNT";
/// Storage account key variable
pub const ACCESS_KEY_VAR: &str = "AZURE_STORAGE_ACCESS_KEY";
/// Listen port assigned by the custom-handler host
pub const PORT_VAR: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";

/// Main server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,

    /// Blob storage configuration
    pub storage: StorageConfig,

    /// Image-half pipeline configuration
    pub image_half: ImageHalfConfig,
}

/// Blob storage configuration
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Account credentials; `None` when either value is missing
    pub credentials: Option<StorageCredentials>,
    /// Blob service endpoint
    pub endpoint: StorageEndpoint,
    /// Retry and block transfer tuning
    pub options: StorageOptions,
}

/// Image-half pipeline configuration
#[derive(Debug, Clone)]
pub struct ImageHalfConfig {
    /// JPEG quality of the derived image
    pub jpeg_quality: u8,
    /// Deadline for the storage calls of one invocation
    pub request_timeout: Duration,
    /// Output binding that receives the derived blob path, if declared
    pub output_binding: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            storage: StorageConfig::default(),
            image_half: ImageHalfConfig::default(),
        }
    }
}

impl Default for ImageHalfConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            request_timeout: Duration::from_secs(300),
            output_binding: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Server config
        if let Some(host) = var("HOST")
            && !host.is_empty()
        {
            config.host = host;
        }
        if let Some(port) = var(PORT_VAR) {
            match port.parse() {
                Ok(p) => config.port = p,
                Err(_) => warn!("Ignoring invalid {}: {:?}", PORT_VAR, port),
            }
        }

        // Storage config
        config.storage.credentials =
            StorageCredentials::from_parts(var(ACCOUNT_VAR), var(ACCESS_KEY_VAR));
        if let Some(val) = var("AZURE_STORAGE_ENDPOINT") {
            match StorageEndpoint::parse(&val) {
                Some(endpoint) => config.storage.endpoint = endpoint,
                None => warn!("Ignoring invalid AZURE_STORAGE_ENDPOINT: {:?}", val),
            }
        }
        if let Some(val) = var("STORAGE_MAX_READ_ATTEMPTS")
            && let Ok(v) = val.parse::<usize>()
            && v > 0
        {
            config.storage.options.max_read_attempts = v;
        }
        if let Some(val) = var("STORAGE_BLOCK_SIZE_MB")
            && let Ok(mb) = val.parse::<usize>()
            && mb > 0
        {
            config.storage.options.block_size = mb * 1024 * 1024;
        }
        if let Some(val) = var("STORAGE_PARALLELISM")
            && let Ok(v) = val.parse::<usize>()
            && v > 0
        {
            config.storage.options.parallelism = v;
        }

        // Image-half config
        if let Some(val) = var("IMAGE_HALF_JPEG_QUALITY") {
            match val.parse::<u8>() {
                Ok(q) if (1..=100).contains(&q) => config.image_half.jpeg_quality = q,
                _ => warn!("Ignoring invalid IMAGE_HALF_JPEG_QUALITY: {:?}", val),
            }
        }
        if let Some(val) = var("REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.image_half.request_timeout = Duration::from_secs(secs);
        }
        if let Some(name) = var("IMAGE_HALF_OUTPUT_BINDING")
            && !name.is_empty()
        {
            config.image_half.output_binding = Some(name);
        }

        config
    }
}
