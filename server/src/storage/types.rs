//! Storage-related types and error definitions

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the object store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Storage operation cancelled")]
    Cancelled,

    #[error("Storage operation exceeded its deadline")]
    DeadlineExceeded,
}

impl StorageError {
    /// Whether a read that failed this way may succeed when attempted again
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::DownloadFailed(_))
    }
}

/// Shared-key credentials for a storage account
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    pub account: String,
    pub access_key: String,
}

impl StorageCredentials {
    /// Build credentials when both values are present and non-empty
    pub fn from_parts(account: Option<String>, access_key: Option<String>) -> Option<Self> {
        match (account, access_key) {
            (Some(account), Some(access_key)) if !account.is_empty() && !access_key.is_empty() => {
                Some(Self {
                    account,
                    access_key,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("account", &self.account)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Where the blob service lives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StorageEndpoint {
    /// Local Azurite emulator (`http://127.0.0.1:10000` unless
    /// `AZURITE_BLOB_STORAGE_URL` says otherwise)
    #[default]
    Emulator,
    /// `https://<account>.blob.core.windows.net`
    Production,
    /// Explicit service URL
    Custom(String),
}

impl StorageEndpoint {
    /// Parse `emulator`, `production` or an http(s) URL
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            v if v.eq_ignore_ascii_case("emulator") => Some(Self::Emulator),
            v if v.eq_ignore_ascii_case("production") => Some(Self::Production),
            v if v.starts_with("http://") || v.starts_with("https://") => {
                Some(Self::Custom(v.trim_end_matches('/').to_string()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for StorageEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEndpoint::Emulator => f.write_str("emulator"),
            StorageEndpoint::Production => f.write_str("production"),
            StorageEndpoint::Custom(url) => f.write_str(url),
        }
    }
}

/// Transfer tuning for the object store client
#[derive(Debug, Clone)]
pub struct StorageOptions {
    /// Attempts made to read an object before giving up
    pub max_read_attempts: usize,
    /// Pause between read attempts, multiplied by the attempt number
    pub read_retry_backoff: Duration,
    /// Size of each uploaded block in bytes
    pub block_size: usize,
    /// Blocks in flight at once during an upload
    pub parallelism: usize,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            max_read_attempts: 20,
            read_retry_backoff: Duration::from_millis(50),
            block_size: 4 * 1024 * 1024, // 4 MiB
            parallelism: 16,
        }
    }
}
