//! Blob storage for the image pipeline
//!
//! This module provides:
//! - `BlobStore` trait for reading and writing blobs by container and path
//! - `ObjectStoreClient` with read retry and parallel block upload
//! - `AzureContainers` for Azure Blob Storage (emulator or production)
//! - `MemoryContainers` for in-process stores
//! - `RequestContext` carrying a per-invocation deadline and cancellation

mod azure;
mod client;
mod context;
mod memory;
mod service;
mod types;

pub use azure::{AzureBlobClient, AzureContainers};
pub use client::{ContainerProvider, ObjectStoreClient};
pub use context::RequestContext;
pub use memory::MemoryContainers;
pub use service::BlobStore;
pub use types::{StorageCredentials, StorageEndpoint, StorageError, StorageOptions};
