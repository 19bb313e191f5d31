//! imagehalf server library
//!
//! Custom-handler routes for a serverless host. The `/ImageHalf` route reads
//! `image.jpg` from blob storage, halves it with a Catmull-Rom kernel and
//! writes `image-half.jpg` next to it.

pub mod config;
pub mod image_half;
pub mod invocation;
pub mod server;
pub mod storage;
pub mod triggers;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use image_half::{ImageHalfError, ImageHalfService, ImageLocation};
pub use invocation::{InvokeRequest, InvokeResponse};
pub use server::{AppState, build_router};
pub use storage::{BlobStore, MemoryContainers, ObjectStoreClient, RequestContext};
