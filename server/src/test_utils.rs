//! Test Utilities Module
//!
//! Fixtures shared by the unit tests. Only compiled when running tests.

#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use image::{Rgb, RgbImage};

use crate::image_half::{ImageLocation, codec};
use crate::invocation::InvokeRequest;
use crate::storage::{MemoryContainers, ObjectStoreClient, StorageOptions};

/// Encode a patterned `width` x `height` JPEG
pub fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 64 * 4) as u8,
        ])
    });
    codec::encode(&img, 90).expect("test JPEG should encode")
}

/// Request body wrapping `location` the way the host does
pub fn envelope_for(location: &ImageLocation) -> Vec<u8> {
    let request = InvokeRequest::with_value(location).expect("location should serialize");
    serde_json::to_vec(&request).expect("envelope should serialize")
}

/// Client over fresh in-memory containers, without retry delays
pub fn memory_client() -> Arc<ObjectStoreClient<MemoryContainers>> {
    let options = StorageOptions {
        read_retry_backoff: Duration::ZERO,
        ..Default::default()
    };
    Arc::new(ObjectStoreClient::new(MemoryContainers::new(), options))
}
