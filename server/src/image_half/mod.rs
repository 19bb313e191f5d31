//! Image-half pipeline
//!
//! This module provides:
//! - `ImageLocation` payload and the `image.jpg` / `image-half.jpg` naming
//! - JPEG `codec` and Catmull-Rom `resample` stages
//! - `ImageHalfService` sequencing download, decode, scale, encode and upload
//! - the `POST /ImageHalf` route

pub mod codec;
mod pipeline;
pub mod resample;
pub mod routes;
mod types;

pub use codec::{DEFAULT_JPEG_QUALITY, PixelBuffer};
pub use pipeline::{ImageHalfService, Stage};
pub use routes::{ImageHalfAppState, image_half_routes};
pub use types::{HALF_BLOB, ImageHalfError, ImageLocation, SOURCE_BLOB};
