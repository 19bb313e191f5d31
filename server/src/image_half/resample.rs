//! Catmull-Rom downscaling

use image::imageops::{self, FilterType};

use super::codec::PixelBuffer;
use super::types::ImageHalfError;

/// Scale factor applied by the pipeline
pub const HALF: f64 = 0.5;

/// Output dimensions for `factor`, truncated toward zero
///
/// 101x75 at 0.5 gives 50x37.
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    (
        (width as f64 * factor).floor() as u32,
        (height as f64 * factor).floor() as u32,
    )
}

/// Downscale `src` by `factor` with the Catmull-Rom kernel
///
/// The result is a freshly allocated opaque buffer; nothing from any prior
/// destination content is blended in.
pub fn scale(src: &PixelBuffer, factor: f64) -> Result<PixelBuffer, ImageHalfError> {
    if !(factor > 0.0 && factor <= 1.0) {
        return Err(ImageHalfError::Resample(format!(
            "Scale factor must be in (0, 1], got {}",
            factor
        )));
    }

    let (width, height) = scaled_dimensions(src.width(), src.height(), factor);
    if width == 0 || height == 0 {
        return Err(ImageHalfError::Resample(format!(
            "{}x{} image is too small to scale by {}",
            src.width(),
            src.height(),
            factor
        )));
    }

    Ok(imageops::resize(src, width, height, FilterType::CatmullRom))
}
