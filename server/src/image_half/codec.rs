//! JPEG decode and encode

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};

use super::types::ImageHalfError;

/// Decoded raster handed between pipeline stages
pub type PixelBuffer = RgbImage;

/// Quality used when the pipeline re-encodes the halved image
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Decode a JPEG stream into an opaque RGB buffer
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, ImageHalfError> {
    let format = image::guess_format(bytes).map_err(|e| ImageHalfError::Decode(e.to_string()))?;
    if format != ImageFormat::Jpeg {
        return Err(ImageHalfError::Decode(format!(
            "Unsupported image format: {:?}",
            format
        )));
    }

    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|e| ImageHalfError::Decode(e.to_string()))?;

    Ok(decoded.into_rgb8())
}

/// Encode a buffer as baseline JPEG
///
/// `quality` ranges over 0..=100; the encoder treats 0 as 1. Output is
/// byte-for-byte stable for identical input and quality.
pub fn encode(pixels: &PixelBuffer, quality: u8) -> Result<Vec<u8>, ImageHalfError> {
    if quality > 100 {
        return Err(ImageHalfError::Encode(format!(
            "JPEG quality must be between 0 and 100, got {}",
            quality
        )));
    }

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageHalfError::Encode(e.to_string()))?;

    Ok(buffer)
}
