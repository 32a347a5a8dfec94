//! Image preprocessing for inference submissions.
//!
//! The backend rejects or chokes on oversized inputs, so attached
//! images are rescaled before upload. [`resize_if_needed`] is a purely
//! functional transform: images already within bounds pass through
//! byte-identical (no re-encode), oversized ones are downscaled with a
//! high-quality filter and re-encoded in their original format.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{ImageFormat, ImageOutputFormat};

/// JPEG re-encode quality for downscaled lossy images.
const JPEG_QUALITY: u8 = 95;

/// The input bytes could not be handled as an image.
///
/// Surfaced to the caller as a user-facing invalid-input error; it must
/// never crash the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The bytes do not start with any recognized image signature.
    #[error("unrecognized image format")]
    UnrecognizedFormat,

    /// The bytes declared a known format but could not be decoded.
    #[error("failed to decode image: {0}")]
    Corrupt(#[source] image::ImageError),

    /// Re-encoding the downscaled image failed.
    #[error("failed to re-encode image: {0}")]
    Reencode(#[source] image::ImageError),
}

/// Rescale an image so that its largest dimension does not exceed
/// `max_dimension`, preserving aspect ratio.
///
/// Images already within bounds are returned unchanged, byte for byte.
/// Oversized images are downscaled with Lanczos resampling, with both
/// target dimensions floor-rounded, and re-encoded in the detected
/// input format (JPEG at quality 95, other formats with their default
/// lossless encoding).
pub fn resize_if_needed(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, DecodeError> {
    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnrecognizedFormat)?;
    let img = image::load_from_memory_with_format(bytes, format).map_err(DecodeError::Corrupt)?;

    let (width, height) = (img.width(), img.height());
    let largest = width.max(height);
    if largest <= max_dimension {
        return Ok(bytes.to_vec());
    }

    let scale = f64::from(max_dimension) / f64::from(largest);
    let new_width = ((f64::from(width) * scale) as u32).max(1);
    let new_height = ((f64::from(height) * scale) as u32).max(1);

    tracing::debug!(
        width,
        height,
        new_width,
        new_height,
        format = ?format,
        "Downscaling oversized image"
    );

    let resized = img.resize_exact(new_width, new_height, FilterType::Lanczos3);

    let output_format = match format {
        ImageFormat::Jpeg => ImageOutputFormat::Jpeg(JPEG_QUALITY),
        other => ImageOutputFormat::from(other),
    };

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, output_format)
        .map_err(DecodeError::Reencode)?;
    Ok(out.into_inner())
}
