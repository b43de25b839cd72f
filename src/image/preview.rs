//! PNG preview of a single frame.
//!
//! Scalar and vector data are rescaled with the modality slope and
//! intercept, then window-levelled over the frame's own value range to
//! 8-bit grey. Color data keeps its channels, reduced to 8 bits per sample.

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use tracing::debug;

use crate::error::ImageError;

use super::pixel::{ComponentKind, PixelKind};
use super::reader::DicomImageReader;

/// Render one frame of an opened image.
///
/// # Errors
/// Returns `ImageError::Preview` if `frame` is out of range, and any error
/// raised while decoding the pixel buffer.
pub fn render_frame(reader: &DicomImageReader, frame: usize) -> Result<DynamicImage, ImageError> {
    let frames = reader.frame_count();
    if frame >= frames {
        return Err(ImageError::Preview(format!(
            "frame {} is out of range ({} frames)",
            frame, frames
        )));
    }

    let extents = reader.geometry().extents();
    let (width, height) = (extents[0], extents[1]);
    let encoding = *reader.encoding();
    let component = encoding.component();
    let pixel_size = encoding.pixel_size_in_bytes();
    let frame_len = reader.pixels_per_frame() * pixel_size;

    let decoded = reader.read_to_vec()?;
    let samples = &decoded[frame * frame_len..(frame + 1) * frame_len];

    debug!(
        "Rendering frame {} of {} ({}x{}, {})",
        frame, frames, width, height, encoding
    );

    let image = match encoding.pixel() {
        PixelKind::Scalar | PixelKind::Vector => {
            let geometry = reader.geometry();
            let values: Vec<f64> = samples
                .chunks_exact(pixel_size)
                .map(|pixel| geometry.rescale(component.read_le(pixel)))
                .collect();
            let buffer = GrayImage::from_raw(width, height, window_to_u8(&values));
            buffer.map(DynamicImage::ImageLuma8)
        }
        PixelKind::Rgb => {
            RgbImage::from_raw(width, height, reduce_to_u8(samples, component))
                .map(DynamicImage::ImageRgb8)
        }
        PixelKind::Rgba => {
            RgbaImage::from_raw(width, height, reduce_to_u8(samples, component))
                .map(DynamicImage::ImageRgba8)
        }
    };

    image.ok_or_else(|| {
        ImageError::Preview(format!(
            "frame buffer does not match {}x{} {}",
            width, height, encoding.pixel()
        ))
    })
}

/// Encode an image as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Bytes, ImageError> {
    let mut output = Vec::new();
    image
        .write_with_encoder(PngEncoder::new(&mut output))
        .map_err(|e| ImageError::Preview(e.to_string()))?;
    Ok(Bytes::from(output))
}

/// Map values linearly from their min/max range onto 0..=255.
fn window_to_u8(values: &[f64]) -> Vec<u8> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return vec![0; values.len()];
    }
    values
        .iter()
        .map(|&v| (((v - min) / range) * 255.0).round() as u8)
        .collect()
}

/// Keep the most significant byte of every unsigned sample.
fn reduce_to_u8(samples: &[u8], component: ComponentKind) -> Vec<u8> {
    let width = component.size_in_bytes();
    samples
        .chunks_exact(width)
        .map(|sample| sample[width - 1])
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
