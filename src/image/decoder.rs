//! Pixel buffer decoding.
//!
//! Copies staged samples into a caller-owned buffer. Scalar and vector data
//! are copied as is. Color data is staged plane by plane (all red samples,
//! then all green, then all blue) and is rewritten pixel by pixel.

use tracing::trace;

use crate::error::DecodeError;

use super::pixel::{ComponentKind, PixelEncoding, PixelKind};

/// Decode `sample_count` pixels from `source` into `target`.
///
/// `target` must be exactly `sample_count * channels * component size` bytes.
/// Nothing is allocated and nothing is retained.
///
/// # Errors
/// - `UnsupportedComponentType` for floating point components
/// - `UnsupportedColorComponentType` for RGB/RGBA with a component that is not
///   an unsigned 8, 16 or 32-bit integer
/// - `ImageTooLarge` if `sample_count` pixels overflow `usize`
/// - `BufferSizeMismatch` if `target` has the wrong size
/// - `SourceTooShort` if `source` holds fewer bytes than required
pub fn decode(
    target: &mut [u8],
    source: &[u8],
    sample_count: usize,
    encoding: &PixelEncoding,
) -> Result<(), DecodeError> {
    let component = encoding.component();
    if component.is_float() {
        return Err(DecodeError::UnsupportedComponentType(component.to_string()));
    }
    if encoding.pixel().is_color() && !component.is_unsigned_integer() {
        return Err(DecodeError::UnsupportedColorComponentType(component));
    }

    let channels = usize::from(encoding.channels());
    let expected = sample_count
        .checked_mul(encoding.pixel_size_in_bytes())
        .ok_or(DecodeError::ImageTooLarge {
            frames: 1,
            pixels_per_frame: sample_count,
            pixel_size: encoding.pixel_size_in_bytes(),
        })?;
    if target.len() != expected {
        return Err(DecodeError::BufferSizeMismatch {
            expected,
            actual: target.len(),
        });
    }
    if source.len() < expected {
        return Err(DecodeError::SourceTooShort {
            needed: expected,
            actual: source.len(),
        });
    }

    trace!(
        "Decoding {} pixels as {} ({} bytes)",
        sample_count,
        encoding,
        expected
    );

    match encoding.pixel() {
        PixelKind::Scalar | PixelKind::Vector => {
            target.copy_from_slice(&source[..expected]);
        }
        PixelKind::Rgb | PixelKind::Rgba => match component {
            ComponentKind::UInt8 => interleave_planes::<1>(target, source, sample_count, channels),
            ComponentKind::UInt16 => interleave_planes::<2>(target, source, sample_count, channels),
            ComponentKind::UInt32 => interleave_planes::<4>(target, source, sample_count, channels),
            other => return Err(DecodeError::UnsupportedColorComponentType(other)),
        },
    }

    Ok(())
}

/// Rewrite plane-interleaved samples as pixel-interleaved.
///
/// `W` is the component width in bytes. For pixel `i` and channel `c`:
/// `target[i * channels + c] = source[c * count + i]`.
pub(crate) fn interleave_planes<const W: usize>(
    target: &mut [u8],
    source: &[u8],
    count: usize,
    channels: usize,
) {
    for (i, pixel) in target.chunks_exact_mut(W * channels).take(count).enumerate() {
        for (c, sample) in pixel.chunks_exact_mut(W).enumerate() {
            let start = (c * count + i) * W;
            sample.copy_from_slice(&source[start..start + W]);
        }
    }
}

/// Rewrite pixel-interleaved samples as plane-interleaved.
///
/// Inverse of [`interleave_planes`]: `target[c * count + i] =
/// source[i * channels + c]`.
pub(crate) fn separate_planes<const W: usize>(
    target: &mut [u8],
    source: &[u8],
    count: usize,
    channels: usize,
) {
    for (i, pixel) in source.chunks_exact(W * channels).take(count).enumerate() {
        for (c, sample) in pixel.chunks_exact(W).enumerate() {
            let start = (c * count + i) * W;
            target[start..start + W].copy_from_slice(sample);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
