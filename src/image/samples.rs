//! Staging of raw pixel data for decoding.
//!
//! Pixel data arrives in the file's byte order and, for color images, in one
//! of two planar configurations. [`StagedSamples`] normalizes both: samples
//! become little-endian, and color samples are arranged as whole-image
//! planes (every red sample of every frame, then every green sample, ...).

use bytes::Bytes;

use crate::error::DecodeError;
use crate::io::ByteOrder;

use super::decoder::separate_planes;
use super::pixel::PixelEncoding;

/// Layout of native pixel data as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeLayout {
    pub frames: usize,
    pub pixels_per_frame: usize,
    /// 0 = channels interleaved per pixel, 1 = one plane per channel per frame
    pub planar_configuration: u16,
    pub byte_order: ByteOrder,
}

/// Normalized samples, ready for [`super::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct StagedSamples {
    data: Bytes,
    count: usize,
    decoded_len: usize,
    encoding: PixelEncoding,
}

impl StagedSamples {
    /// Stage native pixel data.
    ///
    /// Bytes past the expected size (such as a trailing pad byte) are ignored.
    ///
    /// # Errors
    /// - `ImageTooLarge` if the declared size overflows `usize`
    /// - `SourceTooShort` if `raw` holds fewer bytes than the layout needs
    pub fn from_native(
        raw: &[u8],
        layout: NativeLayout,
        encoding: PixelEncoding,
    ) -> Result<Self, DecodeError> {
        let width = encoding.component().size_in_bytes();
        let too_large = || DecodeError::ImageTooLarge {
            frames: layout.frames,
            pixels_per_frame: layout.pixels_per_frame,
            pixel_size: encoding.pixel_size_in_bytes(),
        };
        let count = layout
            .frames
            .checked_mul(layout.pixels_per_frame)
            .ok_or_else(too_large)?;
        let needed = count
            .checked_mul(encoding.pixel_size_in_bytes())
            .ok_or_else(too_large)?;
        if raw.len() < needed {
            return Err(DecodeError::SourceTooShort {
                needed,
                actual: raw.len(),
            });
        }

        let mut native = raw[..needed].to_vec();
        layout.byte_order.normalize_to_le(&mut native, width);

        // Float samples are rejected at decode time, so they stay as stored
        let data = if encoding.pixel().is_color() && !encoding.component().is_float() {
            let channels = usize::from(encoding.channels());
            if layout.planar_configuration == 0 {
                let mut planes = vec![0u8; needed];
                match width {
                    1 => separate_planes::<1>(&mut planes, &native, count, channels),
                    2 => separate_planes::<2>(&mut planes, &native, count, channels),
                    4 => separate_planes::<4>(&mut planes, &native, count, channels),
                    _ => {
                        return Err(DecodeError::UnsupportedColorComponentType(
                            encoding.component(),
                        ))
                    }
                }
                planes
            } else {
                merge_frame_planes(&native, layout, channels, width)
            }
        } else {
            native
        };

        Ok(Self {
            data: Bytes::from(data),
            count,
            decoded_len: needed,
            encoding,
        })
    }

    /// Normalized sample bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of pixels across all frames.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn encoding(&self) -> &PixelEncoding {
        &self.encoding
    }

    /// Size of the fully decoded buffer in bytes.
    pub fn decoded_len(&self) -> usize {
        self.decoded_len
    }
}

/// Rearrange per-frame planes into whole-image planes.
///
/// Planar configuration 1 stores each frame as its own run of planes. Staged
/// color data keeps one plane per channel spanning every frame.
fn merge_frame_planes(
    native: &[u8],
    layout: NativeLayout,
    channels: usize,
    width: usize,
) -> Vec<u8> {
    if layout.frames <= 1 {
        return native.to_vec();
    }

    let plane_bytes = layout.pixels_per_frame * width;
    let channel_bytes = plane_bytes * layout.frames;
    let mut merged = vec![0u8; native.len()];

    for (index, plane) in native.chunks_exact(plane_bytes).enumerate() {
        let frame = index / channels;
        let channel = index % channels;
        let start = channel * channel_bytes + frame * plane_bytes;
        merged[start..start + plane_bytes].copy_from_slice(plane);
    }
    merged
}

// =============================================================================
// Tests
// =============================================================================
