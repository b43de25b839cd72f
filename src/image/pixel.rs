//! Pixel component and channel classification.

use std::fmt;

use serde::Serialize;

use crate::error::DecodeError;

// =============================================================================
// ComponentKind
// =============================================================================

/// Numeric type of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentKind {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl ComponentKind {
    /// Classify an integer sample from its allocated width and signedness.
    ///
    /// # Errors
    /// Returns `UnsupportedComponentType` for widths other than 8, 16 or 32.
    pub fn from_bits(bits_allocated: u16, signed: bool) -> Result<Self, DecodeError> {
        let kind = match (bits_allocated, signed) {
            (8, false) => ComponentKind::UInt8,
            (8, true) => ComponentKind::Int8,
            (16, false) => ComponentKind::UInt16,
            (16, true) => ComponentKind::Int16,
            (32, false) => ComponentKind::UInt32,
            (32, true) => ComponentKind::Int32,
            (bits, signed) => {
                return Err(DecodeError::UnsupportedComponentType(format!(
                    "{}-bit {} integer",
                    bits,
                    if signed { "signed" } else { "unsigned" }
                )))
            }
        };
        Ok(kind)
    }

    /// Size of one sample in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            ComponentKind::UInt8 | ComponentKind::Int8 => 1,
            ComponentKind::UInt16 | ComponentKind::Int16 => 2,
            ComponentKind::UInt32 | ComponentKind::Int32 | ComponentKind::Float32 => 4,
            ComponentKind::Float64 => 8,
        }
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, ComponentKind::Float32 | ComponentKind::Float64)
    }

    #[inline]
    pub const fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            ComponentKind::UInt8 | ComponentKind::UInt16 | ComponentKind::UInt32
        )
    }

    /// Read one little-endian sample as f64.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than [`ComponentKind::size_in_bytes`].
    pub fn read_le(self, bytes: &[u8]) -> f64 {
        match self {
            ComponentKind::UInt8 => f64::from(bytes[0]),
            ComponentKind::Int8 => f64::from(bytes[0] as i8),
            ComponentKind::UInt16 => f64::from(u16::from_le_bytes([bytes[0], bytes[1]])),
            ComponentKind::Int16 => f64::from(i16::from_le_bytes([bytes[0], bytes[1]])),
            ComponentKind::UInt32 => {
                f64::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ComponentKind::Int32 => {
                f64::from(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ComponentKind::Float32 => {
                f64::from(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ComponentKind::Float64 => f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::UInt8 => "uint8",
            ComponentKind::Int8 => "int8",
            ComponentKind::UInt16 => "uint16",
            ComponentKind::Int16 => "int16",
            ComponentKind::UInt32 => "uint32",
            ComponentKind::Int32 => "int32",
            ComponentKind::Float32 => "float32",
            ComponentKind::Float64 => "float64",
        };
        f.write_str(name)
    }
}

// =============================================================================
// PixelKind
// =============================================================================

/// Channel layout of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PixelKind {
    /// One channel
    Scalar,
    /// Two channels (luminance and alpha), copied without reordering
    Vector,
    Rgb,
    Rgba,
}

impl PixelKind {
    /// Classify from the number of sample planes.
    pub fn from_planes(planes: u16) -> Result<Self, DecodeError> {
        match planes {
            1 => Ok(PixelKind::Scalar),
            2 => Ok(PixelKind::Vector),
            3 => Ok(PixelKind::Rgb),
            4 => Ok(PixelKind::Rgba),
            other => Err(DecodeError::UnsupportedPlaneCount(other)),
        }
    }

    #[inline]
    pub const fn is_color(self) -> bool {
        matches!(self, PixelKind::Rgb | PixelKind::Rgba)
    }
}

impl fmt::Display for PixelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelKind::Scalar => "scalar",
            PixelKind::Vector => "vector",
            PixelKind::Rgb => "rgb",
            PixelKind::Rgba => "rgba",
        };
        f.write_str(name)
    }
}

// =============================================================================
// PixelEncoding
// =============================================================================

/// How the samples of one pixel are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
///
/// The channel count always follows from the pixel kind: use
/// [`PixelEncoding::new`] or [`PixelEncoding::classify`] to build one.
pub struct PixelEncoding {
    component: ComponentKind,
    channels: u16,
    pixel: PixelKind,
}

impl PixelEncoding {
    pub fn new(component: ComponentKind, pixel: PixelKind) -> Self {
        let channels = match pixel {
            PixelKind::Scalar => 1,
            PixelKind::Vector => 2,
            PixelKind::Rgb => 3,
            PixelKind::Rgba => 4,
        };
        Self {
            component,
            channels,
            pixel,
        }
    }

    /// Classify integer pixel data.
    ///
    /// # Arguments
    /// * `bits_allocated` - Allocated bits per sample (8, 16 or 32)
    /// * `signed` - Pixel representation is two's complement
    /// * `planes` - Samples per pixel (1 to 4)
    pub fn classify(bits_allocated: u16, signed: bool, planes: u16) -> Result<Self, DecodeError> {
        let component = ComponentKind::from_bits(bits_allocated, signed)?;
        let pixel = PixelKind::from_planes(planes)?;
        Ok(Self::new(component, pixel))
    }

    #[inline]
    pub fn component(&self) -> ComponentKind {
        self.component
    }

    /// Number of samples per pixel (1 to 4).
    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    #[inline]
    pub fn pixel(&self) -> PixelKind {
        self.pixel
    }

    /// Bytes occupied by one pixel across all channels.
    #[inline]
    pub fn pixel_size_in_bytes(&self) -> usize {
        self.component.size_in_bytes() * usize::from(self.channels)
    }
}

impl fmt::Display for PixelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{} {}", self.pixel, self.channels, self.component)
    }
}

// =============================================================================
// Tests
// =============================================================================
