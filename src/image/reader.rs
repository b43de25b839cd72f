//! Reader facade tying detection, parsing, geometry and decoding together.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dicom_frame::DicomImageReader;
//!
//! let path = Path::new("scan.dcm");
//! if DicomImageReader::can_read_file(path) {
//!     let reader = DicomImageReader::open(path)?;
//!     let mut buffer = vec![0u8; reader.pixel_buffer_len()];
//!     reader.read(&mut buffer)?;
//! }
//! ```

use std::io::BufReader;
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::{DecodeError, ImageError};
use crate::format::dicom::{DicomFile, TransferSyntax};
use crate::format::{self, is_likely_dicom, probe_dicom_magic, DicomFormat};
use crate::io::{open_file, read_file};

use super::decoder::decode;
use super::facts::ImageFacts;
use super::geometry::{build_geometry, GeometrySpec};
use super::pixel::PixelEncoding;
use super::samples::{NativeLayout, StagedSamples};

/// An opened DICOM image, ready to be decoded.
///
/// Opening parses the element stream, assembles the geometric frame and
/// stages the pixel samples. [`DicomImageReader::read`] can then be called
/// any number of times.
#[derive(Debug, Clone)]
pub struct DicomImageReader {
    identifier: String,
    has_preamble: bool,
    transfer_syntax: TransferSyntax,
    geometry: GeometrySpec,
    samples: StagedSamples,
    pixels_per_frame: usize,
}

impl DicomImageReader {
    // -------------------------------------------------------------------------
    // Detection
    // -------------------------------------------------------------------------

    /// Check whether a file can be opened by this reader.
    ///
    /// The element heuristic runs on a fresh handle first. If it rejects the
    /// file, the Part 10 magic is checked on a new handle. A detected file is
    /// then opened in full, so a `true` result means [`DicomImageReader::open`]
    /// will succeed.
    pub fn can_read_file(path: &Path) -> bool {
        let detected = match open_file(path) {
            Ok(file) => is_likely_dicom(BufReader::new(file)),
            Err(e) => {
                debug!("Cannot probe {}: {}", path.display(), e);
                return false;
            }
        };

        if !detected && !probe_magic(path) {
            trace!("{} is not DICOM", path.display());
            return false;
        }

        match Self::open(path) {
            Ok(_) => true,
            Err(e) => {
                debug!("{} looks like DICOM but cannot be read: {}", path.display(), e);
                false
            }
        }
    }

    /// Classify an in-memory file.
    pub fn detect_format(bytes: &[u8]) -> Option<DicomFormat> {
        format::detect_format(bytes)
    }

    /// Writing DICOM files is not implemented.
    pub fn can_write_file(&self) -> bool {
        false
    }

    // -------------------------------------------------------------------------
    // Opening
    // -------------------------------------------------------------------------

    /// Open and stage a file from disk.
    pub fn open(path: &Path) -> Result<Self, ImageError> {
        let data = read_file(path)?;
        Self::from_bytes(data, path.display().to_string())
    }

    /// Open a file already held in memory.
    ///
    /// `identifier` is used in log messages and errors.
    ///
    /// # Errors
    /// - `ImageError::Parse` if the element stream cannot be parsed or a
    ///   required attribute is missing
    /// - `ImageError::Geometry` if rows or columns is zero, or the orientation
    ///   cannot form an orthonormal frame
    /// - `ImageError::Decode` if the pixel encoding is not supported or the
    ///   pixel data is missing or short
    pub fn from_bytes(data: Bytes, identifier: impl Into<String>) -> Result<Self, ImageError> {
        let identifier = identifier.into();
        let file = DicomFile::parse(data)?;
        let facts = ImageFacts::from_dataset(&file.dataset)?;

        let geometry = build_geometry(&facts.geometry_input())?;
        let encoding = facts.encoding()?;

        let payload = facts
            .pixel_data
            .as_ref()
            .ok_or_else(|| DecodeError::MissingPixelData(identifier.clone()))?;

        let layout = NativeLayout {
            frames: facts.frame_count as usize,
            pixels_per_frame: facts.pixels_per_frame(),
            planar_configuration: facts.planar_configuration,
            byte_order: file.dataset.byte_order(),
        };
        let samples = StagedSamples::from_native(&payload.data, layout, encoding)?;

        debug!(
            "Opened {}: {}D, extents {:?}, {} ({}, {} pixels)",
            identifier,
            geometry.dimension_count(),
            geometry.extents(),
            encoding,
            file.transfer_syntax.name(),
            samples.count()
        );

        Ok(Self {
            identifier,
            has_preamble: file.has_preamble,
            transfer_syntax: file.transfer_syntax,
            geometry,
            samples,
            pixels_per_frame: layout.pixels_per_frame,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn has_preamble(&self) -> bool {
        self.has_preamble
    }

    pub fn transfer_syntax(&self) -> TransferSyntax {
        self.transfer_syntax
    }

    pub fn geometry(&self) -> &GeometrySpec {
        &self.geometry
    }

    pub fn encoding(&self) -> &PixelEncoding {
        self.samples.encoding()
    }

    /// Number of pixels across all frames.
    pub fn sample_count(&self) -> usize {
        self.samples.count()
    }

    pub fn pixels_per_frame(&self) -> usize {
        self.pixels_per_frame
    }

    /// Number of frames held by the staged samples.
    pub fn frame_count(&self) -> usize {
        if self.pixels_per_frame == 0 {
            0
        } else {
            self.samples.count() / self.pixels_per_frame
        }
    }

    /// Size in bytes of the buffer [`DicomImageReader::read`] expects.
    pub fn pixel_buffer_len(&self) -> usize {
        self.samples.decoded_len()
    }

    // -------------------------------------------------------------------------
    // Decoding
    // -------------------------------------------------------------------------

    /// Decode every pixel into `target`, pixel-interleaved and little-endian.
    pub fn read(&self, target: &mut [u8]) -> Result<(), ImageError> {
        decode(
            target,
            self.samples.data(),
            self.samples.count(),
            self.samples.encoding(),
        )?;
        Ok(())
    }

    /// Decode every pixel into a new buffer.
    pub fn read_to_vec(&self) -> Result<Vec<u8>, ImageError> {
        let mut buffer = vec![0u8; self.pixel_buffer_len()];
        self.read(&mut buffer)?;
        Ok(buffer)
    }
}

/// Check the Part 10 magic on a new handle.
fn probe_magic(path: &Path) -> bool {
    open_file(path).is_ok_and(probe_dicom_magic)
}

// =============================================================================
// Tests
// =============================================================================
