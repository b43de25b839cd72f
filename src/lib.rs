//! # dicom-frame
//!
//! Detection, geometry and pixel decoding for uncompressed DICOM images.
//!
//! This library recognizes DICOM files (including files written without the
//! 128-byte preamble), assembles the image's geometric frame in patient
//! space, and decodes the pixel samples into a caller-owned buffer.
//!
//! ## Features
//!
//! - **Preamble-less detection**: A heuristic over the leading elements accepts
//!   element streams that lack the Part 10 preamble and magic
//! - **3D and 4D geometry**: Multi-phase series become a fourth axis with an
//!   identity time direction
//! - **Native transfer syntaxes**: Implicit and explicit VR little endian, and
//!   explicit VR big endian
//! - **Color reordering**: RGB/RGBA planes are written pixel-interleaved
//!
//! ## Architecture
//!
//! - [`io`] - Byte order helpers, a zero-copy cursor and file loading
//! - [`mod@format`] - Format detection and the element stream parser
//! - [`mod@image`] - Image attributes, geometry, staging, decoding and previews
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dicom_frame::DicomImageReader;
//!
//! let path = Path::new("scan.dcm");
//! if DicomImageReader::can_read_file(path) {
//!     let reader = DicomImageReader::open(path).unwrap();
//!     let geometry = reader.geometry();
//!     println!("{}D image, extents {:?}", geometry.dimension_count(), geometry.extents());
//!
//!     let pixels = reader.read_to_vec().unwrap();
//!     println!("{} bytes of {}", pixels.len(), reader.encoding());
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod image;
pub mod io;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ExtractConfig, InfoConfig, PreviewConfig};
pub use error::{DecodeError, GeometryError, ImageError, IoError, MalformedStream, ParseError};
pub use format::dicom::{DataSet, DicomFile, Element, Tag, TransferSyntax, Value, Vr};
pub use format::{detect_format, has_dicom_magic, is_likely_dicom, probe_dicom_magic, DicomFormat};
pub use image::{
    build_geometry, decode, ComponentKind, DicomImageReader, GeometryInput, GeometrySpec,
    ImageFacts, PixelEncoding, PixelKind, StagedSamples,
};
pub use io::ByteOrder;
