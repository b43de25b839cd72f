//! Image assembly and pixel decoding.
//!
//! This module turns a parsed DICOM data set into an image:
//!
//! - [`ImageFacts`] gathers the attributes that describe the image
//! - [`build_geometry`] assembles the 3D or 4D geometric frame
//! - [`StagedSamples`] normalizes native pixel data
//! - [`decode`] writes pixel-interleaved samples into a caller's buffer
//! - [`DicomImageReader`] ties the steps together for a file on disk
//! - [`preview`] renders a single frame as PNG

mod decoder;
mod facts;
mod geometry;
mod pixel;
pub mod preview;
mod reader;
mod samples;

pub use decoder::decode;
pub use facts::{ImageFacts, PixelPayload};
pub use geometry::{build_geometry, cross, dot, normalize, GeometryInput, GeometrySpec, Vector3};
pub use pixel::{ComponentKind, PixelEncoding, PixelKind};
pub use reader::DicomImageReader;
pub use samples::{NativeLayout, StagedSamples};
