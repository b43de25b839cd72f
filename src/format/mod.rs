//! Format detection and element parsing for DICOM files.
//!
//! # Format Detection
//!
//! Use [`detect::is_likely_dicom`] to sniff a stream that may lack the Part 10
//! preamble, or [`detect::detect_format`] to classify an in-memory file:
//!
//! - **Part 10**: 128-byte preamble followed by `DICM`
//! - **No preamble**: element stream starting at offset 0

pub mod detect;
pub mod dicom;

pub use detect::{
    detect_format, has_dicom_magic, is_likely_dicom, probe_dicom_magic, DicomFormat,
};
