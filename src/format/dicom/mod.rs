//! DICOM element stream reader.
//!
//! This module parses the tag/VR/length element structure of DICOM files,
//! which carries the metadata needed to describe an image and its pixel data.
//!
//! # Key Concepts
//!
//! - **Transfer syntax**: declared in the file meta group, decides whether
//!   element headers carry a VR (explicit) or not (implicit), and the byte
//!   order of every value after the meta group.
//!
//! - **Short vs long length**: in explicit VR streams, most VRs use a 2-byte
//!   length, while binary and sequence VRs use two reserved bytes followed by
//!   a 4-byte length.
//!
//! - **Sequences**: nested data sets, delimited either by length or by item
//!   and sequence delimitation markers.

mod dictionary;
mod parser;
mod values;

pub use dictionary::{tags, Tag, Vr, FILE_META_GROUP, IDENTIFYING_GROUP};
pub use parser::{DicomFile, TransferSyntax, MAX_SEQUENCE_DEPTH, UNDEFINED_LENGTH};
pub use values::{DataSet, Element, Value};
