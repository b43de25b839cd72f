use thiserror::Error;

use crate::format::dicom::Tag;
use crate::image::ComponentKind;

/// I/O errors that can occur when reading a file from disk
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// The file could not be opened or read
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// Reasons a byte stream was rejected by the preamble heuristic.
///
/// These never escape detection: they are logged and turned into `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedStream {
    /// Stream ended before a complete tag, VR or length field
    #[error("Stream ended inside an element header")]
    TruncatedHeader,

    /// First group is not one of the permitted leading groups
    #[error("Unexpected leading group 0x{0:04X}")]
    UnexpectedGroup(u16),

    /// Declared length is zero or negative
    #[error("Non-positive element length {0}")]
    NonPositiveLength(i64),

    /// Stream ended before a value could be skipped
    #[error("Stream ended while skipping {0} value bytes")]
    TruncatedValue(u32),
}

/// Errors that can occur when parsing the DICOM element stream
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// Buffer ended before a complete element could be read
    #[error("Unexpected end of data at offset {offset}: need {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Transfer syntax is compressed or otherwise not handled
    #[error("Unsupported transfer syntax: {0}")]
    UnsupportedTransferSyntax(String),

    /// Required element is missing from the data set
    #[error("Missing required element: {name} {tag}")]
    MissingElement { name: &'static str, tag: Tag },

    /// Element value could not be interpreted
    #[error("Invalid value for {name} {tag}: {message}")]
    InvalidValue {
        name: &'static str,
        tag: Tag,
        message: String,
    },

    /// Explicit VR element carries an undefined VR code
    #[error("Invalid VR code {code:?} for {tag} at offset {offset}")]
    InvalidVr {
        tag: Tag,
        code: [u8; 2],
        offset: usize,
    },

    /// Sequence nesting is malformed (missing or misplaced delimiters)
    #[error("Malformed sequence at offset {offset}: {message}")]
    MalformedSequence { offset: usize, message: String },
}

/// Errors raised while assembling the geometric frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Row or column count is zero or negative
    #[error("Invalid {field}: {value} (must be greater than 0)")]
    InvalidDimension { field: &'static str, value: i64 },

    /// A direction vector has no usable length, or the column direction is
    /// parallel to the slice direction
    #[error("Degenerate {field}: cannot form an orthonormal frame")]
    DegenerateDirection { field: &'static str },
}

/// Errors raised while classifying or decoding pixel samples
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Component type cannot be decoded (floating point or unknown width)
    #[error("Unsupported component type: {0}")]
    UnsupportedComponentType(String),

    /// Color images only support unsigned integer components
    #[error("Only unsigned integer components are supported for color images, got {0}")]
    UnsupportedColorComponentType(ComponentKind),

    /// Samples per pixel outside 1..=4
    #[error("Unsupported number of planes: {0}")]
    UnsupportedPlaneCount(u16),

    /// The element stream carries no decodable sample payload
    #[error("Missing image data: {0}")]
    MissingPixelData(String),

    /// Caller supplied buffer does not have the required size
    #[error("Target buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Declared image size does not fit in addressable memory
    #[error("Image too large: {frames} frames of {pixels_per_frame} pixels at {pixel_size} bytes each")]
    ImageTooLarge {
        frames: usize,
        pixels_per_frame: usize,
        pixel_size: usize,
    },

    /// Source buffer holds fewer bytes than the encoding requires
    #[error("Source buffer too short: need {needed} bytes, got {actual}")]
    SourceTooShort { needed: usize, actual: usize },
}

/// Top-level error returned by the image reader
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Element stream error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Geometry could not be assembled
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Pixel data could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Frame could not be rendered or written as an image file
    #[error("Preview error: {0}")]
    Preview(String),
}
