//! DICOM element stream parsing.
//!
//! This module turns an in-memory file into a [`DicomFile`]: the file meta
//! group plus the main data set, both as tag-ordered maps of elements.
//!
//! # Element Layouts
//!
//! ## Explicit VR, short length (8-byte header)
//! ```text
//! Bytes 0-1: Group
//! Bytes 2-3: Element
//! Bytes 4-5: VR code (two ASCII characters)
//! Bytes 6-7: Value length (u16)
//! ```
//!
//! ## Explicit VR, long length (12-byte header)
//! ```text
//! Bytes 0-1:  Group
//! Bytes 2-3:  Element
//! Bytes 4-5:  VR code (OB, OW, SQ, UN, UT, ...)
//! Bytes 6-7:  Reserved (0)
//! Bytes 8-11: Value length (u32, 0xFFFFFFFF = undefined)
//! ```
//!
//! ## Implicit VR (8-byte header)
//! ```text
//! Bytes 0-1: Group
//! Bytes 2-3: Element
//! Bytes 4-7: Value length (u32)
//! ```
//!
//! The file meta group is always explicit VR little endian. The rest of the
//! file follows the transfer syntax named in (0002,0010).

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::format::detect::{has_dicom_magic, DICOM_MAGIC, PREAMBLE_LENGTH};
use crate::io::{read_u16_le, ByteCursor, ByteOrder};

use super::dictionary::{tags, Tag, Vr, FILE_META_GROUP};
use super::values::{DataSet, Element, Value};

// =============================================================================
// Constants
// =============================================================================

/// Length value marking an element or item delimited by a marker instead.
pub const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";

// =============================================================================
// TransferSyntax
// =============================================================================

/// Uncompressed transfer syntaxes understood by the parser.
///
/// Compressed (encapsulated) and deflated syntaxes are rejected: decoding
/// them requires a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSyntax {
    ImplicitVrLittleEndian,
    ExplicitVrLittleEndian,
    ExplicitVrBigEndian,
}

impl TransferSyntax {
    /// Resolve a transfer syntax UID.
    pub fn from_uid(uid: &str) -> Result<Self, ParseError> {
        match uid {
            IMPLICIT_VR_LITTLE_ENDIAN => Ok(TransferSyntax::ImplicitVrLittleEndian),
            EXPLICIT_VR_LITTLE_ENDIAN => Ok(TransferSyntax::ExplicitVrLittleEndian),
            EXPLICIT_VR_BIG_ENDIAN => Ok(TransferSyntax::ExplicitVrBigEndian),
            other => Err(ParseError::UnsupportedTransferSyntax(other.to_string())),
        }
    }

    pub const fn uid(self) -> &'static str {
        match self {
            TransferSyntax::ImplicitVrLittleEndian => IMPLICIT_VR_LITTLE_ENDIAN,
            TransferSyntax::ExplicitVrLittleEndian => EXPLICIT_VR_LITTLE_ENDIAN,
            TransferSyntax::ExplicitVrBigEndian => EXPLICIT_VR_BIG_ENDIAN,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TransferSyntax::ImplicitVrLittleEndian => "Implicit VR Little Endian",
            TransferSyntax::ExplicitVrLittleEndian => "Explicit VR Little Endian",
            TransferSyntax::ExplicitVrBigEndian => "Explicit VR Big Endian",
        }
    }

    fn encoding(self) -> Encoding {
        match self {
            TransferSyntax::ImplicitVrLittleEndian => Encoding {
                explicit_vr: false,
                byte_order: ByteOrder::LittleEndian,
            },
            TransferSyntax::ExplicitVrLittleEndian => Encoding {
                explicit_vr: true,
                byte_order: ByteOrder::LittleEndian,
            },
            TransferSyntax::ExplicitVrBigEndian => Encoding {
                explicit_vr: true,
                byte_order: ByteOrder::BigEndian,
            },
        }
    }
}

/// Header layout and byte order used for a run of elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Encoding {
    explicit_vr: bool,
    byte_order: ByteOrder,
}

const META_ENCODING: Encoding = Encoding {
    explicit_vr: true,
    byte_order: ByteOrder::LittleEndian,
};

// =============================================================================
// DicomFile
// =============================================================================

/// A parsed DICOM file.
#[derive(Debug, Clone)]
pub struct DicomFile {
    /// Whether the file started with the 128-byte preamble and magic
    pub has_preamble: bool,

    /// Transfer syntax the main data set was decoded with
    pub transfer_syntax: TransferSyntax,

    /// File meta information (group 0002), empty if absent
    pub meta: DataSet,

    /// Main data set
    pub dataset: DataSet,
}

impl DicomFile {
    /// Parse a complete file held in memory.
    ///
    /// # Errors
    /// - `UnsupportedTransferSyntax` for compressed or unknown syntaxes, and for
    ///   encapsulated pixel data
    /// - `UnexpectedEof` if an element runs past the end of the buffer
    /// - `InvalidVr` for undefined VR codes in explicit VR streams
    /// - `MalformedSequence` for broken item/sequence nesting, or sequences
    ///   nested deeper than [`MAX_SEQUENCE_DEPTH`]
    pub fn parse(data: Bytes) -> Result<Self, ParseError> {
        let mut cursor = ByteCursor::new(data);

        let has_preamble = cursor
            .peek(PREAMBLE_LENGTH + DICOM_MAGIC.len())
            .is_some_and(has_dicom_magic);
        if has_preamble {
            cursor.skip(PREAMBLE_LENGTH + DICOM_MAGIC.len())?;
        }

        let meta = parse_meta_group(&mut cursor)?;

        let transfer_syntax = match meta.get_string(tags::TRANSFER_SYNTAX_UID) {
            Some(uid) => TransferSyntax::from_uid(&uid)?,
            None => sniff_transfer_syntax(&cursor),
        };
        debug!(
            "Parsing data set as {} (preamble: {}, meta elements: {})",
            transfer_syntax.name(),
            has_preamble,
            meta.len()
        );

        let dataset = parse_elements(&mut cursor, transfer_syntax.encoding(), Until::End, 0)?;

        Ok(DicomFile {
            has_preamble,
            transfer_syntax,
            meta,
            dataset,
        })
    }
}

/// Read the contiguous run of group 0002 elements at the cursor.
fn parse_meta_group(cursor: &mut ByteCursor) -> Result<DataSet, ParseError> {
    let mut meta = DataSet::new(ByteOrder::LittleEndian);
    while let Some(group) = cursor.peek(2).map(read_u16_le) {
        if group != FILE_META_GROUP {
            break;
        }
        let element = read_element(cursor, META_ENCODING)?;
        meta.insert(element);
    }
    Ok(meta)
}

/// Guess the encoding of a data set that has no meta information.
///
/// An explicit VR stream has a valid VR code right after the first tag.
fn sniff_transfer_syntax(cursor: &ByteCursor) -> TransferSyntax {
    let explicit = cursor
        .peek(6)
        .and_then(|header| Vr::from_bytes([header[4], header[5]]))
        .is_some();
    if explicit {
        TransferSyntax::ExplicitVrLittleEndian
    } else {
        TransferSyntax::ImplicitVrLittleEndian
    }
}

// =============================================================================
// Element Parsing
// =============================================================================

/// Maximum nesting of sequences within sequences.
pub const MAX_SEQUENCE_DEPTH: usize = 32;

/// Where a run of elements ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Until {
    /// End of the buffer
    End,
    /// An item delimitation marker
    ItemDelimiter,
}

/// Header of a single element, before its value is read.
#[derive(Debug, Clone, Copy)]
struct ElementHeader {
    tag: Tag,
    vr: Option<Vr>,
    length: u32,
}

fn read_header(cursor: &mut ByteCursor, encoding: Encoding) -> Result<ElementHeader, ParseError> {
    let offset = cursor.position();
    let order = encoding.byte_order;
    let tag = Tag::new(cursor.read_u16(order)?, cursor.read_u16(order)?);

    if tag.is_delimiter() {
        let length = cursor.read_u32(order)?;
        return Ok(ElementHeader {
            tag,
            vr: None,
            length,
        });
    }

    if !encoding.explicit_vr {
        let length = cursor.read_u32(order)?;
        return Ok(ElementHeader {
            tag,
            vr: Some(Vr::implicit_for(tag)),
            length,
        });
    }

    let code = cursor.take(2)?;
    let code = [code[0], code[1]];
    let vr = Vr::from_bytes(code).ok_or(ParseError::InvalidVr { tag, code, offset })?;

    let length = if vr.has_long_length() {
        cursor.skip(2)?;
        cursor.read_u32(order)?
    } else {
        u32::from(cursor.read_u16(order)?)
    };

    Ok(ElementHeader {
        tag,
        vr: Some(vr),
        length,
    })
}

fn read_element(cursor: &mut ByteCursor, encoding: Encoding) -> Result<Element, ParseError> {
    let offset = cursor.position();
    let header = read_header(cursor, encoding)?;
    element_from_header(cursor, encoding, header, offset, 0)
}

/// Depth of the items of a sequence found at `depth`.
fn nested_depth(depth: usize, tag: Tag, offset: usize) -> Result<usize, ParseError> {
    if depth >= MAX_SEQUENCE_DEPTH {
        return Err(ParseError::MalformedSequence {
            offset,
            message: format!(
                "sequence {} nested deeper than {} levels",
                tag, MAX_SEQUENCE_DEPTH
            ),
        });
    }
    Ok(depth + 1)
}

fn element_from_header(
    cursor: &mut ByteCursor,
    encoding: Encoding,
    header: ElementHeader,
    offset: usize,
    depth: usize,
) -> Result<Element, ParseError> {
    let ElementHeader { tag, vr, length } = header;
    let vr = vr.ok_or_else(|| ParseError::MalformedSequence {
        offset,
        message: format!("unexpected delimiter {} outside a sequence", tag),
    })?;

    trace!("Element {} {:?} length {} at offset {}", tag, vr, length, offset);

    if length == UNDEFINED_LENGTH {
        if tag == tags::PIXEL_DATA {
            return Err(ParseError::UnsupportedTransferSyntax(
                "encapsulated pixel data".to_string(),
            ));
        }
        if vr == Vr::SQ || vr == Vr::UN {
            let depth = nested_depth(depth, tag, offset)?;
            let items = parse_undefined_sequence(cursor, encoding, depth)?;
            return Ok(Element {
                tag,
                vr: Vr::SQ,
                value: Value::Sequence(items),
            });
        }
        return Err(ParseError::MalformedSequence {
            offset,
            message: format!("undefined length on non-sequence element {} ({:?})", tag, vr),
        });
    }

    let bytes = cursor.take(length as usize)?;
    let value = if vr == Vr::SQ {
        let depth = nested_depth(depth, tag, offset)?;
        let mut inner = ByteCursor::new(bytes);
        Value::Sequence(parse_defined_sequence(&mut inner, encoding, depth)?)
    } else {
        Value::Bytes(bytes)
    };

    Ok(Element { tag, vr, value })
}

/// Parse elements until the buffer ends or an item delimiter is reached.
fn parse_elements(
    cursor: &mut ByteCursor,
    encoding: Encoding,
    until: Until,
    depth: usize,
) -> Result<DataSet, ParseError> {
    let mut dataset = DataSet::new(encoding.byte_order);

    loop {
        if cursor.is_empty() {
            if until == Until::ItemDelimiter {
                return Err(ParseError::MalformedSequence {
                    offset: cursor.position(),
                    message: "missing item delimiter".to_string(),
                });
            }
            return Ok(dataset);
        }

        let offset = cursor.position();
        let header = read_header(cursor, encoding)?;
        if header.tag == tags::ITEM_DELIMITATION {
            if until == Until::ItemDelimiter {
                return Ok(dataset);
            }
            return Err(ParseError::MalformedSequence {
                offset,
                message: "item delimiter outside an item".to_string(),
            });
        }

        let element = element_from_header(cursor, encoding, header, offset, depth)?;
        dataset.insert(element);
    }
}

/// Parse one item, given its already-read header length.
fn parse_item(
    cursor: &mut ByteCursor,
    encoding: Encoding,
    length: u32,
    depth: usize,
) -> Result<DataSet, ParseError> {
    if length == UNDEFINED_LENGTH {
        parse_elements(cursor, encoding, Until::ItemDelimiter, depth)
    } else {
        let mut inner = ByteCursor::new(cursor.take(length as usize)?);
        parse_elements(&mut inner, encoding, Until::End, depth)
    }
}

/// Parse the items of a sequence whose value length is known.
fn parse_defined_sequence(
    cursor: &mut ByteCursor,
    encoding: Encoding,
    depth: usize,
) -> Result<Vec<DataSet>, ParseError> {
    let mut items = Vec::new();
    while !cursor.is_empty() {
        let offset = cursor.position();
        let header = read_header(cursor, encoding)?;
        if header.tag != tags::ITEM {
            return Err(ParseError::MalformedSequence {
                offset,
                message: format!("expected item, found {}", header.tag),
            });
        }
        items.push(parse_item(cursor, encoding, header.length, depth)?);
    }
    Ok(items)
}

/// Parse the items of a sequence terminated by a sequence delimiter.
fn parse_undefined_sequence(
    cursor: &mut ByteCursor,
    encoding: Encoding,
    depth: usize,
) -> Result<Vec<DataSet>, ParseError> {
    let mut items = Vec::new();
    loop {
        let offset = cursor.position();
        let header = read_header(cursor, encoding)?;
        match header.tag {
            tags::ITEM => items.push(parse_item(cursor, encoding, header.length, depth)?),
            tags::SEQUENCE_DELIMITATION => return Ok(items),
            other => {
                return Err(ParseError::MalformedSequence {
                    offset,
                    message: format!("expected item or sequence delimiter, found {}", other),
                })
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
