//! Test utilities for integration tests.
//!
//! This module provides a builder for synthetic DICOM files in each of the
//! supported transfer syntaxes, with or without the Part 10 preamble.

use std::io::Write;

use tempfile::NamedTempFile;

use dicom_frame::format::dicom::{tags, Tag};

// =============================================================================
// Transfer Syntaxes
// =============================================================================

pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
pub const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";

pub const MODALITY: Tag = Tag::new(0x0008, 0x0060);

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    ImplicitLittle,
    ExplicitLittle,
    ExplicitBig,
}

impl Syntax {
    fn uid(self) -> &'static str {
        match self {
            Syntax::ImplicitLittle => IMPLICIT_VR_LITTLE_ENDIAN,
            Syntax::ExplicitLittle => EXPLICIT_VR_LITTLE_ENDIAN,
            Syntax::ExplicitBig => EXPLICIT_VR_BIG_ENDIAN,
        }
    }

    fn big_endian(self) -> bool {
        self == Syntax::ExplicitBig
    }

    fn explicit(self) -> bool {
        self != Syntax::ImplicitLittle
    }
}

// =============================================================================
// Element Values
// =============================================================================

#[derive(Clone)]
pub enum TestValue {
    Text(String),
    U16(Vec<u16>),
    I32(Vec<i32>),
    Raw(Vec<u8>),
    Words(Vec<u16>),
    Sequence(Vec<Vec<TestElement>>),
}

#[derive(Clone)]
pub struct TestElement {
    pub tag: Tag,
    pub vr: [u8; 2],
    pub value: TestValue,
}

impl TestElement {
    pub fn text(tag: Tag, vr: &[u8; 2], text: &str) -> Self {
        Self {
            tag,
            vr: *vr,
            value: TestValue::Text(text.to_string()),
        }
    }

    pub fn sequence(tag: Tag, items: Vec<Vec<TestElement>>) -> Self {
        Self {
            tag,
            vr: *b"SQ",
            value: TestValue::Sequence(items),
        }
    }
}

fn has_long_length(vr: &[u8; 2]) -> bool {
    matches!(
        vr,
        b"OB" | b"OD" | b"OF" | b"OL" | b"OV" | b"OW" | b"SQ" | b"SV" | b"UC" | b"UN" | b"UR"
            | b"UT" | b"UV"
    )
}

// =============================================================================
// DICOM File Builder
// =============================================================================

/// Builder for creating test DICOM files.
pub struct DicomBuilder {
    syntax: Syntax,
    transfer_syntax_uid: Option<String>,
    preamble: bool,
    meta: bool,
    elements: Vec<TestElement>,
}

impl DicomBuilder {
    pub fn new() -> Self {
        Self {
            syntax: Syntax::ExplicitLittle,
            transfer_syntax_uid: None,
            preamble: false,
            meta: true,
            elements: vec![TestElement::text(MODALITY, b"CS", "MR")],
        }
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Announce a transfer syntax UID without changing how elements are
    /// written.
    pub fn with_transfer_syntax_uid(mut self, uid: &str) -> Self {
        self.transfer_syntax_uid = Some(uid.to_string());
        self
    }

    pub fn with_preamble(mut self, preamble: bool) -> Self {
        self.preamble = preamble;
        self
    }

    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_element(mut self, element: TestElement) -> Self {
        self.elements.retain(|e| e.tag != element.tag);
        self.elements.push(element);
        self
    }

    pub fn with_u16(self, tag: Tag, value: u16) -> Self {
        self.with_element(TestElement {
            tag,
            vr: *b"US",
            value: TestValue::U16(vec![value]),
        })
    }

    pub fn with_text(self, tag: Tag, vr: &[u8; 2], text: &str) -> Self {
        self.with_element(TestElement::text(tag, vr, text))
    }

    pub fn with_sl(self, tag: Tag, value: i32) -> Self {
        self.with_element(TestElement {
            tag,
            vr: *b"SL",
            value: TestValue::I32(vec![value]),
        })
    }

    /// Image pixel module for `rows` x `columns` x `frames`.
    pub fn with_image(
        self,
        rows: u16,
        columns: u16,
        frames: u32,
        bits_allocated: u16,
        samples_per_pixel: u16,
    ) -> Self {
        self.with_u16(tags::SAMPLES_PER_PIXEL, samples_per_pixel)
            .with_u16(tags::ROWS, rows)
            .with_u16(tags::COLUMNS, columns)
            .with_u16(tags::BITS_ALLOCATED, bits_allocated)
            .with_text(tags::NUMBER_OF_FRAMES, b"IS", &frames.to_string())
    }

    pub fn with_pixel_bytes(self, data: Vec<u8>) -> Self {
        self.with_element(TestElement {
            tag: tags::PIXEL_DATA,
            vr: *b"OB",
            value: TestValue::Raw(data),
        })
    }

    /// 16-bit pixel data, written in the data set's byte order.
    pub fn with_pixel_words(self, data: Vec<u16>) -> Self {
        self.with_element(TestElement {
            tag: tags::PIXEL_DATA,
            vr: *b"OW",
            value: TestValue::Words(data),
        })
    }

    /// Build the file data.
    pub fn build(mut self) -> Vec<u8> {
        let mut data = Vec::new();

        if self.preamble {
            data.extend_from_slice(&[0u8; 128]);
            data.extend_from_slice(b"DICM");
        }

        if self.meta {
            let uid = self
                .transfer_syntax_uid
                .clone()
                .unwrap_or_else(|| self.syntax.uid().to_string());
            let mut group = Vec::new();
            encode_element(
                &mut group,
                &TestElement::text(tags::TRANSFER_SYNTAX_UID, b"UI", &uid),
                Syntax::ExplicitLittle,
            );

            let length = TestElement {
                tag: tags::FILE_META_GROUP_LENGTH,
                vr: *b"UL",
                value: TestValue::Raw((group.len() as u32).to_le_bytes().to_vec()),
            };
            encode_element(&mut data, &length, Syntax::ExplicitLittle);
            data.extend(group);
        }

        self.elements.sort_by_key(|e| e.tag);
        for element in &self.elements {
            encode_element(&mut data, element, self.syntax);
        }

        data
    }

    /// Build the file and write it to a temporary file.
    pub fn write_temp(self) -> NamedTempFile {
        let data = self.build();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();
        file
    }
}

impl Default for DicomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_u16(out: &mut Vec<u8>, value: u16, big: bool) {
    if big {
        out.extend(value.to_be_bytes());
    } else {
        out.extend(value.to_le_bytes());
    }
}

fn write_u32(out: &mut Vec<u8>, value: u32, big: bool) {
    if big {
        out.extend(value.to_be_bytes());
    } else {
        out.extend(value.to_le_bytes());
    }
}

fn encode_value(value: &TestValue, vr: &[u8; 2], syntax: Syntax) -> Vec<u8> {
    let big = syntax.big_endian();
    let mut out = Vec::new();
    match value {
        TestValue::Text(text) => {
            out.extend_from_slice(text.as_bytes());
            if out.len() % 2 == 1 {
                out.push(if vr == b"UI" { 0 } else { b' ' });
            }
        }
        TestValue::U16(values) | TestValue::Words(values) => {
            for &v in values {
                write_u16(&mut out, v, big);
            }
        }
        TestValue::I32(values) => {
            for &v in values {
                write_u32(&mut out, v as u32, big);
            }
        }
        TestValue::Raw(bytes) => out.extend_from_slice(bytes),
        TestValue::Sequence(_) => {}
    }
    out
}

fn encode_element(out: &mut Vec<u8>, element: &TestElement, syntax: Syntax) {
    let big = syntax.big_endian();
    write_u16(out, element.tag.group, big);
    write_u16(out, element.tag.element, big);

    if let TestValue::Sequence(items) = &element.value {
        if syntax.explicit() {
            out.extend_from_slice(b"SQ");
            out.extend_from_slice(&[0, 0]);
        }
        write_u32(out, 0xFFFF_FFFF, big);
        for item in items {
            write_u16(out, 0xFFFE, big);
            write_u16(out, 0xE000, big);
            write_u32(out, 0xFFFF_FFFF, big);
            for nested in item {
                encode_element(out, nested, syntax);
            }
            write_u16(out, 0xFFFE, big);
            write_u16(out, 0xE00D, big);
            write_u32(out, 0, big);
        }
        write_u16(out, 0xFFFE, big);
        write_u16(out, 0xE0DD, big);
        write_u32(out, 0, big);
        return;
    }

    let value = encode_value(&element.value, &element.vr, syntax);
    if syntax.explicit() {
        out.extend_from_slice(&element.vr);
        if has_long_length(&element.vr) {
            out.extend_from_slice(&[0, 0]);
            write_u32(out, value.len() as u32, big);
        } else {
            write_u16(out, value.len() as u16, big);
        }
    } else {
        write_u32(out, value.len() as u32, big);
    }
    out.extend(value);
}

// =============================================================================
// Ready-made Images
// =============================================================================

/// Single-frame 16-bit signed MR slice, 3 columns by 2 rows.
pub fn create_mr_slice() -> DicomBuilder {
    DicomBuilder::new()
        .with_image(2, 3, 1, 16, 1)
        .with_u16(tags::PIXEL_REPRESENTATION, 1)
        .with_text(tags::PIXEL_SPACING, b"DS", "0.5\\0.75")
        .with_text(tags::SLICE_THICKNESS, b"DS", "2")
        .with_text(tags::IMAGE_POSITION_PATIENT, b"DS", "-10\\20\\30")
        .with_text(tags::IMAGE_ORIENTATION_PATIENT, b"DS", "1\\0\\0\\0\\1\\0")
        .with_pixel_words(vec![0, 1, 2, 0xFFFF, 0x8000, 0x7FFF])
}

/// Read a little-endian u16 buffer.
pub fn words_le(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect()
}
