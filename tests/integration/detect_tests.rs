//! Detection integration tests.
//!
//! Tests verify:
//! - Files without the Part 10 preamble are recognized by the element heuristic
//! - Part 10 files fall back to the magic check
//! - `can_read_file` only accepts files that can actually be opened

use std::io::Cursor;

use dicom_frame::format::dicom::{Tag, MAX_SEQUENCE_DEPTH};
use dicom_frame::{detect_format, is_likely_dicom, DicomFormat, DicomImageReader};

use super::test_utils::{create_mr_slice, DicomBuilder, TestElement, JPEG_BASELINE};

// =============================================================================
// In-memory Detection
// =============================================================================

#[test]
fn test_preamble_less_file_is_detected_by_heuristic() {
    let data = create_mr_slice().build();

    assert!(is_likely_dicom(Cursor::new(&data)));
    assert_eq!(detect_format(&data), Some(DicomFormat::NoPreamble));
}

#[test]
fn test_part10_file_is_detected_by_magic() {
    let data = create_mr_slice().with_preamble(true).build();

    // The preamble starts with group 0x0000, which the heuristic rejects
    assert!(!is_likely_dicom(Cursor::new(&data)));
    assert_eq!(detect_format(&data), Some(DicomFormat::Part10));
}

#[test]
fn test_file_without_meta_group_is_detected() {
    let data = create_mr_slice().with_meta(false).build();
    assert_eq!(detect_format(&data), Some(DicomFormat::NoPreamble));
}

#[test]
fn test_truncated_identifying_element_is_rejected() {
    let mut data = create_mr_slice().build();
    // Keep the meta group and the header of the first group 8 element only
    let cut = data
        .windows(4)
        .position(|w| w == [0x08, 0x00, 0x60, 0x00])
        .unwrap();
    data.truncate(cut + 9);

    assert!(!is_likely_dicom(Cursor::new(&data)));
    assert_eq!(detect_format(&data), None);
}

#[test]
fn test_text_file_is_rejected() {
    let data = b"Patient notes, not an image".to_vec();
    assert_eq!(detect_format(&data), None);
}

#[test]
fn test_reader_detect_format_matches_free_function() {
    let data = create_mr_slice().with_preamble(true).build();
    assert_eq!(
        DicomImageReader::detect_format(&data),
        detect_format(&data)
    );
}

// =============================================================================
// File-based Detection
// =============================================================================

#[test]
fn test_can_read_preamble_less_file() {
    let file = create_mr_slice().write_temp();
    assert!(DicomImageReader::can_read_file(file.path()));
}

#[test]
fn test_can_read_part10_file() {
    let file = create_mr_slice().with_preamble(true).write_temp();
    assert!(DicomImageReader::can_read_file(file.path()));
}

#[test]
fn test_cannot_read_compressed_file() {
    // Detected as DICOM, but the transfer syntax is not handled
    let file = create_mr_slice()
        .with_preamble(true)
        .with_transfer_syntax_uid(JPEG_BASELINE)
        .write_temp();
    assert!(!DicomImageReader::can_read_file(file.path()));
}

#[test]
fn test_cannot_read_file_without_pixel_data() {
    let file = DicomBuilder::new().with_image(2, 2, 1, 8, 1).write_temp();
    assert!(!DicomImageReader::can_read_file(file.path()));
}

#[test]
fn test_cannot_read_oversized_image() {
    let file = DicomBuilder::new()
        .with_image(65535, 65535, 2_147_483_647, 32, 4)
        .with_pixel_bytes(vec![0; 16])
        .write_temp();
    assert!(!DicomImageReader::can_read_file(file.path()));
}

#[test]
fn test_cannot_read_deeply_nested_file() {
    let tag = Tag::new(0x0008, 0x1115);
    let mut nested = TestElement::sequence(tag, vec![vec![]]);
    for _ in 0..MAX_SEQUENCE_DEPTH {
        nested = TestElement::sequence(tag, vec![vec![nested]]);
    }

    let file = create_mr_slice().with_element(nested).write_temp();
    assert!(!DicomImageReader::can_read_file(file.path()));
}
