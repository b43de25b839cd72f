//! Reader integration tests.
//!
//! Tests verify:
//! - Geometry assembly for 3D and 4D images
//! - Decoding in every supported transfer syntax
//! - Color reordering for both planar configurations
//! - Error reporting for unsupported or malformed images

use bytes::Bytes;

use dicom_frame::format::dicom::tags;
use dicom_frame::{
    ComponentKind, DecodeError, DicomImageReader, GeometryError, ImageError, ParseError,
    PixelKind, TransferSyntax,
};

use super::test_utils::{
    create_mr_slice, words_le, DicomBuilder, Syntax, TestElement, TestValue,
};

fn open(builder: DicomBuilder) -> Result<DicomImageReader, ImageError> {
    DicomImageReader::from_bytes(Bytes::from(builder.build()), "test")
}

// =============================================================================
// 3D Geometry
// =============================================================================

#[test]
fn test_single_slice_geometry() {
    let reader = open(create_mr_slice()).unwrap();
    let geometry = reader.geometry();

    assert_eq!(geometry.dimension_count(), 3);
    assert_eq!(geometry.extents(), &[3, 2, 1]);
    assert_eq!(geometry.spacing(), &[0.75, 0.5, 2.0]);
    assert_eq!(geometry.origin(), &[-10.0, 20.0, 30.0]);
    assert_eq!(geometry.direction(0).unwrap(), &[1.0, 0.0, 0.0]);
    assert_eq!(geometry.direction(1).unwrap(), &[0.0, 1.0, 0.0]);
    assert_eq!(geometry.direction(2).unwrap(), &[0.0, 0.0, 1.0]);
    assert_eq!(reader.transfer_syntax(), TransferSyntax::ExplicitVrLittleEndian);
}

#[test]
fn test_rescale_is_reported() {
    let builder = create_mr_slice()
        .with_text(tags::RESCALE_SLOPE, b"DS", "2.5")
        .with_text(tags::RESCALE_INTERCEPT, b"DS", "-100");
    let reader = open(builder).unwrap();

    assert_eq!(reader.geometry().rescale_slope(), 2.5);
    assert_eq!(reader.geometry().rescale_intercept(), -100.0);
    assert_eq!(reader.geometry().rescale(40.0), 0.0);
}

#[test]
fn test_enhanced_functional_groups() {
    let shared = vec![
        TestElement::sequence(
            tags::PIXEL_MEASURES_SEQUENCE,
            vec![vec![
                TestElement::text(tags::PIXEL_SPACING, b"DS", "0.3\\0.4"),
                TestElement::text(tags::SLICE_THICKNESS, b"DS", "1.25"),
            ]],
        ),
        TestElement::sequence(
            tags::PLANE_POSITION_SEQUENCE,
            vec![vec![TestElement::text(
                tags::IMAGE_POSITION_PATIENT,
                b"DS",
                "1\\2\\3",
            )]],
        ),
        TestElement::sequence(
            tags::PLANE_ORIENTATION_SEQUENCE,
            vec![vec![TestElement::text(
                tags::IMAGE_ORIENTATION_PATIENT,
                b"DS",
                "0\\1\\0\\0\\0\\1",
            )]],
        ),
    ];
    let builder = DicomBuilder::new()
        .with_image(1, 2, 2, 8, 1)
        .with_element(TestElement::sequence(
            tags::SHARED_FUNCTIONAL_GROUPS,
            vec![shared],
        ))
        .with_pixel_bytes(vec![1, 2, 3, 4]);
    let reader = open(builder).unwrap();
    let geometry = reader.geometry();

    assert_eq!(geometry.extents(), &[2, 1, 2]);
    assert_eq!(geometry.spacing(), &[0.4, 0.3, 1.25]);
    assert_eq!(geometry.origin(), &[1.0, 2.0, 3.0]);
    assert_eq!(geometry.direction(0).unwrap(), &[0.0, 1.0, 0.0]);
    assert_eq!(geometry.direction(1).unwrap(), &[0.0, 0.0, 1.0]);
    assert_eq!(geometry.direction(2).unwrap(), &[1.0, 0.0, 0.0]);
}

// =============================================================================
// 4D Geometry
// =============================================================================

#[test]
fn test_multi_phase_is_4d() {
    let builder = DicomBuilder::new()
        .with_image(2, 3, 6, 16, 1)
        .with_sl(tags::PHASE_COUNT, 2)
        .with_pixel_words((0..36).collect());
    let reader = open(builder).unwrap();
    let geometry = reader.geometry();

    assert_eq!(geometry.dimension_count(), 4);
    assert_eq!(geometry.extents(), &[3, 2, 3]);
    assert_eq!(geometry.phase_count(), 2);
    assert_eq!(geometry.spacing().len(), 4);
    assert_eq!(geometry.spacing()[3], 1.0);
    assert_eq!(geometry.origin()[3], 0.0);
    assert_eq!(geometry.direction(0).unwrap(), &[1.0, 0.0, 0.0, 0.0]);
    assert_eq!(geometry.direction(3).unwrap(), &[0.0, 0.0, 0.0, 1.0]);
    assert_eq!(reader.pixel_buffer_len(), 36 * 2);
}

#[test]
fn test_partial_phase_is_truncated() {
    let builder = DicomBuilder::new()
        .with_image(2, 3, 5, 16, 1)
        .with_sl(tags::PHASE_COUNT, 2)
        .with_pixel_words((0..30).collect());
    let reader = open(builder).unwrap();

    assert_eq!(reader.geometry().extents(), &[3, 2, 2]);
    // Every stored frame is still decoded
    assert_eq!(reader.frame_count(), 5);
    assert_eq!(reader.pixel_buffer_len(), 30 * 2);
}

#[test]
fn test_single_phase_stays_3d() {
    let builder = DicomBuilder::new()
        .with_image(2, 3, 4, 8, 1)
        .with_sl(tags::PHASE_COUNT, 1)
        .with_pixel_bytes(vec![0; 24]);
    let reader = open(builder).unwrap();

    assert_eq!(reader.geometry().dimension_count(), 3);
    assert_eq!(reader.geometry().extents(), &[3, 2, 4]);
}

// =============================================================================
// Transfer Syntaxes
// =============================================================================

#[test]
fn test_explicit_little_endian_samples() {
    let reader = open(create_mr_slice()).unwrap();

    assert_eq!(reader.encoding().component(), ComponentKind::Int16);
    let words = words_le(&reader.read_to_vec().unwrap());
    assert_eq!(words, vec![0, 1, 2, 0xFFFF, 0x8000, 0x7FFF]);
}

#[test]
fn test_explicit_big_endian_samples_are_swapped() {
    let reader = open(create_mr_slice().with_syntax(Syntax::ExplicitBig)).unwrap();

    assert_eq!(reader.transfer_syntax(), TransferSyntax::ExplicitVrBigEndian);
    assert_eq!(reader.geometry().extents(), &[3, 2, 1]);
    let words = words_le(&reader.read_to_vec().unwrap());
    assert_eq!(words, vec![0, 1, 2, 0xFFFF, 0x8000, 0x7FFF]);
}

#[test]
fn test_implicit_little_endian_with_preamble() {
    let builder = create_mr_slice()
        .with_syntax(Syntax::ImplicitLittle)
        .with_preamble(true);
    let reader = open(builder).unwrap();

    assert!(reader.has_preamble());
    assert_eq!(reader.transfer_syntax(), TransferSyntax::ImplicitVrLittleEndian);
    assert_eq!(reader.geometry().spacing(), &[0.75, 0.5, 2.0]);
    let words = words_le(&reader.read_to_vec().unwrap());
    assert_eq!(words, vec![0, 1, 2, 0xFFFF, 0x8000, 0x7FFF]);
}

#[test]
fn test_compressed_transfer_syntax_is_rejected() {
    let builder = create_mr_slice().with_transfer_syntax_uid("1.2.840.10008.1.2.4.90");
    let err = open(builder).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Parse(ParseError::UnsupportedTransferSyntax(_))
    ));
}

// =============================================================================
// Color
// =============================================================================

#[test]
fn test_rgb_interleaved_round_trips() {
    let pixels: Vec<u8> = (0..12).collect();
    let builder = DicomBuilder::new()
        .with_image(2, 2, 1, 8, 3)
        .with_u16(tags::PLANAR_CONFIGURATION, 0)
        .with_pixel_bytes(pixels.clone());
    let reader = open(builder).unwrap();

    assert_eq!(reader.encoding().pixel(), PixelKind::Rgb);
    assert_eq!(reader.encoding().channels(), 3);
    assert_eq!(reader.read_to_vec().unwrap(), pixels);
}

#[test]
fn test_rgb_planar_frames_become_interleaved() {
    let native = vec![
        10, 11, 20, 21, 30, 31, // frame 0: R R G G B B
        40, 41, 50, 51, 60, 61, // frame 1
    ];
    let builder = DicomBuilder::new()
        .with_image(1, 2, 2, 8, 3)
        .with_u16(tags::PLANAR_CONFIGURATION, 1)
        .with_pixel_bytes(native);
    let reader = open(builder).unwrap();

    assert_eq!(
        reader.read_to_vec().unwrap(),
        vec![10, 20, 30, 11, 21, 31, 40, 50, 60, 41, 51, 61]
    );
}

#[test]
fn test_rgba16_big_endian() {
    let builder = DicomBuilder::new()
        .with_syntax(Syntax::ExplicitBig)
        .with_image(1, 1, 1, 16, 4)
        .with_pixel_words(vec![0x0102, 0x0304, 0x0506, 0x0708]);
    let reader = open(builder).unwrap();

    assert_eq!(reader.encoding().pixel(), PixelKind::Rgba);
    let words = words_le(&reader.read_to_vec().unwrap());
    assert_eq!(words, vec![0x0102, 0x0304, 0x0506, 0x0708]);
}

#[test]
fn test_signed_color_is_rejected_on_read() {
    let builder = DicomBuilder::new()
        .with_image(1, 1, 1, 16, 3)
        .with_u16(tags::PIXEL_REPRESENTATION, 1)
        .with_pixel_words(vec![1, 2, 3]);
    let reader = open(builder).unwrap();

    let err = reader.read_to_vec().unwrap_err();
    assert!(matches!(
        err,
        ImageError::Decode(DecodeError::UnsupportedColorComponentType(ComponentKind::Int16))
    ));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_float_pixel_data_opens_but_does_not_decode() {
    let floats: Vec<u8> = [0.5f32, 1.5].iter().flat_map(|v| v.to_le_bytes()).collect();
    let builder = DicomBuilder::new()
        .with_image(1, 2, 1, 32, 1)
        .with_element(TestElement {
            tag: tags::FLOAT_PIXEL_DATA,
            vr: *b"OF",
            value: TestValue::Raw(floats),
        });
    let reader = open(builder).unwrap();

    assert_eq!(reader.encoding().component(), ComponentKind::Float32);
    let err = reader.read_to_vec().unwrap_err();
    assert!(matches!(
        err,
        ImageError::Decode(DecodeError::UnsupportedComponentType(ref name)) if name == "float32"
    ));
}

#[test]
fn test_zero_rows() {
    let builder = DicomBuilder::new()
        .with_image(0, 3, 1, 8, 1)
        .with_pixel_bytes(vec![0; 2]);
    let err = open(builder).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Geometry(GeometryError::InvalidDimension { field: "rows", value: 0 })
    ));
}

#[test]
fn test_zero_orientation_is_rejected() {
    let builder = create_mr_slice().with_text(
        tags::IMAGE_ORIENTATION_PATIENT,
        b"DS",
        "0\\0\\0\\0\\0\\0",
    );
    let err = open(builder).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Geometry(GeometryError::DegenerateDirection { field: "slice direction" })
    ));
}

#[test]
fn test_parallel_orientation_is_rejected() {
    let builder = create_mr_slice().with_text(
        tags::IMAGE_ORIENTATION_PATIENT,
        b"DS",
        "1\\0\\0\\1\\0\\0",
    );
    let err = open(builder).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Geometry(GeometryError::DegenerateDirection { .. })
    ));
}

#[test]
fn test_missing_bits_allocated() {
    let builder = DicomBuilder::new()
        .with_u16(tags::ROWS, 1)
        .with_u16(tags::COLUMNS, 1)
        .with_pixel_bytes(vec![0, 0]);
    let err = open(builder).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Parse(ParseError::MissingElement { name: "BitsAllocated", .. })
    ));
}

#[test]
fn test_short_pixel_data() {
    let builder = DicomBuilder::new()
        .with_image(2, 2, 1, 16, 1)
        .with_pixel_words(vec![1, 2, 3]);
    let err = open(builder).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Decode(DecodeError::SourceTooShort { needed: 8, actual: 6 })
    ));
}

#[test]
fn test_oversized_image_is_rejected() {
    // Declared size overflows usize, the payload is only 16 bytes
    let builder = DicomBuilder::new()
        .with_image(65535, 65535, 2_147_483_647, 32, 4)
        .with_pixel_bytes(vec![0; 16]);
    let err = open(builder).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Decode(DecodeError::ImageTooLarge { frames: 2_147_483_647, .. })
    ));
}

#[test]
fn test_unsupported_bit_depth() {
    let builder = DicomBuilder::new()
        .with_image(1, 1, 1, 12, 1)
        .with_pixel_bytes(vec![0, 0]);
    let err = open(builder).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Decode(DecodeError::UnsupportedComponentType(_))
    ));
}

#[test]
fn test_open_from_disk() {
    let file = create_mr_slice().with_preamble(true).write_temp();
    let reader = DicomImageReader::open(file.path()).unwrap();

    assert_eq!(reader.identifier(), file.path().display().to_string());
    assert_eq!(reader.sample_count(), 6);
    assert!(!reader.can_write_file());
}
