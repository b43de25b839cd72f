//! Preview integration tests.
//!
//! Tests verify:
//! - Scalar frames are window-levelled to 8-bit grey
//! - RGB frames keep their channels
//! - Frame selection in multi-frame images

use bytes::Bytes;
use image::ImageReader;
use std::io::Cursor;

use dicom_frame::format::dicom::tags;
use dicom_frame::image::preview::{encode_png, render_frame};
use dicom_frame::{DicomImageReader, ImageError};

use super::test_utils::{create_mr_slice, DicomBuilder};

fn open(builder: DicomBuilder) -> DicomImageReader {
    DicomImageReader::from_bytes(Bytes::from(builder.build()), "preview").unwrap()
}

#[test]
fn test_scalar_frame_is_windowed() {
    let reader = open(create_mr_slice());
    let image = render_frame(&reader, 0).unwrap();
    let gray = image.to_luma8();

    assert_eq!(gray.dimensions(), (3, 2));
    // Samples are 0, 1, 2, -1, -32768, 32767 as signed 16-bit
    assert_eq!(gray.get_pixel(1, 1).0[0], 0);
    assert_eq!(gray.get_pixel(2, 1).0[0], 255);
}

#[test]
fn test_rgb_frame_keeps_channels() {
    let builder = DicomBuilder::new()
        .with_image(1, 2, 1, 8, 3)
        .with_pixel_bytes(vec![255, 0, 0, 0, 0, 255]);
    let reader = open(builder);
    let rgb = render_frame(&reader, 0).unwrap().to_rgb8();

    assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
    assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 255]);
}

#[test]
fn test_second_frame_is_selected() {
    let builder = DicomBuilder::new()
        .with_image(1, 2, 2, 8, 1)
        .with_pixel_bytes(vec![0, 0, 10, 20]);
    let reader = open(builder);
    let gray = render_frame(&reader, 1).unwrap().to_luma8();

    assert_eq!(gray.get_pixel(0, 0).0[0], 0);
    assert_eq!(gray.get_pixel(1, 0).0[0], 255);
}

#[test]
fn test_frame_out_of_range() {
    let reader = open(create_mr_slice());
    let err = render_frame(&reader, 1).unwrap_err();
    assert!(matches!(err, ImageError::Preview(ref message) if message.contains("out of range")));
}

#[test]
fn test_png_decodes_back() {
    let builder = create_mr_slice().with_u16(tags::PIXEL_REPRESENTATION, 0);
    let reader = open(builder);
    let png = encode_png(&render_frame(&reader, 0).unwrap()).unwrap();

    let decoded = ImageReader::with_format(Cursor::new(&png[..]), image::ImageFormat::Png)
        .decode()
        .unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3, 2));
}
