use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let bitmap = decode_image(&buf).unwrap();
    assert_eq!(bitmap.size(), PixelSize::new(1, 1));
    assert_eq!(
        bitmap.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, SnapError::Decode(_)));
}

#[test]
fn png_roundtrip_of_opaque_bitmap_is_lossless() {
    let bm = Bitmap::filled(5, 4, Rgba8Premul::from_straight_rgba(12, 200, 99, 255));
    let png = bm.to_png().unwrap();
    let back = decode_image(&png).unwrap();
    assert_eq!(back, bm);
}

#[test]
fn from_premul_checks_length_and_pixel_bounds() {
    assert!(Bitmap::from_premul(2, 2, vec![0; 15]).is_err());
    let bm = Bitmap::from_premul(1, 1, vec![1, 2, 3, 4]).unwrap();
    assert_eq!(bm.pixel(0, 0), Some([1, 2, 3, 4]));
    assert_eq!(bm.pixel(1, 0), None);
}

#[test]
fn decode_svg_parse_ok_and_err() {
    let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
    parse_svg(ok).unwrap();

    let bad = br#"<svg"#;
    assert!(parse_svg(bad).is_err());
}
