use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn content_id_is_stable_and_roundtrips_as_hex() {
    let a = ContentId::of_bytes(b"snapframe");
    let b = ContentId::of_bytes(b"snapframe");
    assert_eq!(a, b);
    assert_ne!(a, ContentId::of_bytes(b"snapframf"));

    let s = a.to_string();
    assert_eq!(s.len(), 16);
    assert_eq!(s.parse::<ContentId>().unwrap(), a);

    let json = serde_json::to_string(&a).unwrap();
    assert_eq!(serde_json::from_str::<ContentId>(&json).unwrap(), a);
}

#[test]
fn data_url_roundtrip_preserves_bytes_and_id() {
    let src = ImageSource::from_bytes(png_bytes(3, 2));
    assert_eq!(src.mime(), "image/png");

    let url = src.to_data_url();
    assert!(url.starts_with("data:image/png;base64,"));
    let back = ImageSource::from_data_url(&url).unwrap();
    assert_eq!(back.id(), src.id());
    assert_eq!(back.bytes(), src.bytes());
}

#[test]
fn data_url_rejects_non_base64_forms() {
    assert!(ImageSource::from_data_url("http://example.com/a.png").is_err());
    assert!(ImageSource::from_data_url("data:image/png,abc").is_err());
    assert!(matches!(
        ImageSource::from_data_url("data:image/png;base64,@@@"),
        Err(SnapError::Decode(_))
    ));
}

#[test]
fn decode_yields_fresh_bitmap_each_time() {
    let src = ImageSource::from_bytes(png_bytes(4, 3));
    let mut a = src.decode().unwrap();
    let b = src.decode().unwrap();
    assert_eq!((a.width, a.height), (4, 3));
    a.rgba8_premul[0] = 0xff;
    assert_ne!(a.rgba8_premul, b.rgba8_premul);
}
