use std::io::Cursor;

use super::*;
use crate::foundation::core::Size;

#[test]
fn library_is_grouped_by_category() {
    assert_eq!(stickers_by_category(StickerCategory::Emojis).count(), 12);
    assert_eq!(stickers_by_category(StickerCategory::Text).count(), 6);
    assert_eq!(stickers_by_category(StickerCategory::Shapes).count(), 0);
    assert_eq!(sticker_library().len(), 18);
    assert_eq!(StickerCategory::ALL.map(|c| c.label()), ["Emojis", "Shapes", "Text"]);
}

#[test]
fn library_sticker_overlay_uses_glyph_art() {
    let fire = library_sticker("fire").unwrap();
    match fire.overlay_kind() {
        OverlayKind::UserSticker {
            art: StickerArt::Glyph(g),
            name,
            font_px,
        } => {
            assert_eq!(g, "🔥");
            assert_eq!(name, "fire");
            assert_eq!(font_px, LIBRARY_STICKER_FONT_PX);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(library_sticker("nope").is_none());
}

#[test]
fn raster_and_svg_bytes_become_raster_art() {
    let img = image::RgbaImage::from_pixel(6, 4, image::Rgba([0, 0, 255, 255]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let kind = sticker_from_bytes("dot.png", &png).unwrap();
    assert_eq!(kind.nominal_size(), Size::new(6.0, 4.0));

    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="red"/></svg>"#;
    let kind = sticker_from_bytes("square.svg", svg).unwrap();
    assert_eq!(kind.nominal_size(), Size::new(512.0, 512.0));
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    assert!(matches!(
        sticker_from_bytes("x", b"nope"),
        Err(SnapError::Decode(_))
    ));
}
