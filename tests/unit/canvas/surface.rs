use std::io::Cursor;

use super::*;
use crate::canvas::overlay::StickerArt;
use crate::foundation::math::approx_eq;

fn png(w: u32, h: u32, rgba: [u8; 4]) -> ImageSource {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSource::from_bytes(buf)
}

fn ready_surface() -> CompositionSurface {
    let mut s = CompositionSurface::new(Viewport::new(800.0, 800.0), SurfaceOpts::default());
    assert_eq!(s.load(png(1000, 500, [120, 80, 40, 255])).unwrap(), Applied::Applied);
    s
}

fn auto(emoji: &str) -> OverlayKind {
    OverlayKind::AutoDecoration {
        emoji: emoji.into(),
        font_px: 48.0,
    }
}

fn glyph(text: &str) -> OverlayKind {
    OverlayKind::UserSticker {
        art: StickerArt::Glyph(text.into()),
        name: text.into(),
        font_px: 60.0,
    }
}

#[test]
fn load_fits_and_centers_background() {
    let s = ready_surface();
    assert_eq!(s.state(), SurfaceState::Ready);
    assert_eq!(s.intrinsic_size(), Some(PixelSize::new(1000, 500)));
    let fit = s.fit().unwrap();
    assert!(approx_eq(fit.scale, 0.76, 1e-9));
    let rect = s.image_rect().unwrap();
    assert!(approx_eq(rect.x0, 20.0, 1e-9) && approx_eq(rect.y0, 210.0, 1e-9));
    assert_eq!(s.current_filter(), "original");
    assert!(!s.is_filtered());
}

#[test]
fn oversized_margin_factor_is_capped() {
    let opts = SurfaceOpts {
        margin_factor: 0.99,
        ..SurfaceOpts::default()
    };
    let mut s = CompositionSurface::new(Viewport::new(800.0, 800.0), opts);
    assert_eq!(s.opts().margin_factor, DEFAULT_MARGIN_FACTOR);
    s.load(png(1000, 500, [1, 2, 3, 255])).unwrap();
    let rect = s.image_rect().unwrap();
    assert!(rect.width() <= 800.0 * 0.96 && rect.height() <= 800.0 * 0.96);

    for bad in [f64::NAN, 0.0, -0.5] {
        let opts = SurfaceOpts {
            margin_factor: bad,
            ..SurfaceOpts::default()
        };
        let s = CompositionSurface::new(Viewport::new(10.0, 10.0), opts);
        assert_eq!(s.opts().margin_factor, DEFAULT_MARGIN_FACTOR);
    }
    let small = SurfaceOpts {
        margin_factor: 0.5,
        ..SurfaceOpts::default()
    };
    assert_eq!(small.sanitized().margin_factor, 0.5);
}

#[test]
fn decode_failure_leaves_surface_empty() {
    let mut s = CompositionSurface::new(Viewport::new(400.0, 400.0), SurfaceOpts::default());
    let err = s
        .load(ImageSource::from_bytes(b"broken".to_vec()))
        .unwrap_err();
    assert!(matches!(err, SnapError::Decode(_)));
    assert!(err.is_recoverable());
    assert_eq!(s.state(), SurfaceState::Empty);
    assert!(s.source().is_none());
}

#[test]
fn newer_load_supersedes_older() {
    let mut s = CompositionSurface::new(Viewport::new(400.0, 400.0), SurfaceOpts::default());
    let first = s.begin_load(png(10, 10, [255, 0, 0, 255]));
    let second = s.begin_load(png(20, 10, [0, 255, 0, 255]));

    let late = first.source().decode();
    assert_eq!(s.complete_load(first, late).unwrap(), Applied::Discarded);
    assert_eq!(s.state(), SurfaceState::Loading);

    let decoded = second.source().decode();
    assert_eq!(s.complete_load(second, decoded).unwrap(), Applied::Applied);
    assert_eq!(s.intrinsic_size(), Some(PixelSize::new(20, 10)));
}

#[test]
fn results_after_dispose_are_discarded() {
    let mut s = CompositionSurface::new(Viewport::new(400.0, 400.0), SurfaceOpts::default());
    let ticket = s.begin_load(png(10, 10, [255, 0, 0, 255]));
    s.dispose();
    let decoded = ticket.source().decode();
    assert_eq!(s.complete_load(ticket, decoded).unwrap(), Applied::Discarded);
    assert_eq!(s.state(), SurfaceState::Disposed);
    assert!(s.add_overlay(glyph("x"), OverlayTransform::at(Point::ORIGIN)).is_err());
    assert!(!s.resize(Viewport::new(10.0, 10.0)));
}

#[test]
fn only_latest_filter_request_applies() {
    let mut s = ready_surface();
    let a = s.request_filter("clarendon").unwrap();
    let b = s.request_filter("grayscale").unwrap();
    let rebuilt_a = apply_filter(a.source(), a.filter_id());
    assert_eq!(s.complete_filter(a, rebuilt_a).unwrap(), Applied::Discarded);
    let rebuilt_b = apply_filter(b.source(), b.filter_id());
    assert_eq!(s.complete_filter(b, rebuilt_b).unwrap(), Applied::Applied);
    assert_eq!(s.current_filter(), "grayscale");
    assert!(s.is_filtered());
}

#[test]
fn filter_rebuild_never_compounds() {
    let mut s = ready_surface();
    s.set_filter("clarendon").unwrap();
    let once = s.background().unwrap().bitmap.clone();
    s.set_filter("vintage").unwrap();
    s.set_filter("clarendon").unwrap();
    assert_eq!(*s.background().unwrap().bitmap, *once);
    // Intrinsic size is untouched by filters.
    assert_eq!(s.intrinsic_size(), Some(PixelSize::new(1000, 500)));
}

#[test]
fn failed_filter_keeps_background() {
    let mut s = ready_surface();
    let before = s.background().unwrap().bitmap.clone();
    let t = s.request_filter("juno").unwrap();
    assert!(s.complete_filter(t, Err(SnapError::decode("boom"))).is_err());
    assert_eq!(*s.background().unwrap().bitmap, *before);
    assert_eq!(s.current_filter(), "original");
}

#[test]
fn filter_without_image_is_rejected() {
    let mut s = CompositionSurface::new(Viewport::default(), SurfaceOpts::default());
    assert!(matches!(s.set_filter("juno"), Err(SnapError::Validation(_))));
}

#[test]
fn resize_keeps_overlays_and_their_relative_position() {
    let mut s = ready_surface();
    let sticker = s
        .add_overlay(glyph("🔥"), OverlayTransform::at(Point::new(400.0, 400.0)))
        .unwrap();
    let deco = s
        .add_overlay(auto("✨"), OverlayTransform::at(Point::new(100.0, 300.0)))
        .unwrap();

    assert!(s.resize(Viewport::new(400.0, 400.0)));
    assert_eq!(s.overlays().len(), 2);

    let rect = s.image_rect().unwrap();
    let o = s.overlay(sticker).unwrap();
    assert!(approx_eq(o.transform.center.x, rect.center().x, 1e-9));
    assert!(approx_eq(o.transform.center.y, rect.center().y, 1e-9));
    assert!(approx_eq(o.transform.scale, 0.5, 1e-9));

    let d = s.overlay(deco).unwrap().transform.center;
    assert!(d.x >= rect.x0 + 24.0 - 1e-9 && d.x <= rect.x1 - 24.0 + 1e-9);
    assert!(d.y >= rect.y0 + 24.0 - 1e-9 && d.y <= rect.y1 - 24.0 + 1e-9);
}

#[test]
fn degenerate_resize_is_ignored() {
    let mut s = ready_surface();
    let fit = s.fit();
    assert!(!s.resize(Viewport::new(0.0, 300.0)));
    assert_eq!(s.fit(), fit);
    assert_eq!(s.viewport(), Viewport::new(800.0, 800.0));
}

#[test]
fn auto_decorations_are_clamped_on_insert() {
    let mut s = ready_surface();
    let id = s
        .add_overlay(auto("🔥"), OverlayTransform::at(Point::new(0.0, 0.0)))
        .unwrap();
    let rect = s.image_rect().unwrap();
    let c = s.overlay(id).unwrap().transform.center;
    assert!(approx_eq(c.x, rect.x0 + 24.0, 1e-9));
    assert!(approx_eq(c.y, rect.y0 + 24.0, 1e-9));

    // User stickers go where the user puts them.
    let free = s
        .add_overlay(glyph("x"), OverlayTransform::at(Point::new(1.0, 1.0)))
        .unwrap();
    assert_eq!(s.overlay(free).unwrap().transform.center, Point::new(1.0, 1.0));
}

#[test]
fn selection_affordance_and_keyboard_delete() {
    let mut s = ready_surface();
    let a = s
        .add_overlay(glyph("🔥"), OverlayTransform::at(Point::new(300.0, 300.0)))
        .unwrap();
    let b = s
        .add_overlay(glyph("✨"), OverlayTransform::at(Point::new(500.0, 500.0)))
        .unwrap();

    assert_eq!(s.delete_affordance(), None);
    assert!(s.select(a));
    let anchor = s.delete_affordance().unwrap();
    let bbox = s.overlay(a).unwrap().bounding_box();
    assert_eq!(anchor, Point::new(bbox.x1, bbox.y0));

    assert!(s.handle_key(EditKey::Escape));
    assert_eq!(s.selected(), None);
    assert!(!s.handle_key(EditKey::Delete));

    assert!(s.select(b));
    assert!(!s.handle_key(EditKey::Other));
    assert!(s.handle_key(EditKey::Backspace));
    assert!(s.overlay(b).is_none());
    assert!(s.overlay(a).is_some());
    assert!(s.background().is_some());
    assert!(!s.select(b));
}

#[test]
fn clear_overlays_keeps_background() {
    let mut s = ready_surface();
    s.add_overlay(glyph("a"), OverlayTransform::at(Point::ORIGIN))
        .unwrap();
    s.add_overlay(auto("b"), OverlayTransform::at(Point::ORIGIN))
        .unwrap();
    assert_eq!(s.clear_auto_overlays(), 1);
    assert_eq!(s.clear_overlays(), 1);
    assert!(!s.has_overlays());
    assert_eq!(s.state(), SurfaceState::Ready);
    assert!(s.background().is_some());
}

#[test]
fn overlay_ids_are_not_reused() {
    let mut s = ready_surface();
    let a = s
        .add_overlay(glyph("a"), OverlayTransform::at(Point::ORIGIN))
        .unwrap();
    s.remove_overlay(a);
    let b = s
        .add_overlay(glyph("b"), OverlayTransform::at(Point::ORIGIN))
        .unwrap();
    assert_ne!(a, b);
    assert!(s.move_overlay(b, Point::new(5.0, 6.0)));
    assert!(!s.move_overlay(a, Point::new(5.0, 6.0)));
}

#[test]
fn new_load_clears_previous_scene() {
    let mut s = ready_surface();
    s.add_overlay(glyph("a"), OverlayTransform::at(Point::ORIGIN))
        .unwrap();
    s.set_filter("juno").unwrap();
    s.load(png(30, 30, [0, 0, 0, 255])).unwrap();
    assert!(!s.has_overlays());
    assert_eq!(s.current_filter(), "original");
}

#[test]
fn unload_returns_to_empty_and_drops_in_flight_work() {
    let mut s = ready_surface();
    let t = s.request_filter("juno").unwrap();
    s.unload();
    assert_eq!(s.state(), SurfaceState::Empty);
    assert!(s.background().is_none());
    let rebuilt = apply_filter(t.source(), t.filter_id());
    assert_eq!(s.complete_filter(t, rebuilt).unwrap(), Applied::Discarded);
}
