use std::f64::consts::FRAC_PI_2;

use super::*;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::math::approx_eq;

fn close(a: f64, b: f64) -> bool {
    approx_eq(a, b, 1e-9)
}

fn rect_approx(a: Rect, b: Rect) -> bool {
    close(a.x0, b.x0) && close(a.y0, b.y0) && close(a.x1, b.x1) && close(a.y1, b.y1)
}

fn raster(w: u32, h: u32) -> OverlayKind {
    OverlayKind::UserSticker {
        art: StickerArt::Raster(Arc::new(Bitmap::filled(w, h, Rgba8Premul::transparent()))),
        name: "art".into(),
        font_px: 60.0,
    }
}

#[test]
fn only_auto_decorations_are_auto_placed() {
    let t = OverlayTransform::at(Point::ORIGIN);
    let auto = Overlay {
        id: OverlayId(1),
        transform: t,
        kind: OverlayKind::AutoDecoration {
            emoji: "🔥".into(),
            font_px: 48.0,
        },
    };
    let text = Overlay {
        id: OverlayId(2),
        transform: t,
        kind: OverlayKind::UserText {
            text: "hi".into(),
            font_px: 20.0,
            color: [0, 0, 0, 255],
        },
    };
    assert!(auto.is_auto_placed());
    assert!(!text.is_auto_placed());
}

#[test]
fn nominal_sizes() {
    assert_eq!(raster(30, 10).nominal_size(), Size::new(30.0, 10.0));
    let text = OverlayKind::UserText {
        text: "WOW!".into(),
        font_px: 10.0,
        color: [0; 4],
    };
    let s = text.nominal_size();
    assert!(close(s.width, 24.0) && close(s.height, 12.0));
}

#[test]
fn bounding_box_follows_scale_and_rotation() {
    let mut o = Overlay {
        id: OverlayId(1),
        transform: OverlayTransform::at(Point::new(100.0, 50.0)).with_scale(2.0),
        kind: raster(20, 10),
    };
    assert!(rect_approx(o.bounding_box(), Rect::new(80.0, 40.0, 120.0, 60.0)));

    o.transform = o.transform.with_rotation(FRAC_PI_2);
    assert!(rect_approx(o.bounding_box(), Rect::new(90.0, 30.0, 110.0, 70.0)));
}
