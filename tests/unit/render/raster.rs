use super::*;
use crate::foundation::core::Rgba8Premul;

#[test]
fn bitmap_round_trips_through_pixmap() {
    let bitmap = Bitmap::filled(3, 2, Rgba8Premul::from_straight_rgba(200, 100, 50, 128));
    let pixmap = bitmap_to_pixmap(&bitmap).unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (3, 2));
    assert_eq!(pixmap_to_bitmap(&pixmap).unwrap(), bitmap);
}

#[test]
fn oversized_bitmaps_are_geometry_errors() {
    let bitmap = Bitmap {
        width: 70_000,
        height: 1,
        rgba8_premul: Vec::new(),
    };
    assert!(matches!(
        bitmap_to_pixmap(&bitmap),
        Err(SnapError::Geometry(_))
    ));
}

#[test]
fn image_paint_reports_size() {
    let bitmap = Bitmap::filled(7, 5, Rgba8Premul::transparent());
    let (_, w, h) = image_paint(&bitmap).unwrap();
    assert_eq!((w, h), (7.0, 5.0));
}

#[test]
fn affine_coefficients_are_preserved() {
    let a = Affine::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(affine_to_cpu(a).as_coeffs(), a.as_coeffs());
}
