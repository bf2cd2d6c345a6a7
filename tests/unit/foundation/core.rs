use super::*;

#[test]
fn viewport_sanitizes_bad_dimensions() {
    let v = Viewport::new(f64::NAN, -3.0);
    assert_eq!(v.width, 0.0);
    assert_eq!(v.height, 0.0);
    assert!(v.is_degenerate());

    let v = Viewport::new(400.0, 300.0);
    assert!(!v.is_degenerate());
    assert_eq!(v.center(), Point::new(200.0, 150.0));
}

#[test]
fn pixel_size_unknown_dims_count_as_one() {
    let s = PixelSize::new(0, 20).or_unit();
    assert_eq!(s, Size::new(1.0, 20.0));
    assert_eq!(PixelSize::new(3, 2).rgba8_len(), 24);
}

#[test]
fn premultiply_rounds_to_nearest() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}
