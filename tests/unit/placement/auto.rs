use std::io::Cursor;
use std::time::Duration;

use super::*;
use crate::assets::source::ImageSource;
use crate::canvas::surface::SurfaceOpts;
use crate::foundation::core::Viewport;

fn png(w: u32, h: u32) -> ImageSource {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([90, 140, 200, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSource::from_bytes(buf)
}

fn setup(viewport: Viewport) -> (CompositionSurface, MediaRecord) {
    let src = png(200, 100);
    let mut surface = CompositionSurface::new(viewport, SurfaceOpts::default());
    surface.load(src.clone()).unwrap();
    let mut record = MediaRecord::new(&src, 0);
    record.suggested_emojis = vec!["🔥".into(), "✨".into()];
    (surface, record)
}

fn auto_count(surface: &CompositionSurface) -> usize {
    surface.overlays().iter().filter(|o| o.is_auto_placed()).count()
}

#[test]
fn places_server_suggestions_once() {
    let now = Instant::now();
    let (mut surface, mut record) = setup(Viewport::new(800.0, 800.0));

    assert_eq!(
        auto_place(&mut surface, &mut record, false, now).unwrap(),
        AutoPlacement::Placed(2)
    );
    assert!(record.emojis_placed);
    assert_eq!(auto_count(&surface), 2);

    assert_eq!(
        auto_place(&mut surface, &mut record, false, now).unwrap(),
        AutoPlacement::AlreadyPlaced
    );
    assert_eq!(auto_count(&surface), 2);
}

#[test]
fn placed_points_are_inside_safe_rect_and_apart() {
    let now = Instant::now();
    let (mut surface, mut record) = setup(Viewport::new(600.0, 600.0));
    record.keyword_emojis = vec!["🐶".into(), "🏖️".into(), "🌅".into()];
    assert_eq!(
        auto_place(&mut surface, &mut record, false, now).unwrap(),
        AutoPlacement::Placed(4)
    );
    let rect = surface.image_rect().unwrap();
    let centers: Vec<_> = surface.overlays().iter().map(|o| o.transform.center).collect();
    for c in &centers {
        assert!(c.x >= rect.x0 + 24.0 && c.x <= rect.x1 - 24.0);
        assert!(c.y >= rect.y0 + 24.0 && c.y <= rect.y1 - 24.0);
    }
    for (i, a) in centers.iter().enumerate() {
        for b in &centers[i + 1..] {
            assert!(a.distance(*b) > 50.0);
        }
    }
}

#[test]
fn force_replaces_previous_decorations() {
    let now = Instant::now();
    let (mut surface, mut record) = setup(Viewport::new(800.0, 800.0));
    auto_place(&mut surface, &mut record, false, now).unwrap();
    assert_eq!(
        auto_place(&mut surface, &mut record, true, now).unwrap(),
        AutoPlacement::Placed(2)
    );
    assert_eq!(auto_count(&surface), 2);
}

#[test]
fn empty_candidates_skip_placement() {
    let now = Instant::now();
    let (mut surface, mut record) = setup(Viewport::new(800.0, 800.0));
    record.suggested_emojis.clear();
    assert_eq!(
        auto_place(&mut surface, &mut record, false, now).unwrap(),
        AutoPlacement::NoCandidates
    );
    assert!(!record.emojis_placed);
    assert!(!surface.has_overlays());
}

#[test]
fn unstable_bounds_defer_then_retry_once() {
    let now = Instant::now();
    // 200x100 into 60x60 -> image rect ~57x28, below the stability threshold.
    let (mut surface, mut record) = setup(Viewport::new(60.0, 60.0));
    assert_eq!(
        auto_place(&mut surface, &mut record, false, now).unwrap(),
        AutoPlacement::Deferred
    );
    // A second request while the retry is pending does not schedule another.
    assert_eq!(
        auto_place(&mut surface, &mut record, false, now).unwrap(),
        AutoPlacement::Deferred
    );
    assert_eq!(
        retry_pending_placement(&mut surface, &mut record, now).unwrap(),
        None
    );

    surface.resize(Viewport::new(800.0, 800.0));
    let due = surface.retry_due().unwrap();
    assert_eq!(due, now + Duration::from_millis(150));
    assert_eq!(
        retry_pending_placement(&mut surface, &mut record, due).unwrap(),
        Some(AutoPlacement::Placed(2))
    );
    assert!(record.emojis_placed);
    assert_eq!(
        retry_pending_placement(&mut surface, &mut record, due).unwrap(),
        None
    );
}

#[test]
fn retry_gives_up_when_still_unstable() {
    let now = Instant::now();
    let (mut surface, mut record) = setup(Viewport::new(60.0, 60.0));
    auto_place(&mut surface, &mut record, false, now).unwrap();
    let later = now + Duration::from_secs(1);
    assert_eq!(
        retry_pending_placement(&mut surface, &mut record, later).unwrap(),
        Some(AutoPlacement::GaveUp)
    );
    assert!(!record.emojis_placed);
    assert!(surface.retry_due().is_none());
}

#[test]
fn surface_without_image_defers() {
    let now = Instant::now();
    let src = png(10, 10);
    let mut surface = CompositionSurface::new(Viewport::new(800.0, 800.0), SurfaceOpts::default());
    let mut record = MediaRecord::new(&src, 0);
    record.suggested_emojis = vec!["🔥".into()];
    assert_eq!(
        auto_place(&mut surface, &mut record, false, now).unwrap(),
        AutoPlacement::Deferred
    );
}
