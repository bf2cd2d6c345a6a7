use super::*;

fn tuffy() -> Vec<u8> {
    std::fs::read("tests/data/fonts/Tuffy.ttf").unwrap()
}

#[test]
fn loaded_font_is_preferred_and_shapes_glyphs() {
    let mut engine = TextLayoutEngine::new();
    assert!(engine.preferred_family().is_none());
    engine.load_font(tuffy()).unwrap();
    assert!(engine.preferred_family().is_some());

    let layout = engine
        .layout_plain("Hi", 24.0, TextBrushRgba8::from([0, 0, 0, 255]))
        .unwrap();
    assert!(glyph_count(&layout) >= 2);
    assert!(layout.width() > 0.0);
}

#[test]
fn invalid_font_bytes_are_rejected() {
    let mut engine = TextLayoutEngine::new();
    assert!(engine.load_font(b"not a font".to_vec()).is_err());
    assert!(engine.preferred_family().is_none());
}

#[test]
fn invalid_sizes_are_rejected() {
    let mut engine = TextLayoutEngine::new();
    for size in [0.0, -1.0, f32::NAN] {
        assert!(engine
            .layout_plain("x", size, TextBrushRgba8::default())
            .is_err());
    }
}

#[test]
fn brush_from_rgba_array() {
    let b = TextBrushRgba8::from([1, 2, 3, 4]);
    assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 4));
}
