use crate::assets::decode::{Bitmap, parse_svg};
use crate::foundation::error::{SnapError, SnapResult};

/// Largest raster edge produced for SVG sticker art.
const MAX_DIM: u32 = 4_096;

/// Rasterize SVG sticker art so that its longest edge is `target_px` pixels.
///
/// The aspect ratio of the SVG's declared size is preserved. Output is premultiplied RGBA8,
/// which is what `tiny_skia` produces natively.
pub fn rasterize_svg(bytes: &[u8], target_px: u32) -> SnapResult<Bitmap> {
    let tree = parse_svg(bytes)?;
    let size = tree.size();
    let (sw, sh) = (size.width(), size.height());
    if !sw.is_finite() || !sh.is_finite() || sw <= 0.0 || sh <= 0.0 {
        return Err(SnapError::decode("svg has invalid width/height"));
    }

    let target = target_px.clamp(1, MAX_DIM) as f32;
    let k = target / sw.max(sh);
    let width = ((sw * k).round() as u32).max(1);
    let height = ((sh * k).round() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SnapError::validation("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(
        (width as f32) / sw,
        (height as f32) / sh,
    );
    resvg::render(&tree, xform, &mut pixmap.as_mut());
    Bitmap::from_premul(width, height, pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
