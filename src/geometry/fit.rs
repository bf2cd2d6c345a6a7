use crate::foundation::core::{PixelSize, Point, Rect, Size, Viewport};

/// Breathing room left around a contain-fitted image.
pub const DEFAULT_MARGIN_FACTOR: f64 = 0.95;

/// Relative overflow tolerated before the contain guard re-clamps the scale.
pub const OVERFLOW_TOLERANCE: f64 = 0.001;

/// Strategy for scaling an image into a viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Whole image visible, may letterbox.
    #[default]
    Contain,
    /// Viewport filled, image may extend past the viewport edges.
    Cover,
}

/// Result of [`fit`]: uniform scale plus the top-left placement of the scaled image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitResult {
    /// Uniform scale applied to the intrinsic size.
    pub scale: f64,
    /// Top-left corner of the scaled image in viewport space.
    pub origin: Point,
    /// Scaled image size in viewport space.
    pub scaled: Size,
}

impl FitResult {
    /// On-surface bounding rectangle of the fitted image.
    pub fn image_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.scaled)
    }
}

/// Fit `intrinsic` into `viewport` with the default margin factor.
pub fn fit(intrinsic: PixelSize, viewport: Viewport, mode: FitMode) -> FitResult {
    fit_with_margin(intrinsic, viewport, mode, DEFAULT_MARGIN_FACTOR)
}

/// Fit `intrinsic` into `viewport`, scaling by `margin_factor` on top of the contain/cover scale.
///
/// Pure function. Unknown intrinsic dimensions count as 1px; a zero-size viewport yields a zero
/// scale centered at the viewport center.
pub fn fit_with_margin(
    intrinsic: PixelSize,
    viewport: Viewport,
    mode: FitMode,
    margin_factor: f64,
) -> FitResult {
    let img = intrinsic.or_unit();
    let vw = viewport.width;
    let vh = viewport.height;
    let margin = if margin_factor.is_finite() && margin_factor > 0.0 {
        margin_factor
    } else {
        DEFAULT_MARGIN_FACTOR
    };

    let sx = vw / img.width;
    let sy = vh / img.height;
    let mut scale = match mode {
        FitMode::Contain => sx.min(sy),
        FitMode::Cover => sx.max(sy),
    } * margin;

    // Single-pass scaling can overflow through rounding; never let that reach the screen.
    let (gw, gh) = (img.width * scale, img.height * scale);
    if mode == FitMode::Contain
        && (gw > vw * (1.0 - OVERFLOW_TOLERANCE) || gh > vh * (1.0 - OVERFLOW_TOLERANCE))
        && gw > 0.0
        && gh > 0.0
    {
        let clamp = ((vw * DEFAULT_MARGIN_FACTOR) / gw).min((vh * DEFAULT_MARGIN_FACTOR) / gh);
        scale *= clamp;
    }

    let scaled = Size::new(img.width * scale, img.height * scale);
    let origin = Point::new((vw - scaled.width) * 0.5, (vh - scaled.height) * 0.5);
    tracing::debug!(
        vw,
        vh,
        iw = img.width,
        ih = img.height,
        scale,
        gw = scaled.width,
        gh = scaled.height,
        "fit"
    );
    FitResult {
        scale,
        origin,
        scaled,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/fit.rs"]
mod tests;
