use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, Rect};

/// Fewest auto-placed decorations per image.
pub const MIN_PLACEMENT_COUNT: usize = 2;
/// Most auto-placed decorations per image.
pub const MAX_PLACEMENT_COUNT: usize = 4;
/// Smallest distance, in percent units, between two generated positions.
pub const MIN_SEPARATION_PERCENT: f64 = 35.0;

/// Tunables for safe-zone placement and re-clamping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementOpts {
    /// Inset applied to each side of the image rect before mapping percentages.
    pub inner_margin_percent: f64,
    /// Hard pixel margin every auto-placed center keeps from the image edges.
    pub edge_margin_px: f64,
    /// Image rect width and height must both exceed this before placement runs.
    pub min_stable_bounds_px: f64,
    /// Font size of auto-placed emoji.
    pub decoration_font_px: f32,
    /// Re-clamp moves smaller than this are skipped.
    pub reclamp_epsilon_px: f64,
}

impl Default for PlacementOpts {
    fn default() -> Self {
        Self {
            inner_margin_percent: 12.0,
            edge_margin_px: 24.0,
            min_stable_bounds_px: 40.0,
            decoration_font_px: 48.0,
            reclamp_epsilon_px: 0.5,
        }
    }
}

/// A position expressed in percent of some rectangle, both axes in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentPoint {
    /// Horizontal percent from the left edge.
    pub left: f64,
    /// Vertical percent from the top edge.
    pub top: f64,
}

impl PercentPoint {
    const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    /// Euclidean distance in percent units.
    pub fn distance(self, other: Self) -> f64 {
        (self.left - other.left).hypot(self.top - other.top)
    }
}

const TWO: [PercentPoint; 2] = [PercentPoint::new(25.0, 30.0), PercentPoint::new(75.0, 70.0)];
const THREE: [PercentPoint; 3] = [
    PercentPoint::new(25.0, 25.0),
    PercentPoint::new(75.0, 25.0),
    PercentPoint::new(50.0, 75.0),
];
const FOUR: [PercentPoint; 4] = [
    PercentPoint::new(25.0, 25.0),
    PercentPoint::new(75.0, 25.0),
    PercentPoint::new(25.0, 75.0),
    PercentPoint::new(75.0, 75.0),
];

/// Deterministic, well separated anchor positions for `count` decorations.
///
/// `count` is clamped to `[MIN_PLACEMENT_COUNT, MAX_PLACEMENT_COUNT]`.
pub fn generate_safe_zone_positions(count: usize) -> Vec<PercentPoint> {
    match count.clamp(MIN_PLACEMENT_COUNT, MAX_PLACEMENT_COUNT) {
        2 => TWO.to_vec(),
        3 => THREE.to_vec(),
        _ => FOUR.to_vec(),
    }
}

/// Map percentage positions into `image_rect` shrunk by `inner_margin_percent` per side, then
/// clamp each result to `image_rect` inset by `edge_margin_px`.
pub fn map_to_image_bounds(
    positions: &[PercentPoint],
    image_rect: Rect,
    inner_margin_percent: f64,
    edge_margin_px: f64,
) -> Vec<Point> {
    let margin = inner_margin_percent.clamp(0.0, 49.0) / 100.0;
    let w = image_rect.width();
    let h = image_rect.height();
    let inner = Rect::new(
        image_rect.x0 + w * margin,
        image_rect.y0 + h * margin,
        image_rect.x1 - w * margin,
        image_rect.y1 - h * margin,
    );

    positions
        .iter()
        .map(|p| {
            let raw = Point::new(
                inner.x0 + inner.width() * p.left.clamp(0.0, 100.0) / 100.0,
                inner.y0 + inner.height() * p.top.clamp(0.0, 100.0) / 100.0,
            );
            clamp_to_safe_rect(raw, image_rect, edge_margin_px)
        })
        .collect()
}

/// Clamp `p` to `image_rect` inset by `edge_margin_px`.
///
/// When the inset collapses on an axis the point snaps to the rect center on that axis.
pub fn clamp_to_safe_rect(p: Point, image_rect: Rect, edge_margin_px: f64) -> Point {
    let r = image_rect.abs();
    let center = r.center();
    let clamp_axis = |v: f64, lo: f64, hi: f64, mid: f64| {
        if lo > hi { mid } else { v.clamp(lo, hi) }
    };
    Point::new(
        clamp_axis(p.x, r.x0 + edge_margin_px, r.x1 - edge_margin_px, center.x),
        clamp_axis(p.y, r.y0 + edge_margin_px, r.y1 - edge_margin_px, center.y),
    )
}

/// Re-clamp existing positions against the current image rect.
///
/// Returns only the entries that moved by more than `epsilon_px`, with their new position.
pub fn reclamp<K: Copy>(
    existing: &[(K, Point)],
    image_rect: Rect,
    edge_margin_px: f64,
    epsilon_px: f64,
) -> Vec<(K, Point)> {
    existing
        .iter()
        .filter_map(|&(key, p)| {
            let clamped = clamp_to_safe_rect(p, image_rect, edge_margin_px);
            ((clamped - p).hypot() > epsilon_px).then_some((key, clamped))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/placement/safe_zone.rs"]
mod tests;
