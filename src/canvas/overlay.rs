use std::fmt;
use std::sync::Arc;

use crate::assets::decode::Bitmap;
use crate::foundation::core::{Affine, Point, Rect, Size, Vec2};

/// Surface-unique overlay handle. Never reused within one surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay#{}", self.0)
    }
}

/// Placement of an overlay on the surface: center, uniform scale, rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayTransform {
    /// Center in surface coordinates.
    pub center: Point,
    /// Uniform scale applied to the nominal size.
    pub scale: f64,
    /// Clockwise rotation in radians (y points down).
    pub rotation_rad: f64,
}

impl OverlayTransform {
    /// Unscaled, unrotated transform centered at `center`.
    pub fn at(center: Point) -> Self {
        Self {
            center,
            scale: 1.0,
            rotation_rad: 0.0,
        }
    }

    /// Same transform with a different scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Same transform with a different rotation.
    pub fn with_rotation(mut self, rotation_rad: f64) -> Self {
        self.rotation_rad = rotation_rad;
        self
    }

    /// Map overlay-local coordinates (origin at the nominal box top-left) to surface space.
    pub fn local_to_surface(&self, nominal: Size) -> Affine {
        Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation_rad)
            * Affine::scale(self.scale)
            * Affine::translate(Vec2::new(-nominal.width * 0.5, -nominal.height * 0.5))
    }
}

/// Artwork of a user sticker.
#[derive(Clone, Debug, PartialEq)]
pub enum StickerArt {
    /// Emoji or short text drawn as a glyph run.
    Glyph(String),
    /// Raster art (decoded PNG/JPEG or rasterized SVG).
    Raster(Arc<Bitmap>),
}

/// What an overlay is. Auto-placed decorations are their own variant.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayKind {
    /// Emoji put there by auto-placement.
    AutoDecoration {
        /// Emoji text.
        emoji: String,
        /// Font size in surface pixels.
        font_px: f32,
    },
    /// Sticker added by the user.
    UserSticker {
        /// Artwork.
        art: StickerArt,
        /// Library name or file name.
        name: String,
        /// Font size for glyph art; ignored for raster art.
        font_px: f32,
    },
    /// Free text added by the user.
    UserText {
        /// Text content.
        text: String,
        /// Font size in surface pixels.
        font_px: f32,
        /// Straight RGBA color.
        color: [u8; 4],
    },
}

impl OverlayKind {
    /// Size of the unscaled overlay box.
    ///
    /// Text is estimated from the font size (0.6em advance, 1.2em line) so geometry never
    /// depends on font availability.
    pub fn nominal_size(&self) -> Size {
        fn text_box(text: &str, font_px: f32) -> Size {
            let font_px = f64::from(font_px.max(1.0));
            let chars = text.chars().count().max(1) as f64;
            Size::new(font_px * 0.6 * chars, font_px * 1.2)
        }
        match self {
            Self::AutoDecoration { font_px, .. } => {
                let s = f64::from(font_px.max(1.0)) * 1.2;
                Size::new(s, s)
            }
            Self::UserSticker {
                art: StickerArt::Glyph(text),
                font_px,
                ..
            } => {
                if text.chars().count() <= 2 {
                    let s = f64::from(font_px.max(1.0)) * 1.2;
                    Size::new(s, s)
                } else {
                    text_box(text, *font_px)
                }
            }
            Self::UserSticker {
                art: StickerArt::Raster(bitmap),
                ..
            } => Size::new(f64::from(bitmap.width), f64::from(bitmap.height)),
            Self::UserText { text, font_px, .. } => text_box(text, *font_px),
        }
    }
}

/// One decoration on the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    /// Handle.
    pub id: OverlayId,
    /// Placement.
    pub transform: OverlayTransform,
    /// Content.
    pub kind: OverlayKind,
}

impl Overlay {
    /// Whether the placement engine owns this overlay's position.
    pub fn is_auto_placed(&self) -> bool {
        matches!(self.kind, OverlayKind::AutoDecoration { .. })
    }

    /// Nominal (unscaled) size.
    pub fn nominal_size(&self) -> Size {
        self.kind.nominal_size()
    }

    /// Overlay-local to surface transform.
    pub fn local_to_surface(&self) -> Affine {
        self.transform.local_to_surface(self.nominal_size())
    }

    /// Axis-aligned on-surface bounding box of the scaled, rotated overlay.
    pub fn bounding_box(&self) -> Rect {
        let size = self.nominal_size();
        self.local_to_surface()
            .transform_rect_bbox(Rect::from_origin_size(Point::ORIGIN, size))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/overlay.rs"]
mod tests;
