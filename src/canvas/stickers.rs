use std::sync::Arc;

use crate::assets::decode::decode_image;
use crate::assets::svg_raster::rasterize_svg;
use crate::canvas::overlay::{OverlayKind, StickerArt};
use crate::foundation::error::{SnapError, SnapResult};

/// Font size of library stickers.
pub const LIBRARY_STICKER_FONT_PX: f32 = 60.0;
/// Initial scale of raster sticker art.
pub const RASTER_STICKER_SCALE: f64 = 0.3;
/// Longest edge of rasterized SVG sticker art.
pub const SVG_STICKER_PX: u32 = 512;

/// Picker tab a sticker belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StickerCategory {
    /// Emoji glyphs.
    Emojis,
    /// Shapes (raster or SVG art supplied by the host).
    Shapes,
    /// Short text bubbles.
    Text,
}

impl StickerCategory {
    /// All categories in tab order.
    pub const ALL: [Self; 3] = [Self::Emojis, Self::Shapes, Self::Text];

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Emojis => "Emojis",
            Self::Shapes => "Shapes",
            Self::Text => "Text",
        }
    }
}

/// Built-in sticker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LibrarySticker {
    /// Stable id (`"fire"`).
    pub id: &'static str,
    /// Glyph text drawn on the surface.
    pub glyph: &'static str,
    /// Picker tab.
    pub category: StickerCategory,
}

const fn sticker(id: &'static str, glyph: &'static str, category: StickerCategory) -> LibrarySticker {
    LibrarySticker {
        id,
        glyph,
        category,
    }
}

static STICKER_LIBRARY: &[LibrarySticker] = &[
    sticker("heart", "❤️", StickerCategory::Emojis),
    sticker("star", "⭐", StickerCategory::Emojis),
    sticker("fire", "🔥", StickerCategory::Emojis),
    sticker("sparkles", "✨", StickerCategory::Emojis),
    sticker("sunglasses", "😎", StickerCategory::Emojis),
    sticker("party", "🎉", StickerCategory::Emojis),
    sticker("camera", "📸", StickerCategory::Emojis),
    sticker("rainbow", "🌈", StickerCategory::Emojis),
    sticker("peace", "✌️", StickerCategory::Emojis),
    sticker("smile", "😊", StickerCategory::Emojis),
    sticker("laugh", "😂", StickerCategory::Emojis),
    sticker("love", "😍", StickerCategory::Emojis),
    sticker("wow", "WOW!", StickerCategory::Text),
    sticker("omg", "OMG", StickerCategory::Text),
    sticker("yay", "YAY", StickerCategory::Text),
    sticker("cool", "COOL", StickerCategory::Text),
    sticker("yes", "YES!", StickerCategory::Text),
    sticker("vibes", "VIBES", StickerCategory::Text),
];

/// The whole library.
pub fn sticker_library() -> &'static [LibrarySticker] {
    STICKER_LIBRARY
}

/// Library stickers in `category`, in library order.
pub fn stickers_by_category(category: StickerCategory) -> impl Iterator<Item = &'static LibrarySticker> {
    STICKER_LIBRARY.iter().filter(move |s| s.category == category)
}

/// Look up a library sticker by id.
pub fn library_sticker(id: &str) -> Option<&'static LibrarySticker> {
    STICKER_LIBRARY.iter().find(|s| s.id == id)
}

impl LibrarySticker {
    /// Overlay content for this sticker.
    pub fn overlay_kind(&self) -> OverlayKind {
        OverlayKind::UserSticker {
            art: StickerArt::Glyph(self.glyph.to_string()),
            name: self.id.to_string(),
            font_px: LIBRARY_STICKER_FONT_PX,
        }
    }
}

/// Overlay content for sticker art supplied as encoded bytes (PNG, JPEG, SVG ...).
pub fn sticker_from_bytes(name: &str, bytes: &[u8]) -> SnapResult<OverlayKind> {
    let bitmap = if looks_like_svg(bytes) {
        rasterize_svg(bytes, SVG_STICKER_PX)?
    } else {
        decode_image(bytes)?
    };
    if bitmap.width == 0 || bitmap.height == 0 {
        return Err(SnapError::decode(format!("sticker '{name}' has no pixels")));
    }
    Ok(OverlayKind::UserSticker {
        art: StickerArt::Raster(Arc::new(bitmap)),
        name: name.to_string(),
        font_px: LIBRARY_STICKER_FONT_PX,
    })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/stickers.rs"]
mod tests;
