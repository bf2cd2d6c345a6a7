use std::borrow::Cow;

use crate::foundation::error::{SnapError, SnapResult};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Parley contexts for emoji and text overlays.
///
/// Families resolve through the system font collection. A caller-supplied font, when loaded,
/// goes first in every font stack; clusters it cannot map fall back to system faces.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    preferred_family: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::new(),
            layout_ctx: parley::LayoutContext::new(),
            preferred_family: None,
        }
    }

    /// Register `font_bytes` and put its family first in the overlay font stack.
    pub(crate) fn load_font(&mut self, font_bytes: Vec<u8>) -> SnapResult<()> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| SnapError::validation("no font families registered from font bytes"))?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SnapError::validation("registered font family has no name"))?
            .to_string();
        tracing::debug!(%family, "loaded overlay font");
        self.preferred_family = Some(family);
        Ok(())
    }

    /// Family of the caller-supplied font, if one was loaded.
    pub(crate) fn preferred_family(&self) -> Option<&str> {
        self.preferred_family.as_deref()
    }

    /// Shape `text` on a single line (explicit newlines still break).
    ///
    /// Clusters no font can be found for produce no glyphs; callers check the glyph count.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> SnapResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SnapError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut families = Vec::with_capacity(2);
        if let Some(family) = &self.preferred_family {
            families.push(parley::style::FontFamily::Named(Cow::Owned(family.clone())));
        }
        families.push(parley::style::FontFamily::Generic(
            parley::style::GenericFamily::SansSerif,
        ));

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::List(Cow::Owned(families)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Number of positioned glyphs in `layout`.
pub(crate) fn glyph_count(layout: &parley::Layout<TextBrushRgba8>) -> usize {
    layout
        .lines()
        .flat_map(|line| line.items())
        .map(|item| match item {
            parley::layout::PositionedLayoutItem::GlyphRun(run) => run.glyphs().count(),
            parley::layout::PositionedLayoutItem::InlineBox(_) => 0,
        })
        .sum()
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
