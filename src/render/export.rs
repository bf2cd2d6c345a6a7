use serde::{Deserialize, Serialize};

use crate::assets::decode::Bitmap;
use crate::canvas::overlay::{Overlay, OverlayKind, StickerArt};
use crate::canvas::surface::{CompositionSurface, SurfaceState};
use crate::foundation::core::{Affine, Vec2};
use crate::foundation::error::{SnapError, SnapResult};
use crate::render::raster::{affine_to_cpu, dim_u16, image_paint, pixmap_to_bitmap};
use crate::render::text::{glyph_count, TextBrushRgba8, TextLayoutEngine};

/// Supersampling multiplier used for exports.
pub const DEFAULT_EXPORT_MULTIPLIER: f64 = 2.0;

/// Export configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOpts {
    /// Output size relative to the on-screen viewport.
    pub multiplier: f64,
    /// Straight RGBA color behind the background image.
    pub clear_rgba: [u8; 4],
    /// Color of glyph stickers and auto-placed decorations.
    pub glyph_rgba: [u8; 4],
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_EXPORT_MULTIPLIER,
            clear_rgba: [0xf0, 0xf0, 0xf0, 0xff],
            glyph_rgba: [0, 0, 0, 0xff],
        }
    }
}

/// Flattens a surface's scene (background, then overlays in order) with `vello_cpu`.
pub struct ExportRenderer {
    opts: ExportOpts,
    text: TextLayoutEngine,
}

impl Default for ExportRenderer {
    fn default() -> Self {
        Self::new(ExportOpts::default())
    }
}

impl ExportRenderer {
    /// Renderer that shapes glyph and text overlays with system fonts.
    ///
    /// Exports fail when an overlay's text resolves to no font at all.
    pub fn new(opts: ExportOpts) -> Self {
        Self {
            opts,
            text: TextLayoutEngine::new(),
        }
    }

    /// Prefer `font_bytes` (TTF/OTF) for emoji and text overlays; system fonts cover the rest.
    pub fn with_font(mut self, font_bytes: Vec<u8>) -> SnapResult<Self> {
        self.text.load_font(font_bytes)?;
        Ok(self)
    }

    /// Options in effect.
    pub fn opts(&self) -> &ExportOpts {
        &self.opts
    }

    /// Render at the export multiplier.
    pub fn render(&mut self, surface: &CompositionSurface) -> SnapResult<Bitmap> {
        self.render_at(surface, self.opts.multiplier)
    }

    /// Render at the export multiplier and encode as PNG.
    #[tracing::instrument(skip_all)]
    pub fn export_png(&mut self, surface: &CompositionSurface) -> SnapResult<Vec<u8>> {
        let bitmap = self.render(surface)?;
        let png = bitmap.to_png()?;
        tracing::info!(
            width = bitmap.width,
            height = bitmap.height,
            bytes = png.len(),
            "exported png"
        );
        Ok(png)
    }

    /// Render the scene exactly as displayed, scaled by `multiplier`.
    pub fn render_at(
        &mut self,
        surface: &CompositionSurface,
        multiplier: f64,
    ) -> SnapResult<Bitmap> {
        if surface.state() == SurfaceState::Disposed {
            return Err(SnapError::validation("surface is disposed"));
        }
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(SnapError::validation("export multiplier must be finite and > 0"));
        }
        let viewport = surface.viewport();
        if viewport.is_degenerate() {
            return Err(SnapError::geometry("cannot export a zero-size surface"));
        }
        let width = dim_u16((viewport.width * multiplier).round() as u32, "export width")?;
        let height = dim_u16((viewport.height * multiplier).round() as u32, "export height")?;
        if width == 0 || height == 0 {
            return Err(SnapError::geometry("export size rounds to zero"));
        }

        let base = Affine::scale(multiplier);
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let [r, g, b, a] = self.opts.clear_rgba;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        if let (Some(bg), Some(fit)) = (surface.background(), surface.fit()) {
            let (paint, w, h) = image_paint(&bg.bitmap)?;
            let xf = base * Affine::translate(fit.origin.to_vec2()) * Affine::scale(fit.scale);
            ctx.set_transform(affine_to_cpu(xf));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        }

        for overlay in surface.overlays() {
            self.draw_overlay(&mut ctx, base, overlay)?;
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        pixmap_to_bitmap(&pixmap)
    }

    fn draw_overlay(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        base: Affine,
        overlay: &Overlay,
    ) -> SnapResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let xf = base * overlay.local_to_surface();
        match &overlay.kind {
            OverlayKind::UserSticker {
                art: StickerArt::Raster(bitmap),
                ..
            } => {
                let (paint, w, h) = image_paint(bitmap)?;
                ctx.set_transform(affine_to_cpu(xf));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                Ok(())
            }
            OverlayKind::UserSticker {
                art: StickerArt::Glyph(text),
                font_px,
                ..
            } => self.draw_text(ctx, xf, overlay, text, *font_px, self.opts.glyph_rgba),
            OverlayKind::AutoDecoration { emoji, font_px } => {
                self.draw_text(ctx, xf, overlay, emoji, *font_px, self.opts.glyph_rgba)
            }
            OverlayKind::UserText {
                text,
                font_px,
                color,
            } => self.draw_text(ctx, xf, overlay, text, *font_px, *color),
        }
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        xf: Affine,
        overlay: &Overlay,
        text: &str,
        font_px: f32,
        color: [u8; 4],
    ) -> SnapResult<()> {
        let layout = self
            .text
            .layout_plain(text, font_px, TextBrushRgba8::from(color))?;
        if glyph_count(&layout) == 0 {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(SnapError::validation(format!(
                "no font for overlay {}",
                overlay.id
            )));
        }

        // Center the shaped text in the overlay's nominal box.
        let nominal = overlay.nominal_size();
        let offset = Vec2::new(
            (nominal.width - f64::from(layout.width())) * 0.5,
            (nominal.height - f64::from(layout.height())) * 0.5,
        );
        ctx.set_transform(affine_to_cpu(xf * Affine::translate(offset)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(run.run().font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

impl CompositionSurface {
    /// Flatten this surface to PNG bytes with `renderer` (2x by default).
    pub fn export(&self, renderer: &mut ExportRenderer) -> SnapResult<Vec<u8>> {
        renderer.export_png(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
