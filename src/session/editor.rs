use std::time::Instant;

use crate::assets::source::{ContentId, ImageSource};
use crate::caption::client::CaptionService;
use crate::canvas::overlay::{OverlayId, OverlayKind, OverlayTransform};
use crate::canvas::stickers::{RASTER_STICKER_SCALE, library_sticker, sticker_from_bytes};
use crate::canvas::surface::{Applied, CompositionSurface, SurfaceOpts};
use crate::filters::catalog::{ORIGINAL_FILTER, filter_preset};
use crate::foundation::core::Viewport;
use crate::foundation::error::{SnapError, SnapResult};
use crate::media::ingest::{Ingested, ingest};
use crate::media::record::{MediaKind, MediaRecord};
use crate::media::store::MediaStore;
use crate::placement::auto::{AutoPlacement, auto_place, retry_pending_placement};
use crate::placement::candidates::merge_candidates;
use crate::render::export::ExportRenderer;

/// One editing session: a surface, the record store and the caption collaborator.
///
/// The session keeps the store in sync with what the surface does (filter choice, placed
/// decorations) so a record reopened later restores the same state.
pub struct EditorSession<S, C> {
    surface: CompositionSurface,
    store: S,
    captions: C,
    renderer: ExportRenderer,
    current: Option<ContentId>,
}

impl<S: MediaStore, C: CaptionService> EditorSession<S, C> {
    /// New session with an empty surface.
    pub fn new(
        viewport: Viewport,
        opts: SurfaceOpts,
        store: S,
        captions: C,
        renderer: ExportRenderer,
    ) -> Self {
        Self {
            surface: CompositionSurface::new(viewport, opts),
            store,
            captions,
            renderer,
            current: None,
        }
    }

    /// The composition surface.
    pub fn surface(&self) -> &CompositionSurface {
        &self.surface
    }

    /// Mutable access for direct overlay manipulation and resizes.
    pub fn surface_mut(&mut self) -> &mut CompositionSurface {
        &mut self.surface
    }

    /// The record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The caption collaborator.
    pub fn captions(&self) -> &C {
        &self.captions
    }

    /// Record of the image on the surface.
    pub fn current_record(&self) -> Option<&MediaRecord> {
        self.store.get(self.current?)
    }

    /// Ingest `source` (captioning it if new) and load it onto the surface.
    pub fn open_source(&mut self, source: &ImageSource, now_ms: u64) -> SnapResult<Ingested> {
        let ingested = ingest(source, &self.captions, &mut self.store, None, now_ms)?;
        self.open_record(ingested.record.id)?;
        Ok(ingested)
    }

    /// Load a stored record onto the surface and restore its filter.
    #[tracing::instrument(skip(self))]
    pub fn open_record(&mut self, id: ContentId) -> SnapResult<()> {
        let record = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| SnapError::validation(format!("unknown media record {id}")))?;
        if record.file_type == MediaKind::Video {
            return Err(SnapError::validation("video records cannot be composed"));
        }
        let source = record.source()?;
        self.current = None;
        self.surface.load(source)?;
        self.current = Some(id);

        if record.filter_id != ORIGINAL_FILTER {
            if filter_preset(&record.filter_id).is_some() {
                self.surface.set_filter(&record.filter_id)?;
            } else {
                tracing::warn!(filter = %record.filter_id, "stored filter is unknown, showing original");
            }
        }
        Ok(())
    }

    fn current_record_owned(&self) -> SnapResult<MediaRecord> {
        self.current_record()
            .cloned()
            .ok_or_else(|| SnapError::validation("no media record is open"))
    }

    /// Rebuild the background with `filter_id` and persist the choice.
    pub fn select_filter(&mut self, filter_id: &str) -> SnapResult<Applied> {
        let mut record = self.current_record_owned()?;
        let applied = self.surface.set_filter(filter_id)?;
        if applied == Applied::Applied && record.filter_id != filter_id {
            record.filter_id = filter_id.to_string();
            self.store.update(record)?;
        }
        Ok(applied)
    }

    fn persist_placement(&mut self, record: MediaRecord, was_placed: bool) -> SnapResult<()> {
        if record.emojis_placed && !was_placed {
            self.store.update(record)?;
        }
        Ok(())
    }

    /// Auto-place decorations for the open record (at most once unless `force`).
    pub fn auto_decorate(&mut self, force: bool, now: Instant) -> SnapResult<AutoPlacement> {
        let mut record = self.current_record_owned()?;
        let was_placed = record.emojis_placed;
        let outcome = auto_place(&mut self.surface, &mut record, force, now)?;
        self.persist_placement(record, was_placed)?;
        Ok(outcome)
    }

    /// Run the deferred auto-placement retry if it is due.
    pub fn retry_pending(&mut self, now: Instant) -> SnapResult<Option<AutoPlacement>> {
        let Ok(mut record) = self.current_record_owned() else {
            return Ok(None);
        };
        let was_placed = record.emojis_placed;
        let outcome = retry_pending_placement(&mut self.surface, &mut record, now)?;
        self.persist_placement(record, was_placed)?;
        Ok(outcome)
    }

    /// Append decoration suggestions to the open record (de-duplicated) and persist them.
    pub fn add_suggestions(&mut self, emojis: &[String]) -> SnapResult<()> {
        let mut record = self.current_record_owned()?;
        let merged = merge_candidates(&record.suggested_emojis, emojis);
        if merged != record.suggested_emojis {
            record.suggested_emojis = merged;
            self.store.update(record)?;
        }
        Ok(())
    }

    fn add_selected(
        &mut self,
        kind: OverlayKind,
        transform: OverlayTransform,
    ) -> SnapResult<OverlayId> {
        let id = self.surface.add_overlay(kind, transform)?;
        self.surface.select(id);
        Ok(id)
    }

    /// Add a library sticker at the viewport center and select it.
    pub fn add_library_sticker(&mut self, sticker_id: &str) -> SnapResult<OverlayId> {
        let sticker = library_sticker(sticker_id)
            .ok_or_else(|| SnapError::validation(format!("unknown sticker \"{sticker_id}\"")))?;
        let center = self.surface.viewport().center();
        self.add_selected(sticker.overlay_kind(), OverlayTransform::at(center))
    }

    /// Add sticker art from encoded bytes at the viewport center, scaled down, and select it.
    pub fn add_sticker_bytes(&mut self, name: &str, bytes: &[u8]) -> SnapResult<OverlayId> {
        let kind = sticker_from_bytes(name, bytes)?;
        let center = self.surface.viewport().center();
        self.add_selected(
            kind,
            OverlayTransform::at(center).with_scale(RASTER_STICKER_SCALE),
        )
    }

    /// Add a text overlay at the viewport center and select it.
    pub fn add_text(&mut self, text: &str, font_px: f32, color: [u8; 4]) -> SnapResult<OverlayId> {
        if text.trim().is_empty() {
            return Err(SnapError::validation("text overlay must not be empty"));
        }
        let center = self.surface.viewport().center();
        self.add_selected(
            OverlayKind::UserText {
                text: text.to_string(),
                font_px,
                color,
            },
            OverlayTransform::at(center),
        )
    }

    /// Flatten the surface to PNG at the export multiplier.
    pub fn export_png(&mut self) -> SnapResult<Vec<u8>> {
        self.surface.export(&mut self.renderer)
    }

    /// Remove a record from the gallery; unloads the surface if it was open.
    pub fn remove_record(&mut self, id: ContentId) -> SnapResult<Option<MediaRecord>> {
        let removed = self.store.remove(id)?;
        if self.current == Some(id) {
            self.current = None;
            self.surface.unload();
        }
        Ok(removed)
    }

    /// Tear the session's surface down.
    pub fn close(&mut self) {
        self.current = None;
        self.surface.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
