use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::assets::decode::Bitmap;
use crate::assets::source::{ContentId, ImageSource};
use crate::canvas::overlay::{Overlay, OverlayId, OverlayKind, OverlayTransform};
use crate::filters::catalog::ORIGINAL_FILTER;
use crate::filters::pipeline::apply_filter;
use crate::foundation::core::{PixelSize, Point, Rect, Viewport};
use crate::foundation::error::{SnapError, SnapResult};
use crate::geometry::fit::{DEFAULT_MARGIN_FACTOR, FitMode, FitResult, fit_with_margin};
use crate::placement::safe_zone::{PlacementOpts, clamp_to_safe_rect, reclamp};

/// Surface configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOpts {
    /// How the background is scaled into the viewport.
    pub fit_mode: FitMode,
    /// Breathing-room factor applied on top of the fit scale. Capped at
    /// [`DEFAULT_MARGIN_FACTOR`] when a surface is created.
    pub margin_factor: f64,
    /// Safe-zone placement tunables.
    pub placement: PlacementOpts,
    /// Delay before the single deferred auto-placement retry.
    pub retry_delay_ms: u64,
}

impl Default for SurfaceOpts {
    fn default() -> Self {
        Self {
            fit_mode: FitMode::Contain,
            margin_factor: DEFAULT_MARGIN_FACTOR,
            placement: PlacementOpts::default(),
            retry_delay_ms: 150,
        }
    }
}

impl SurfaceOpts {
    /// Copy with `margin_factor` brought into `(0, DEFAULT_MARGIN_FACTOR]`.
    pub fn sanitized(mut self) -> Self {
        let m = self.margin_factor;
        if !m.is_finite() || m <= 0.0 || m > DEFAULT_MARGIN_FACTOR {
            tracing::warn!(
                margin_factor = m,
                "margin factor out of range, using {DEFAULT_MARGIN_FACTOR}"
            );
            self.margin_factor = DEFAULT_MARGIN_FACTOR;
        }
        self
    }
}

/// Lifecycle state of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceState {
    /// No image.
    Empty,
    /// A load was started and has not completed.
    Loading,
    /// Background placed. Filter and overlays are orthogonal to this state.
    Ready,
    /// Torn down; every later result is discarded.
    Disposed,
}

/// Whether an async result was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The result changed the surface.
    Applied,
    /// The result was stale (superseded or the surface was disposed) and was dropped.
    Discarded,
}

/// Liveness token for one image load.
#[derive(Clone, Debug)]
pub struct LoadTicket {
    generation: u64,
    source: ImageSource,
}

impl LoadTicket {
    /// The source being loaded.
    pub fn source(&self) -> &ImageSource {
        &self.source
    }
}

/// Liveness token for one filter rebuild.
#[derive(Clone, Debug)]
pub struct FilterTicket {
    generation: u64,
    load_generation: u64,
    filter_id: String,
    source: ImageSource,
}

impl FilterTicket {
    /// Requested filter id.
    pub fn filter_id(&self) -> &str {
        &self.filter_id
    }

    /// Original source the rebuild must start from.
    pub fn source(&self) -> &ImageSource {
        &self.source
    }
}

/// Keys the surface reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKey {
    /// Delete key.
    Delete,
    /// Backspace key.
    Backspace,
    /// Escape key.
    Escape,
    /// Anything else.
    Other,
}

/// The background currently on display. Rebuilt wholesale, never mutated.
#[derive(Clone, Debug)]
pub struct Background {
    /// Displayed (possibly filtered) pixels.
    pub bitmap: Arc<Bitmap>,
    /// Filter that produced `bitmap`.
    pub filter_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PendingRetry {
    pub(crate) record: ContentId,
    pub(crate) force: bool,
    pub(crate) due: Instant,
}

/// Scene owner: background image plus overlays, with fit and re-clamp on every change.
#[derive(Debug)]
pub struct CompositionSurface {
    opts: SurfaceOpts,
    state: SurfaceState,
    viewport: Viewport,
    source: Option<ImageSource>,
    intrinsic: Option<PixelSize>,
    background: Option<Background>,
    fit: Option<FitResult>,
    overlays: Vec<Overlay>,
    selected: Option<OverlayId>,
    next_overlay: u64,
    load_generation: u64,
    filter_generation: u64,
    pending_retry: Option<PendingRetry>,
}

impl CompositionSurface {
    /// Empty surface of `viewport` size.
    pub fn new(viewport: Viewport, opts: SurfaceOpts) -> Self {
        Self {
            opts: opts.sanitized(),
            state: SurfaceState::Empty,
            viewport,
            source: None,
            intrinsic: None,
            background: None,
            fit: None,
            overlays: Vec::new(),
            selected: None,
            next_overlay: 1,
            load_generation: 0,
            filter_generation: 0,
            pending_retry: None,
        }
    }

    /// Options in effect.
    pub fn opts(&self) -> &SurfaceOpts {
        &self.opts
    }

    /// Lifecycle state.
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Original source of the current (or loading) image.
    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// Intrinsic size captured at decode time.
    pub fn intrinsic_size(&self) -> Option<PixelSize> {
        self.intrinsic
    }

    /// Background on display.
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Current fit of the background.
    pub fn fit(&self) -> Option<FitResult> {
        self.fit
    }

    /// On-surface rectangle of the background.
    pub fn image_rect(&self) -> Option<Rect> {
        self.fit.map(|f| f.image_rect())
    }

    /// Active filter id (`original` when unfiltered or empty).
    pub fn current_filter(&self) -> &str {
        self.background
            .as_ref()
            .map_or(ORIGINAL_FILTER, |b| b.filter_id.as_str())
    }

    /// Whether a non-identity filter is on display.
    pub fn is_filtered(&self) -> bool {
        self.current_filter() != ORIGINAL_FILTER
    }

    /// Overlays in paint order (back to front).
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Whether any overlay exists.
    pub fn has_overlays(&self) -> bool {
        !self.overlays.is_empty()
    }

    /// Overlay with `id`.
    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    fn ensure_live(&self) -> SnapResult<()> {
        if self.state == SurfaceState::Disposed {
            return Err(SnapError::validation("surface is disposed"));
        }
        Ok(())
    }

    /// Start loading `source`. Any load still in flight is superseded, and the previous scene
    /// (background, overlays, selection, pending retry) is cleared.
    pub fn begin_load(&mut self, source: ImageSource) -> LoadTicket {
        self.load_generation += 1;
        self.filter_generation += 1;
        if self.state != SurfaceState::Disposed {
            self.state = SurfaceState::Loading;
            self.source = Some(source.clone());
            self.intrinsic = None;
            self.background = None;
            self.fit = None;
            self.overlays.clear();
            self.selected = None;
            self.pending_retry = None;
        }
        tracing::debug!(id = %source.id(), generation = self.load_generation, "begin load");
        LoadTicket {
            generation: self.load_generation,
            source,
        }
    }

    /// Apply the decode result for `ticket`.
    ///
    /// Stale tickets and disposed surfaces discard the result. A decode error resets the
    /// surface to `Empty` and is returned to the caller.
    #[tracing::instrument(skip_all, fields(generation = ticket.generation))]
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        decoded: SnapResult<Bitmap>,
    ) -> SnapResult<Applied> {
        if self.state == SurfaceState::Disposed || ticket.generation != self.load_generation {
            tracing::debug!(current = self.load_generation, "discarding stale load");
            return Ok(Applied::Discarded);
        }
        let bitmap = match decoded {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(%err, "image load failed");
                self.state = SurfaceState::Empty;
                self.source = None;
                return Err(err);
            }
        };

        let intrinsic = bitmap.size();
        self.intrinsic = Some(intrinsic);
        self.background = Some(Background {
            bitmap: Arc::new(bitmap),
            filter_id: ORIGINAL_FILTER.to_string(),
        });
        self.fit = Some(self.compute_fit(intrinsic));
        self.state = SurfaceState::Ready;
        tracing::info!(
            width = intrinsic.width,
            height = intrinsic.height,
            scale = self.fit.map(|f| f.scale),
            "background placed"
        );
        Ok(Applied::Applied)
    }

    /// Load `source` synchronously: begin, decode, complete.
    pub fn load(&mut self, source: ImageSource) -> SnapResult<Applied> {
        self.ensure_live()?;
        let ticket = self.begin_load(source);
        let decoded = ticket.source().decode();
        self.complete_load(ticket, decoded)
    }

    fn compute_fit(&self, intrinsic: PixelSize) -> FitResult {
        fit_with_margin(
            intrinsic,
            self.viewport,
            self.opts.fit_mode,
            self.opts.margin_factor,
        )
    }

    /// Start rebuilding the background with `filter_id`. Supersedes any rebuild in flight.
    pub fn request_filter(&mut self, filter_id: &str) -> SnapResult<FilterTicket> {
        self.ensure_live()?;
        let (SurfaceState::Ready, Some(source)) = (self.state, self.source.clone()) else {
            return Err(SnapError::validation("no image loaded"));
        };
        self.filter_generation += 1;
        Ok(FilterTicket {
            generation: self.filter_generation,
            load_generation: self.load_generation,
            filter_id: filter_id.to_string(),
            source,
        })
    }

    /// Swap in the rebuilt background for `ticket`, refit and re-clamp auto-placed overlays.
    ///
    /// Only the latest request takes effect. A failed rebuild keeps the current background.
    #[tracing::instrument(skip_all, fields(filter = %ticket.filter_id))]
    pub fn complete_filter(
        &mut self,
        ticket: FilterTicket,
        rebuilt: SnapResult<Bitmap>,
    ) -> SnapResult<Applied> {
        if self.state != SurfaceState::Ready
            || ticket.generation != self.filter_generation
            || ticket.load_generation != self.load_generation
        {
            tracing::debug!("discarding stale filter rebuild");
            return Ok(Applied::Discarded);
        }
        let bitmap = rebuilt.inspect_err(|err| {
            tracing::warn!(%err, "filter rebuild failed, keeping current background");
        })?;

        // Old background is dropped here, never reused.
        self.background = Some(Background {
            bitmap: Arc::new(bitmap),
            filter_id: ticket.filter_id,
        });
        if let Some(intrinsic) = self.intrinsic {
            self.fit = Some(self.compute_fit(intrinsic));
        }
        self.reclamp_auto_overlays();
        Ok(Applied::Applied)
    }

    /// Rebuild the background with `filter_id` synchronously from the original source.
    pub fn set_filter(&mut self, filter_id: &str) -> SnapResult<Applied> {
        let ticket = self.request_filter(filter_id)?;
        let rebuilt = apply_filter(ticket.source(), ticket.filter_id());
        self.complete_filter(ticket, rebuilt)
    }

    /// Adopt a new viewport: refit, remap every overlay into the new image rect, re-clamp
    /// auto-placed ones. Overlays are never added or removed.
    ///
    /// Returns `false` (and changes nothing) for a degenerate viewport or a disposed surface.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if self.state == SurfaceState::Disposed || viewport.is_degenerate() {
            tracing::debug!(?viewport, "ignoring resize");
            return false;
        }
        self.viewport = viewport;
        let (Some(intrinsic), Some(old)) = (self.intrinsic, self.fit) else {
            return true;
        };
        let new = self.compute_fit(intrinsic);
        self.fit = Some(new);

        let old_rect = old.image_rect();
        let new_rect = new.image_rect();
        let ratio = if old.scale > 0.0 { new.scale / old.scale } else { 1.0 };
        for o in &mut self.overlays {
            o.transform.center = remap_point(o.transform.center, old_rect, new_rect);
            o.transform.scale *= ratio;
        }
        self.reclamp_auto_overlays();
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            scale = new.scale,
            "refit after resize"
        );
        true
    }

    /// Pull every auto-placed overlay back inside the current safe rect.
    ///
    /// Returns the number of overlays moved.
    pub fn reclamp_auto_overlays(&mut self) -> usize {
        let Some(rect) = self.image_rect() else {
            return 0;
        };
        let autos: Vec<(OverlayId, Point)> = self
            .overlays
            .iter()
            .filter(|o| o.is_auto_placed())
            .map(|o| (o.id, o.transform.center))
            .collect();
        let moved = reclamp(
            &autos,
            rect,
            self.opts.placement.edge_margin_px,
            self.opts.placement.reclamp_epsilon_px,
        );
        for (id, p) in &moved {
            if let Some(o) = self.overlays.iter_mut().find(|o| o.id == *id) {
                o.transform.center = *p;
            }
        }
        if !moved.is_empty() {
            tracing::debug!(moved = moved.len(), "re-clamped auto-placed overlays");
        }
        moved.len()
    }

    /// Add an overlay on top of the others.
    pub fn add_overlay(
        &mut self,
        kind: OverlayKind,
        transform: OverlayTransform,
    ) -> SnapResult<OverlayId> {
        self.ensure_live()?;
        let id = OverlayId(self.next_overlay);
        self.next_overlay += 1;
        let mut transform = transform;
        if matches!(kind, OverlayKind::AutoDecoration { .. })
            && let Some(rect) = self.image_rect()
        {
            transform.center =
                clamp_to_safe_rect(transform.center, rect, self.opts.placement.edge_margin_px);
        }
        self.overlays.push(Overlay {
            id,
            transform,
            kind,
        });
        Ok(id)
    }

    /// Remove an overlay. Clears the selection if it pointed at it.
    pub fn remove_overlay(&mut self, id: OverlayId) -> Option<Overlay> {
        let idx = self.overlays.iter().position(|o| o.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.overlays.remove(idx))
    }

    /// Move an overlay's center.
    pub fn move_overlay(&mut self, id: OverlayId, center: Point) -> bool {
        self.overlay_mut(id)
            .map(|o| o.transform.center = center)
            .is_some()
    }

    /// Replace an overlay's transform.
    pub fn set_overlay_transform(&mut self, id: OverlayId, transform: OverlayTransform) -> bool {
        self.overlay_mut(id)
            .map(|o| o.transform = transform)
            .is_some()
    }

    fn overlay_mut(&mut self, id: OverlayId) -> Option<&mut Overlay> {
        self.overlays.iter_mut().find(|o| o.id == id)
    }

    /// Remove every overlay, keeping the background. Returns how many were removed.
    pub fn clear_overlays(&mut self) -> usize {
        let n = self.overlays.len();
        self.overlays.clear();
        self.selected = None;
        n
    }

    /// Remove every auto-placed overlay. Returns how many were removed.
    pub fn clear_auto_overlays(&mut self) -> usize {
        let before = self.overlays.len();
        self.overlays.retain(|o| !o.is_auto_placed());
        if self
            .selected
            .is_some_and(|id| self.overlays.iter().all(|o| o.id != id))
        {
            self.selected = None;
        }
        before - self.overlays.len()
    }

    /// Select an overlay. Returns `false` for unknown ids.
    pub fn select(&mut self, id: OverlayId) -> bool {
        if self.overlay(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Selected overlay id.
    pub fn selected(&self) -> Option<OverlayId> {
        self.selected
    }

    /// Anchor of the delete affordance: top-right corner of the selected overlay's bounding
    /// box. `None` when nothing is selected.
    pub fn delete_affordance(&self) -> Option<Point> {
        let o = self.overlay(self.selected?)?;
        let bbox = o.bounding_box();
        Some(Point::new(bbox.x1, bbox.y0))
    }

    /// Delete the selected overlay (never the background).
    pub fn delete_selected(&mut self) -> Option<Overlay> {
        let id = self.selected.take()?;
        self.remove_overlay(id)
    }

    /// Keyboard handling: Delete/Backspace delete the selection, Escape deselects.
    ///
    /// Returns `true` if the key changed the surface.
    pub fn handle_key(&mut self, key: EditKey) -> bool {
        match key {
            EditKey::Delete | EditKey::Backspace => self.delete_selected().is_some(),
            EditKey::Escape => self.selected.take().is_some(),
            EditKey::Other => false,
        }
    }

    pub(crate) fn pending_retry(&self) -> Option<PendingRetry> {
        self.pending_retry
    }

    pub(crate) fn schedule_retry(&mut self, record: ContentId, force: bool, now: Instant) {
        self.pending_retry = Some(PendingRetry {
            record,
            force,
            due: now + Duration::from_millis(self.opts.retry_delay_ms),
        });
    }

    pub(crate) fn take_pending_retry(&mut self) -> Option<PendingRetry> {
        self.pending_retry.take()
    }

    /// When the pending auto-placement retry becomes due.
    pub fn retry_due(&self) -> Option<Instant> {
        self.pending_retry.map(|r| r.due)
    }

    /// Drop the current image and its overlays, back to `Empty`. In-flight results are
    /// invalidated.
    pub fn unload(&mut self) {
        self.load_generation += 1;
        self.filter_generation += 1;
        if self.state == SurfaceState::Disposed {
            return;
        }
        self.state = SurfaceState::Empty;
        self.source = None;
        self.intrinsic = None;
        self.background = None;
        self.fit = None;
        self.overlays.clear();
        self.selected = None;
        self.pending_retry = None;
    }

    /// Tear the surface down, releasing the background and overlays. Idempotent.
    pub fn dispose(&mut self) {
        if self.state == SurfaceState::Disposed {
            return;
        }
        self.state = SurfaceState::Disposed;
        self.source = None;
        self.intrinsic = None;
        self.background = None;
        self.fit = None;
        self.overlays.clear();
        self.selected = None;
        self.pending_retry = None;
        tracing::debug!("surface disposed");
    }
}

fn remap_point(p: Point, from: Rect, to: Rect) -> Point {
    let rel = |v: f64, lo: f64, len: f64| if len > 0.0 { (v - lo) / len } else { 0.5 };
    Point::new(
        to.x0 + rel(p.x, from.x0, from.width()) * to.width(),
        to.y0 + rel(p.y, from.y0, from.height()) * to.height(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/surface.rs"]
mod tests;
