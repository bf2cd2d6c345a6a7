use std::time::Instant;

use crate::canvas::overlay::{OverlayKind, OverlayTransform};
use crate::canvas::surface::{CompositionSurface, SurfaceState};
use crate::foundation::core::Rect;
use crate::foundation::error::SnapResult;
use crate::media::record::MediaRecord;
use crate::placement::safe_zone::{generate_safe_zone_positions, map_to_image_bounds};

/// Outcome of one auto-placement attempt. None of these are errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoPlacement {
    /// This many decorations were added and the record was marked placed.
    Placed(usize),
    /// The record was already decorated and `force` was not set.
    AlreadyPlaced,
    /// Neither the server nor the keywords produced a candidate.
    NoCandidates,
    /// The image bounds were not stable yet; one retry is scheduled.
    Deferred,
    /// The scheduled retry still found unstable bounds. Nothing was placed.
    GaveUp,
}

fn stable_rect(surface: &CompositionSurface) -> Option<Rect> {
    if surface.state() != SurfaceState::Ready {
        return None;
    }
    let rect = surface.image_rect()?;
    let min = surface.opts().placement.min_stable_bounds_px;
    (rect.width() > min && rect.height() > min).then_some(rect)
}

/// Place decorations for `record` on `surface`.
///
/// Runs at most once per record unless `force` is set; a forced run replaces the previous
/// auto-placed decorations. When the background bounds are not stable yet a single retry is
/// scheduled on the surface (see [`retry_pending_placement`]); while it is pending further calls
/// for the same record report [`AutoPlacement::Deferred`] without scheduling another.
///
/// On success `record.emojis_placed` is set; persisting it is up to the caller.
#[tracing::instrument(skip_all, fields(record = %record.id, force))]
pub fn auto_place(
    surface: &mut CompositionSurface,
    record: &mut MediaRecord,
    force: bool,
    now: Instant,
) -> SnapResult<AutoPlacement> {
    if record.emojis_placed && !force {
        tracing::debug!("decorations already placed");
        return Ok(AutoPlacement::AlreadyPlaced);
    }
    let candidates = record.candidates();
    if candidates.is_empty() {
        tracing::debug!("no decoration candidates");
        return Ok(AutoPlacement::NoCandidates);
    }
    if surface
        .pending_retry()
        .is_some_and(|r| r.record == record.id)
    {
        return Ok(AutoPlacement::Deferred);
    }
    let Some(rect) = stable_rect(surface) else {
        surface.schedule_retry(record.id, force, now);
        tracing::debug!("image bounds not stable, deferring placement");
        return Ok(AutoPlacement::Deferred);
    };
    place(surface, record, &candidates, rect, force)
}

/// Run the pending retry if it is due and belongs to `record`.
///
/// Returns `None` when there is nothing to run yet. The retry runs once: unstable bounds at
/// that point give [`AutoPlacement::GaveUp`].
pub fn retry_pending_placement(
    surface: &mut CompositionSurface,
    record: &mut MediaRecord,
    now: Instant,
) -> SnapResult<Option<AutoPlacement>> {
    let Some(pending) = surface.pending_retry() else {
        return Ok(None);
    };
    if pending.record != record.id || now < pending.due {
        return Ok(None);
    }
    surface.take_pending_retry();

    if record.emojis_placed && !pending.force {
        return Ok(Some(AutoPlacement::AlreadyPlaced));
    }
    let candidates = record.candidates();
    if candidates.is_empty() {
        return Ok(Some(AutoPlacement::NoCandidates));
    }
    let Some(rect) = stable_rect(surface) else {
        tracing::warn!(record = %record.id, "image bounds still unstable, skipping auto-placement");
        return Ok(Some(AutoPlacement::GaveUp));
    };
    place(surface, record, &candidates, rect, pending.force).map(Some)
}

fn place(
    surface: &mut CompositionSurface,
    record: &mut MediaRecord,
    candidates: &[String],
    rect: Rect,
    force: bool,
) -> SnapResult<AutoPlacement> {
    if force {
        surface.clear_auto_overlays();
    }
    let opts = surface.opts().placement;
    let positions = generate_safe_zone_positions(candidates.len());
    let points = map_to_image_bounds(
        &positions,
        rect,
        opts.inner_margin_percent,
        opts.edge_margin_px,
    );

    let mut placed = 0;
    for (emoji, center) in candidates.iter().zip(points) {
        surface.add_overlay(
            OverlayKind::AutoDecoration {
                emoji: emoji.clone(),
                font_px: opts.decoration_font_px,
            },
            OverlayTransform::at(center),
        )?;
        placed += 1;
    }
    if placed > 0 {
        record.emojis_placed = true;
    }
    tracing::info!(placed, "auto-placed decorations");
    Ok(AutoPlacement::Placed(placed))
}

#[cfg(test)]
#[path = "../../tests/unit/placement/auto.rs"]
mod tests;
