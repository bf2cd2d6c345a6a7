use std::time::{Duration, Instant};

use crate::foundation::core::Viewport;

/// Default quiet period before a resize is delivered.
pub const DEFAULT_RESIZE_QUIET: Duration = Duration::from_millis(100);

/// Coalesces container size notifications into one delivery per burst.
///
/// Time is passed in by the caller so the host event loop stays in charge of scheduling.
#[derive(Clone, Debug)]
pub struct ResizeDebouncer {
    quiet: Duration,
    pending: Option<(Viewport, Instant)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_QUIET)
    }
}

impl ResizeDebouncer {
    /// Debouncer with a custom quiet period.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record a size notification observed at `now`. Zero-size notifications are dropped.
    pub fn notify(&mut self, viewport: Viewport, now: Instant) {
        if viewport.is_degenerate() {
            tracing::debug!(?viewport, "dropping degenerate resize");
            return;
        }
        self.pending = Some((viewport, now));
    }

    /// When the pending size becomes deliverable, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at + self.quiet)
    }

    /// Deliver the latest size once the quiet period has passed since the last notification.
    pub fn poll(&mut self, now: Instant) -> Option<Viewport> {
        let (viewport, at) = self.pending?;
        if now.saturating_duration_since(at) < self.quiet {
            return None;
        }
        self.pending = None;
        Some(viewport)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/resize.rs"]
mod tests;
