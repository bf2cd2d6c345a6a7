//! Snapframe is a photo canvas composition engine.
//!
//! It loads a photo, fits it into a resizable viewport, rebuilds it through color filters,
//! auto-places decoration emoji in non-overlapping safe zones, lets the caller add, move and
//! delete stickers and text, and exports a flattened PNG at twice the on-screen size.
//!
//! # Pipeline overview
//!
//! 1. **Ingest**: [`ImageSource`] -> [`MediaRecord`] (content id, caption, decoration candidates)
//! 2. **Load**: the [`CompositionSurface`] decodes the source, captures its intrinsic size and
//!    fits it ([`fit`]) into the viewport
//! 3. **Filter**: [`apply_filter`] rebuilds the background from the original bytes, never from
//!    the displayed bitmap
//! 4. **Place**: [`auto_place`] maps safe-zone positions into the image rectangle; resizes and
//!    filter changes re-clamp them
//! 5. **Export**: [`ExportRenderer`] flattens background and overlays with `vello_cpu`
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded**: async boundaries are modelled with liveness tickets
//!   ([`LoadTicket`], [`FilterTicket`]); stale results are discarded, never applied.
//! - **Premultiplied RGBA8** end-to-end.
//! - **No ambient state**: export is a method on the surface, the store and caption service are
//!   passed in explicitly.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod canvas;
mod caption;
mod filters;
mod foundation;
mod geometry;
mod media;
mod placement;
mod render;
mod session;

pub use assets::decode::{Bitmap, decode_image, parse_svg};
pub use assets::source::{ContentId, ImageSource};
pub use assets::svg_raster::rasterize_svg;
pub use canvas::overlay::{Overlay, OverlayId, OverlayKind, OverlayTransform, StickerArt};
pub use canvas::resize::{DEFAULT_RESIZE_QUIET, ResizeDebouncer};
pub use canvas::stickers::{
    LIBRARY_STICKER_FONT_PX, LibrarySticker, RASTER_STICKER_SCALE, SVG_STICKER_PX,
    StickerCategory, library_sticker, sticker_from_bytes, sticker_library, stickers_by_category,
};
pub use canvas::surface::{
    Applied, Background, CompositionSurface, EditKey, FilterTicket, LoadTicket, SurfaceOpts,
    SurfaceState,
};
pub use caption::client::{
    CaptionClientOpts, CaptionResponse, CaptionService, DEFAULT_API_URL, HealthResponse,
    HttpCaptionClient,
};
pub use filters::catalog::{
    Adjustment, FilterPreset, ORIGINAL_FILTER, adjustments_for, filter_preset, list_filters,
};
pub use filters::pipeline::{apply_adjustments, apply_filter};
pub use filters::preview::{DEFAULT_PREVIEW_SIZE, FilterPreview, generate_filter_previews};
pub use foundation::core::{Affine, PixelSize, Point, Rect, Rgba8Premul, Size, Vec2, Viewport};
pub use foundation::error::{SnapError, SnapResult};
pub use geometry::fit::{
    DEFAULT_MARGIN_FACTOR, FitMode, FitResult, OVERFLOW_TOLERANCE, fit, fit_with_margin,
};
pub use media::ingest::{Ingested, ingest};
pub use media::record::{MediaKind, MediaRecord};
pub use media::store::{
    InMemoryStore, JsonFileStore, MediaStore, StoreDocument, TAIL_MATCH_CHARS, UserProfile,
    UserRole,
};
pub use placement::auto::{AutoPlacement, auto_place, retry_pending_placement};
pub use placement::candidates::{keyword_emojis, merge_candidates};
pub use placement::safe_zone::{
    MAX_PLACEMENT_COUNT, MIN_PLACEMENT_COUNT, MIN_SEPARATION_PERCENT, PercentPoint,
    PlacementOpts, clamp_to_safe_rect, generate_safe_zone_positions, map_to_image_bounds,
    reclamp,
};
pub use render::export::{DEFAULT_EXPORT_MULTIPLIER, ExportOpts, ExportRenderer};
pub use session::editor::EditorSession;
