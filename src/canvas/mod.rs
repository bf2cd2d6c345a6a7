//! The composition surface and the overlays it owns.

pub(crate) mod overlay;
pub(crate) mod resize;
pub(crate) mod stickers;
pub(crate) mod surface;
