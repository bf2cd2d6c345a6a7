//! Pure geometry: fitting an intrinsic image size into a viewport.

pub(crate) mod fit;
