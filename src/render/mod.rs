//! CPU rendering of a surface scene via `vello_cpu`.

pub(crate) mod export;
pub(crate) mod raster;
pub(crate) mod text;
