//! Image sources and decoding.
//!
//! An [`source::ImageSource`] is the immutable reference to the original encoded bytes. Every
//! bitmap the engine displays is decoded fresh from it, so filtered derivatives never feed back
//! into later work.

pub(crate) mod decode;
pub(crate) mod source;
pub(crate) mod svg_raster;
