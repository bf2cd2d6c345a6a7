use std::sync::Arc;

use crate::assets::decode::Bitmap;
use crate::foundation::core::Affine;
use crate::foundation::error::{SnapError, SnapResult};

/// Largest output edge the CPU rasterizer supports.
pub(crate) const MAX_SURFACE_DIM: u32 = u16::MAX as u32;

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn dim_u16(v: u32, what: &str) -> SnapResult<u16> {
    u16::try_from(v).map_err(|_| SnapError::geometry(format!("{what} {v} exceeds {MAX_SURFACE_DIM}")))
}

/// Wrap a premultiplied bitmap as a `vello_cpu` pixmap.
pub(crate) fn bitmap_to_pixmap(bitmap: &Bitmap) -> SnapResult<vello_cpu::Pixmap> {
    let w = dim_u16(bitmap.width, "image width")?;
    let h = dim_u16(bitmap.height, "image height")?;
    if bitmap.rgba8_premul.len() != bitmap.size().rgba8_len() {
        return Err(SnapError::validation("bitmap byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(bitmap.width as usize * bitmap.height as usize);
    for px in bitmap.rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Image paint for `bitmap` plus its size in pixels.
pub(crate) fn image_paint(bitmap: &Bitmap) -> SnapResult<(vello_cpu::Image, f64, f64)> {
    let pixmap = bitmap_to_pixmap(bitmap)?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };
    Ok((paint, f64::from(bitmap.width), f64::from(bitmap.height)))
}

pub(crate) fn pixmap_to_bitmap(pixmap: &vello_cpu::Pixmap) -> SnapResult<Bitmap> {
    Bitmap::from_premul(
        u32::from(pixmap.width()),
        u32::from(pixmap.height()),
        pixmap.data_as_u8_slice().to_vec(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
