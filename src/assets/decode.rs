use std::io::Cursor;

use crate::foundation::core::{PixelSize, Rgba8Premul};
use crate::foundation::error::{SnapError, SnapResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// Raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Vec<u8>,
}

impl Bitmap {
    /// A bitmap filled with one color.
    pub fn filled(width: u32, height: u32, color: Rgba8Premul) -> Self {
        let px = color.to_array();
        let mut rgba8_premul = vec![0u8; PixelSize::new(width, height).rgba8_len()];
        for c in rgba8_premul.chunks_exact_mut(4) {
            c.copy_from_slice(&px);
        }
        Self {
            width,
            height,
            rgba8_premul,
        }
    }

    /// Wrap premultiplied bytes, checking the length.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> SnapResult<Self> {
        if rgba8_premul.len() != PixelSize::new(width, height).rgba8_len() {
            return Err(SnapError::validation(format!(
                "bitmap byte len {} does not match {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul,
        })
    }

    /// Pixel dimensions.
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Premultiplied pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = &self.rgba8_premul[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Encode as PNG (straight alpha, lossless).
    pub fn to_png(&self) -> SnapResult<Vec<u8>> {
        let mut straight = self.rgba8_premul.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| SnapError::validation("bitmap buffer does not match its size"))?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .map_err(|e| SnapError::Other(anyhow::Error::new(e).context("encode png")))?;
        Ok(out)
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> SnapResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| SnapError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(Bitmap {
        width,
        height,
        rgba8_premul,
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> SnapResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts).map_err(|e| SnapError::decode(format!("parse svg: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
