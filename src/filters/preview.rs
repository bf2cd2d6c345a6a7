use image::imageops::FilterType;

use crate::assets::decode::Bitmap;
use crate::assets::source::ImageSource;
use crate::filters::catalog::{FilterPreset, list_filters};
use crate::filters::pipeline::apply_adjustments;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SnapError, SnapResult};

/// Default edge length of picker thumbnails.
pub const DEFAULT_PREVIEW_SIZE: u32 = 80;

/// One picker thumbnail.
#[derive(Clone, Debug)]
pub struct FilterPreview {
    /// Catalog id of the filter.
    pub filter_id: &'static str,
    /// Display name of the filter.
    pub name: &'static str,
    /// `size x size` premultiplied thumbnail.
    pub thumbnail: Bitmap,
    /// `true` when the entry failed and `thumbnail` is a transparent stand-in.
    pub placeholder: bool,
}

/// Render a thumbnail for every catalog filter, in catalog order.
///
/// Each entry decodes its own copy of the source and resolves independently: a failure yields a
/// placeholder for that entry and never affects the others.
pub fn generate_filter_previews(source: &ImageSource, size: u32) -> Vec<FilterPreview> {
    generate_previews_for(list_filters(), size, |preset| {
        render_preview(source, preset, size)
    })
}

fn generate_previews_for(
    presets: &'static [FilterPreset],
    size: u32,
    mut render: impl FnMut(&FilterPreset) -> SnapResult<Bitmap>,
) -> Vec<FilterPreview> {
    let size = size.max(1);
    presets
        .iter()
        .map(|preset| match render(preset) {
            Ok(thumbnail) => FilterPreview {
                filter_id: preset.id,
                name: preset.name,
                thumbnail,
                placeholder: false,
            },
            Err(err) => {
                tracing::warn!(filter = preset.id, %err, "filter preview failed");
                FilterPreview {
                    filter_id: preset.id,
                    name: preset.name,
                    thumbnail: Bitmap::filled(size, size, Rgba8Premul::transparent()),
                    placeholder: true,
                }
            }
        })
        .collect()
}

fn render_preview(source: &ImageSource, preset: &FilterPreset, size: u32) -> SnapResult<Bitmap> {
    let size = size.max(1);
    let decoded = source.decode()?;
    let (w, h) = (decoded.width.max(1), decoded.height.max(1));
    let scale = (f64::from(size) / f64::from(w)).min(f64::from(size) / f64::from(h));
    let tw = ((f64::from(w) * scale).round() as u32).clamp(1, size);
    let th = ((f64::from(h) * scale).round() as u32).clamp(1, size);

    let buf = image::RgbaImage::from_raw(decoded.width, decoded.height, decoded.rgba8_premul)
        .ok_or_else(|| SnapError::decode("decoded buffer does not match its size"))?;
    // Premultiplied data filters correctly under resampling.
    let resized = image::imageops::resize(&buf, tw, th, FilterType::Triangle);
    let mut thumb = Bitmap::from_premul(tw, th, resized.into_raw())?;
    apply_adjustments(&mut thumb, preset.adjustments);

    let mut out = Bitmap::filled(size, size, Rgba8Premul::transparent());
    let ox = (size - tw) / 2;
    let oy = (size - th) / 2;
    let row = (tw as usize) * 4;
    for y in 0..th as usize {
        let src = &thumb.rgba8_premul[y * row..(y + 1) * row];
        let start = ((oy as usize + y) * size as usize + ox as usize) * 4;
        out.rgba8_premul[start..start + row].copy_from_slice(src);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/preview.rs"]
mod tests;
