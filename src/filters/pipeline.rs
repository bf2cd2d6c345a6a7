use smallvec::SmallVec;

use crate::assets::decode::Bitmap;
use crate::assets::source::ImageSource;
use crate::filters::catalog::{Adjustment, adjustments_for};
use crate::foundation::error::SnapResult;

/// Row-major 4x5 color matrix over straight RGBA in 0..255 channel space.
///
/// Layout matches the usual SVG/CSS form: rows r,g,b,a; columns r,g,b,a,offset.
type ColorMatrix = [f32; 20];

/// An adjustment with its per-pixel constants precomputed.
#[derive(Clone, Copy, Debug)]
enum PixelOp {
    Matrix(ColorMatrix),
    Saturation { adjust: f32 },
}

/// Decode `source` fresh and apply the filter `filter_id` to it.
///
/// Never reads a previously displayed bitmap: the result for a given `(source, filter_id)` is
/// identical regardless of which filters ran before. Unknown ids produce the unfiltered image.
#[tracing::instrument(skip(source), fields(source = %source.id()))]
pub fn apply_filter(source: &ImageSource, filter_id: &str) -> SnapResult<Bitmap> {
    let mut bitmap = source.decode()?;
    apply_adjustments(&mut bitmap, adjustments_for(filter_id));
    Ok(bitmap)
}

/// Apply `adjustments` in order to a premultiplied bitmap in place.
///
/// Each step reads the previous step's output, rounded and clamped to 0..255 like an 8-bit
/// pixel buffer. Alpha is untouched.
pub fn apply_adjustments(bitmap: &mut Bitmap, adjustments: &[Adjustment]) {
    if adjustments.is_empty() {
        return;
    }
    let ops = compile_ops(adjustments);
    for px in bitmap.rgba8_premul.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            continue;
        }
        let af = f32::from(a);

        // premul -> straight
        let mut c = [
            (f32::from(px[0]) * 255.0 / af).round().min(255.0),
            (f32::from(px[1]) * 255.0 / af).round().min(255.0),
            (f32::from(px[2]) * 255.0 / af).round().min(255.0),
        ];
        for op in &ops {
            c = op.apply(c);
        }

        // straight -> premul
        for i in 0..3 {
            px[i] = ((c[i] * af) / 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn compile_ops(adjustments: &[Adjustment]) -> SmallVec<[PixelOp; 4]> {
    adjustments
        .iter()
        .map(|adj| match *adj {
            Adjustment::Brightness(v) => PixelOp::Matrix(brightness_matrix(v)),
            Adjustment::Contrast(v) => PixelOp::Matrix(contrast_matrix(v)),
            Adjustment::Saturation(v) => PixelOp::Saturation { adjust: -v },
            Adjustment::HueRotation(v) => PixelOp::Matrix(hue_rotation_matrix(v)),
            Adjustment::Sepia => PixelOp::Matrix(SEPIA),
            Adjustment::Grayscale => PixelOp::Matrix(GRAYSCALE_AVERAGE),
        })
        .collect()
}

impl PixelOp {
    fn apply(self, [r, g, b]: [f32; 3]) -> [f32; 3] {
        let out = match self {
            Self::Matrix(m) => [
                m[0] * r + m[1] * g + m[2] * b + m[4],
                m[5] * r + m[6] * g + m[7] * b + m[9],
                m[10] * r + m[11] * g + m[12] * b + m[14],
            ],
            Self::Saturation { adjust } => {
                let max = r.max(g).max(b);
                let push = |c: f32| if c == max { c } else { c + (max - c) * adjust };
                [push(r), push(g), push(b)]
            }
        };
        out.map(|c| c.round().clamp(0.0, 255.0))
    }
}

const IDENTITY: ColorMatrix = [
    1.0, 0.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];

const SEPIA: ColorMatrix = [
    0.393, 0.769, 0.189, 0.0, 0.0, //
    0.349, 0.686, 0.168, 0.0, 0.0, //
    0.272, 0.534, 0.131, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];

const THIRD: f32 = 1.0 / 3.0;

const GRAYSCALE_AVERAGE: ColorMatrix = [
    THIRD, THIRD, THIRD, 0.0, 0.0, //
    THIRD, THIRD, THIRD, 0.0, 0.0, //
    THIRD, THIRD, THIRD, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];

fn brightness_matrix(v: f32) -> ColorMatrix {
    let offset = (v * 255.0).round();
    let mut m = IDENTITY;
    m[4] = offset;
    m[9] = offset;
    m[14] = offset;
    m
}

fn contrast_matrix(v: f32) -> ColorMatrix {
    let k = (v * 255.0).floor();
    let f = 259.0 * (k + 255.0) / (255.0 * (259.0 - k));
    let offset = 128.0 * (1.0 - f);
    let mut m = IDENTITY;
    m[0] = f;
    m[6] = f;
    m[12] = f;
    m[4] = offset;
    m[9] = offset;
    m[14] = offset;
    m
}

fn hue_rotation_matrix(v: f32) -> ColorMatrix {
    let rad = v * std::f32::consts::PI;
    let (sin, cos) = rad.sin_cos();
    let one_minus_cos = 1.0 - cos;
    let third_sqrt_sin = THIRD.sqrt() * sin;
    let diag = cos + THIRD * one_minus_cos;
    let plus = THIRD * one_minus_cos + third_sqrt_sin;
    let minus = THIRD * one_minus_cos - third_sqrt_sin;
    [
        diag, minus, plus, 0.0, 0.0, //
        plus, diag, minus, 0.0, 0.0, //
        minus, plus, diag, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/filters/pipeline.rs"]
mod tests;
