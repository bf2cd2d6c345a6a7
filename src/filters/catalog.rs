/// Id of the identity filter.
pub const ORIGINAL_FILTER: &str = "original";

/// One pixel adjustment with its fixed parameter.
///
/// Parameters use the conventional ranges: `Brightness`, `Contrast` and `Saturation` are offsets
/// around 0 (roughly -1..1), `HueRotation` is a fraction of a half turn (-1..1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Adjustment {
    /// Add `value * 255` to every color channel.
    Brightness(f32),
    /// Scale channels away from (or towards) mid-gray.
    Contrast(f32),
    /// Push channels away from (or towards) the pixel's max channel.
    Saturation(f32),
    /// Rotate hue about the gray axis by `value * PI` radians.
    HueRotation(f32),
    /// Classic sepia tone matrix.
    Sepia,
    /// Channel average.
    Grayscale,
}

/// Catalog entry: id, display data and the ordered adjustments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterPreset {
    /// Stable id (`"clarendon"`).
    pub id: &'static str,
    /// Display name (`"Clarendon"`).
    pub name: &'static str,
    /// Short description for pickers.
    pub description: &'static str,
    /// Adjustments applied in order.
    pub adjustments: &'static [Adjustment],
}

static FILTER_PRESETS: &[FilterPreset] = &[
    FilterPreset {
        id: ORIGINAL_FILTER,
        name: "Original",
        description: "No filter",
        adjustments: &[],
    },
    FilterPreset {
        id: "clarendon",
        name: "Clarendon",
        description: "High contrast & vibrant",
        adjustments: &[
            Adjustment::Brightness(0.1),
            Adjustment::Contrast(0.2),
            Adjustment::Saturation(0.3),
        ],
    },
    FilterPreset {
        id: "juno",
        name: "Juno",
        description: "Cool tones & high contrast",
        adjustments: &[
            Adjustment::Contrast(0.15),
            Adjustment::Saturation(-0.2),
            Adjustment::HueRotation(0.05),
        ],
    },
    FilterPreset {
        id: "lark",
        name: "Lark",
        description: "Bright & desaturated reds",
        adjustments: &[
            Adjustment::Brightness(0.15),
            Adjustment::Saturation(-0.1),
            Adjustment::Contrast(-0.05),
        ],
    },
    FilterPreset {
        id: "valencia",
        name: "Valencia",
        description: "Warm & faded",
        adjustments: &[
            Adjustment::Brightness(0.05),
            Adjustment::Contrast(-0.05),
            Adjustment::Saturation(-0.15),
            Adjustment::HueRotation(0.02),
        ],
    },
    FilterPreset {
        id: "aden",
        name: "Aden",
        description: "Soft pastel tones",
        adjustments: &[
            Adjustment::Saturation(-0.2),
            Adjustment::Brightness(0.1),
            Adjustment::HueRotation(-0.02),
        ],
    },
    FilterPreset {
        id: "vintage",
        name: "Vintage",
        description: "Sepia & low contrast",
        adjustments: &[
            Adjustment::Sepia,
            Adjustment::Contrast(-0.1),
            Adjustment::Brightness(0.05),
        ],
    },
    FilterPreset {
        id: "grayscale",
        name: "B&W",
        description: "Classic black & white",
        adjustments: &[Adjustment::Grayscale, Adjustment::Contrast(0.1)],
    },
];

/// The whole catalog, in picker order.
pub fn list_filters() -> &'static [FilterPreset] {
    FILTER_PRESETS
}

/// Look up a preset by id.
pub fn filter_preset(id: &str) -> Option<&'static FilterPreset> {
    FILTER_PRESETS.iter().find(|p| p.id == id)
}

/// Adjustments for `id`; unknown ids resolve to the identity (no adjustments).
pub fn adjustments_for(id: &str) -> &'static [Adjustment] {
    filter_preset(id).map(|p| p.adjustments).unwrap_or(&[])
}

#[cfg(test)]
#[path = "../../tests/unit/filters/catalog.rs"]
mod tests;
