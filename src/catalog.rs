use crate::error::BoothResult;
use crate::filter::{ColorMatrix, FilterOp, bake_ops};

/// One entry of the fixed filter catalog. The op list is the filter's
/// transform spec, applied in declared order at capture time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FilterDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub badge_glyph: &'static str,
    pub ops: &'static [FilterOp],
}

impl FilterDescriptor {
    pub fn matrix(&self) -> BoothResult<ColorMatrix> {
        bake_ops(self.ops)
    }
}

const CATALOG: &[FilterDescriptor] = &[
    FilterDescriptor {
        name: "none",
        label: "Original",
        badge_glyph: "📷",
        ops: &[],
    },
    FilterDescriptor {
        name: "sepia",
        label: "Sepia",
        badge_glyph: "🏜️",
        ops: &[FilterOp::Sepia { amount: 1.0 }],
    },
    FilterDescriptor {
        name: "grayscale",
        label: "B&W",
        badge_glyph: "⚫",
        ops: &[FilterOp::Grayscale { amount: 1.0 }],
    },
    FilterDescriptor {
        name: "vintage",
        label: "Vintage",
        badge_glyph: "📻",
        ops: &[
            FilterOp::Sepia { amount: 0.5 },
            FilterOp::Contrast { factor: 1.2 },
            FilterOp::Brightness { factor: 1.1 },
        ],
    },
    FilterDescriptor {
        name: "cartoon",
        label: "Cartoon",
        badge_glyph: "🎨",
        ops: &[
            FilterOp::Contrast { factor: 1.5 },
            FilterOp::Saturate { factor: 2.0 },
            FilterOp::Brightness { factor: 1.1 },
        ],
    },
    FilterDescriptor {
        name: "sparkle",
        label: "Sparkle",
        badge_glyph: "✨",
        ops: &[
            FilterOp::Saturate { factor: 1.5 },
            FilterOp::Brightness { factor: 1.2 },
            FilterOp::HueRotate { degrees: 15.0 },
        ],
    },
    FilterDescriptor {
        name: "neon",
        label: "Neon",
        badge_glyph: "🌈",
        ops: &[
            FilterOp::Saturate { factor: 2.0 },
            FilterOp::Contrast { factor: 1.5 },
            FilterOp::Brightness { factor: 1.3 },
            FilterOp::HueRotate { degrees: 90.0 },
        ],
    },
    FilterDescriptor {
        name: "alien",
        label: "Alien",
        badge_glyph: "👽",
        ops: &[
            FilterOp::HueRotate { degrees: 180.0 },
            FilterOp::Saturate { factor: 2.0 },
            FilterOp::Contrast { factor: 1.2 },
        ],
    },
    FilterDescriptor {
        name: "zombie",
        label: "Zombie",
        badge_glyph: "🧟",
        ops: &[
            FilterOp::Sepia { amount: 0.8 },
            FilterOp::HueRotate { degrees: 60.0 },
            FilterOp::Saturate { factor: 1.5 },
            FilterOp::Contrast { factor: 1.3 },
        ],
    },
    FilterDescriptor {
        name: "royal",
        label: "Royal",
        badge_glyph: "👑",
        ops: &[
            FilterOp::HueRotate { degrees: 270.0 },
            FilterOp::Saturate { factor: 1.5 },
            FilterOp::Brightness { factor: 1.1 },
        ],
    },
    FilterDescriptor {
        name: "fire",
        label: "Fire",
        badge_glyph: "🔥",
        ops: &[
            FilterOp::HueRotate { degrees: 20.0 },
            FilterOp::Saturate { factor: 2.0 },
            FilterOp::Contrast { factor: 1.4 },
            FilterOp::Brightness { factor: 1.2 },
        ],
    },
    FilterDescriptor {
        name: "ice",
        label: "Ice",
        badge_glyph: "❄️",
        ops: &[
            FilterOp::HueRotate { degrees: 180.0 },
            FilterOp::Saturate { factor: 1.2 },
            FilterOp::Brightness { factor: 1.3 },
            FilterOp::Contrast { factor: 1.1 },
        ],
    },
];

/// The full catalog, in presentation order. Stable across calls.
pub fn filters() -> &'static [FilterDescriptor] {
    CATALOG
}

pub fn resolve(name: &str) -> Option<&'static FilterDescriptor> {
    CATALOG.iter().find(|f| f.name == name)
}

/// The unfiltered entry, first in the catalog.
pub fn default_filter() -> &'static FilterDescriptor {
    &CATALOG[0]
}
