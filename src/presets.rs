// ============================================================================
// PRESETS — fixed named combinations of adjustments and filters
// ============================================================================

use crate::pipeline::{Adjustment, Filter};

/// A named look: the adjustment values and filters it installs. Applying a
/// preset always starts from a full reset, so fields a preset does not
/// mention stay neutral.
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub adjustments: &'static [(Adjustment, f32)],
    pub filters: &'static [Filter],
}

/// The built-in preset table. Order is the display order in the UI.
pub const PRESETS: &[Preset] = &[
    Preset {
        id: "vintage",
        label: "Vintage",
        adjustments: &[
            (Adjustment::Saturation, -30.0),
            (Adjustment::Brightness, 10.0),
            (Adjustment::Contrast, 10.0),
        ],
        filters: &[Filter::Sepia, Filter::Noise],
    },
    Preset {
        id: "dramatic",
        label: "Dramatic",
        adjustments: &[
            (Adjustment::Contrast, 40.0),
            (Adjustment::Brightness, -10.0),
        ],
        filters: &[Filter::Sharpen],
    },
    Preset {
        id: "portrait",
        label: "Portrait",
        adjustments: &[
            (Adjustment::Brightness, 15.0),
            (Adjustment::Contrast, 20.0),
            (Adjustment::Saturation, -10.0),
        ],
        filters: &[Filter::Blur],
    },
    Preset {
        id: "cool",
        label: "Cool",
        adjustments: &[(Adjustment::Hue, 15.0), (Adjustment::Saturation, 20.0)],
        filters: &[Filter::Grayscale],
    },
];

/// Case-insensitive lookup by preset id.
pub fn find(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(find("vintage").is_some());
        assert!(find("Vintage").is_some());
        assert!(find("noir").is_none());
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in PRESETS.iter().enumerate() {
            for b in &PRESETS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn all_preset_values_are_in_range() {
        for preset in PRESETS {
            for (adj, value) in preset.adjustments {
                let (min, max) = adj.range();
                assert!(
                    *value >= min && *value <= max,
                    "{}: {} out of range",
                    preset.id,
                    adj.label()
                );
            }
        }
    }
}
