//! Selection inputs for pricing.
//!
//! A selection is the structured form of one add-or-edit action. It is stored
//! on the priced row so that an edit rehydrates from data, not from labels.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{PipeCoefficient, PipeMaterial};
use crate::error::PricingError;

pub const DEFAULT_WORK_PATH: &str = "cleaning.sand_blasting.sa2";

fn default_percent() -> u8 {
    100
}

/// Paint/cleaning work selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSelection {
    /// Dotted catalog path of the base price item
    pub path: String,
    /// Coverage of the section area, 1-100 (area-unit items only)
    #[serde(default = "default_percent")]
    pub percent: u8,
    /// Explicit count for non-area items (defaults to 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub painting: PaintingModifiers,
    #[serde(default)]
    pub conditions: BTreeSet<SiteCondition>,
}

impl WorkSelection {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            percent: default_percent(),
            quantity: None,
            painting: PaintingModifiers::default(),
            conditions: BTreeSet::new(),
        }
    }

    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = percent;
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_painting(mut self, painting: PaintingModifiers) -> Self {
        self.painting = painting;
        self
    }

    pub fn with_condition(mut self, condition: SiteCondition) -> Self {
        self.conditions.insert(condition);
        self
    }

    /// Clear coverage and all modifiers, keeping the chosen item.
    pub fn reset_modifiers(&mut self) {
        self.percent = default_percent();
        self.painting = PaintingModifiers::default();
        self.conditions.clear();
    }
}

impl Default for WorkSelection {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_PATH)
    }
}

/// Painting-specific modifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintingModifiers {
    /// Two-component (epoxy) paint instead of single-component
    #[serde(default)]
    pub double_component: bool,
    #[serde(default)]
    pub dft150: bool,
    #[serde(default)]
    pub dft200: bool,
    /// Free-form dry-film thickness in microns; overrides both tier flags
    #[serde(default)]
    pub custom_dft: Option<u32>,
}

impl PaintingModifiers {
    /// Custom thickness, treating zero as "not entered".
    pub fn custom_microns(&self) -> Option<u32> {
        self.custom_dft.filter(|microns| *microns > 0)
    }
}

/// General site-condition flags.
///
/// Declaration order is the order their ratios are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteCondition {
    Framework,
    Confined,
    Hold,
    IcePaint,
    Dft800,
    Dft1500,
    MetalStructures,
    Lifting,
    HatchCovers,
    DeckSaturation,
}

impl SiteCondition {
    pub const ALL: [SiteCondition; 10] = [
        SiteCondition::Framework,
        SiteCondition::Confined,
        SiteCondition::Hold,
        SiteCondition::IcePaint,
        SiteCondition::Dft800,
        SiteCondition::Dft1500,
        SiteCondition::MetalStructures,
        SiteCondition::Lifting,
        SiteCondition::HatchCovers,
        SiteCondition::DeckSaturation,
    ];

    /// Short key of the matching ratio in the catalog's `ratios` section
    pub fn ratio_key(&self) -> &'static str {
        match self {
            SiteCondition::Framework => "framework",
            SiteCondition::Confined => "confined",
            SiteCondition::Hold => "hold",
            SiteCondition::IcePaint => "ice_paint",
            SiteCondition::Dft800 => "dft800",
            SiteCondition::Dft1500 => "dft1500",
            SiteCondition::MetalStructures => "metal_structures",
            SiteCondition::Lifting => "lifting",
            SiteCondition::HatchCovers => "hatch_covers",
            SiteCondition::DeckSaturation => "deck_saturation",
        }
    }
}

impl fmt::Display for SiteCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ratio_key())
    }
}

impl FromStr for SiteCondition {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace('-', "_");
        SiteCondition::ALL
            .into_iter()
            .find(|c| c.ratio_key().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                PricingError::invalid_input("condition", format!("unknown site condition \"{}\"", s))
            })
    }
}

/// Pipe work selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeSelection {
    pub material: PipeMaterial,
    /// Nominal diameter (DN, mm)
    pub diameter: u32,
    /// Run length in mm
    pub length_mm: u32,
    /// Number of identical pieces
    pub pieces: u32,
    #[serde(default)]
    pub flanges: u32,
    #[serde(default)]
    pub elbows: u32,
    #[serde(default)]
    pub coefficients: BTreeSet<PipeCoefficient>,
}

impl Default for PipeSelection {
    fn default() -> Self {
        Self {
            material: PipeMaterial::Black,
            diameter: 20,
            length_mm: 1000,
            pieces: 1,
            flanges: 0,
            elbows: 0,
            coefficients: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reset_modifiers_keeps_item() {
        let mut selection = WorkSelection::new("painting.full_single")
            .with_percent(40)
            .with_quantity(dec!(3))
            .with_painting(PaintingModifiers {
                double_component: true,
                dft150: true,
                dft200: false,
                custom_dft: Some(180),
            })
            .with_condition(SiteCondition::Confined);

        selection.reset_modifiers();

        assert_eq!(selection.path, "painting.full_single");
        assert_eq!(selection.percent, 100);
        assert_eq!(selection.quantity, Some(dec!(3)));
        assert_eq!(selection.painting, PaintingModifiers::default());
        assert!(selection.conditions.is_empty());
    }

    #[test]
    fn test_custom_microns_ignores_zero() {
        let painting = PaintingModifiers {
            custom_dft: Some(0),
            ..Default::default()
        };
        assert_eq!(painting.custom_microns(), None);

        let painting = PaintingModifiers {
            custom_dft: Some(250),
            ..Default::default()
        };
        assert_eq!(painting.custom_microns(), Some(250));
    }

    #[test]
    fn test_conditions_iterate_in_enumeration_order() {
        let selection = WorkSelection::default()
            .with_condition(SiteCondition::DeckSaturation)
            .with_condition(SiteCondition::Framework)
            .with_condition(SiteCondition::Lifting);
        let keys: Vec<&str> = selection.conditions.iter().map(|c| c.ratio_key()).collect();
        assert_eq!(keys, vec!["framework", "lifting", "deck_saturation"]);
    }

    #[test]
    fn test_site_condition_from_str() {
        assert_eq!(
            "ice-paint".parse::<SiteCondition>().unwrap(),
            SiteCondition::IcePaint
        );
        assert_eq!(
            "HATCH_COVERS".parse::<SiteCondition>().unwrap(),
            SiteCondition::HatchCovers
        );
        assert!("swamp".parse::<SiteCondition>().is_err());
    }

    #[test]
    fn test_work_selection_defaults_from_json() {
        let selection: WorkSelection =
            serde_json::from_str(r#"{ "path": "other.drum_disposal" }"#).unwrap();
        assert_eq!(selection.percent, 100);
        assert_eq!(selection.quantity, None);
        assert!(selection.conditions.is_empty());
    }
}
