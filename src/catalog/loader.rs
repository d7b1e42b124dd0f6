//! JSON loading for the price catalogs.
//!
//! The raw shapes mirror the data files; conversion into the typed tree
//! validates that every leaf is exactly one node kind with sane values.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::error::{PricingError, Result};

use super::models::{CatalogNode, Localized, NoteItem, PriceItem, RatioItem, RoundingRules, Unit};
use super::Catalog;

/// Default paint/cleaning pricelist shipped with the crate
pub const EMBEDDED_PRICELIST: &str = include_str!("../../data/paint-pricelist.json");

/// Default pipe pricelist shipped with the crate
pub const EMBEDDED_PIPES_PRICELIST: &str = include_str!("../../data/pipes-pricelist.json");

#[derive(Debug, Deserialize)]
struct RawCatalog {
    rules: RawRules,
    #[serde(flatten)]
    sections: BTreeMap<String, RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawRules {
    rounding: RawRounding,
    #[serde(default)]
    calculation: String,
}

#[derive(Debug, Deserialize)]
struct RawRounding {
    money: u32,
    area: Decimal,
}

// Variant order matters: leaves are tried before falling back to a section.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNode {
    Price {
        en: String,
        ru: String,
        unit: Unit,
        price: Decimal,
    },
    Ratio {
        en: String,
        ru: String,
        #[serde(rename = "type")]
        kind: String,
        value: Decimal,
        #[serde(default)]
        description: Option<String>,
    },
    Note {
        en: String,
        ru: String,
        note: bool,
    },
    Group(BTreeMap<String, RawNode>),
}

impl Catalog {
    /// Parse and validate a catalog from its JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(text)?;

        if raw.rules.rounding.area <= Decimal::ZERO {
            return Err(PricingError::InvalidCatalog {
                path: "rules.rounding.area".to_string(),
                reason: "area rounding step must be positive".to_string(),
            });
        }

        let mut root = BTreeMap::new();
        for (key, node) in raw.sections {
            let typed = convert(&key, node)?;
            root.insert(key, typed);
        }

        let rules = RoundingRules {
            money: raw.rules.rounding.money,
            area: raw.rules.rounding.area,
        };
        let catalog = Catalog::new(root, rules, raw.rules.calculation);
        info!(
            "Catalog loaded: {} sections, {} short-key ratios",
            catalog.root().len(),
            catalog.ratio_side_table().len()
        );
        Ok(catalog)
    }

    /// The catalog compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_PRICELIST)
    }
}

fn convert(path: &str, node: RawNode) -> Result<CatalogNode> {
    match node {
        RawNode::Price { en, ru, unit, price } => {
            if price < Decimal::ZERO {
                return Err(invalid(path, format!("negative price {}", price)));
            }
            Ok(CatalogNode::Price(PriceItem {
                name: Localized { en, ru },
                unit,
                price,
            }))
        }
        RawNode::Ratio {
            en,
            ru,
            kind,
            value,
            description,
        } => {
            if kind != "ratio" {
                return Err(invalid(path, format!("unknown leaf type \"{}\"", kind)));
            }
            if value <= Decimal::ZERO {
                return Err(invalid(path, format!("ratio value must be positive, got {}", value)));
            }
            Ok(CatalogNode::Ratio(RatioItem {
                name: Localized { en, ru },
                value,
                description,
            }))
        }
        RawNode::Note { en, ru, note } => {
            if !note {
                return Err(invalid(path, "note flag must be true"));
            }
            Ok(CatalogNode::Note(NoteItem {
                name: Localized { en, ru },
            }))
        }
        RawNode::Group(children) => {
            let mut typed = BTreeMap::new();
            for (key, child) in children {
                let child_path = format!("{}.{}", path, key);
                typed.insert(key, convert(&child_path, child)?);
            }
            Ok(CatalogNode::Group(typed))
        }
    }
}

fn invalid(path: &str, reason: impl Into<String>) -> PricingError {
    PricingError::InvalidCatalog {
        path: path.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.rules().money, 2);
        assert_eq!(catalog.rules().area, dec!(0.1));
        assert!(catalog.calculation().contains("base_price"));
        let sections: Vec<&str> = catalog.sections().collect();
        assert_eq!(sections, vec!["cleaning", "marks", "other", "painting", "ratios"]);
    }

    #[test]
    fn test_negative_price_rejected() {
        let json = r#"{
            "cleaning": { "bad": { "en": "x", "ru": "x", "unit": "sq.m", "price": -1 } },
            "rules": { "rounding": { "money": 2, "area": 0.1 } }
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        match err {
            PricingError::InvalidCatalog { path, .. } => assert_eq!(path, "cleaning.bad"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_ratio_rejected() {
        let json = r#"{
            "ratios": { "free": { "en": "x", "ru": "x", "type": "ratio", "value": 0 } },
            "rules": { "rounding": { "money": 2, "area": 0.1 } }
        }"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(PricingError::InvalidCatalog { .. })
        ));
    }

    #[test]
    fn test_unknown_leaf_type_rejected() {
        let json = r#"{
            "ratios": { "odd": { "en": "x", "ru": "x", "type": "discount", "value": 0.9 } },
            "rules": { "rounding": { "money": 2, "area": 0.1 } }
        }"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(PricingError::InvalidCatalog { .. })
        ));
    }

    #[test]
    fn test_malformed_leaf_is_parse_error() {
        // price without unit matches no leaf shape and is not a section either
        let json = r#"{
            "cleaning": { "bad": { "en": "x", "ru": "x", "price": 3 } },
            "rules": { "rounding": { "money": 2, "area": 0.1 } }
        }"#;
        assert!(matches!(Catalog::from_json(json), Err(PricingError::Json(_))));
    }

    #[test]
    fn test_missing_rules_is_parse_error() {
        assert!(matches!(
            Catalog::from_json(r#"{ "cleaning": {} }"#),
            Err(PricingError::Json(_))
        ));
    }
}
