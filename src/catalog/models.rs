//! Catalog node types.
//!
//! The catalog is a tree of named sections whose leaves are price items,
//! ratio items or informational notes.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Two-language label (English and Russian)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    pub en: String,
    pub ru: String,
}

impl Localized {
    pub fn new(en: impl Into<String>, ru: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ru: ru.into(),
        }
    }
}

/// Billing unit of a price item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "sq.m")]
    Area,
    #[serde(rename = "m")]
    Length,
    #[serde(rename = "run.m")]
    RunLength,
    #[serde(rename = "set")]
    Set,
    #[serde(rename = "pcs")]
    Piece,
    #[serde(rename = "hold")]
    Hold,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Area => "sq.m",
            Unit::Length => "m",
            Unit::RunLength => "run.m",
            Unit::Set => "set",
            Unit::Piece => "pcs",
            Unit::Hold => "hold",
        }
    }

    /// Area-unit items are quantified by coverage percent of the section area.
    pub fn is_area(&self) -> bool {
        matches!(self, Unit::Area)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base item with a price per unit
#[derive(Debug, Clone, PartialEq)]
pub struct PriceItem {
    pub name: Localized,
    pub unit: Unit,
    pub price: Decimal,
}

/// Named multiplicative adjustment (surcharge above 1, discount below 1)
#[derive(Debug, Clone, PartialEq)]
pub struct RatioItem {
    pub name: Localized,
    pub value: Decimal,
    pub description: Option<String>,
}

impl RatioItem {
    /// Text shown next to the ratio in a price breakdown.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name.ru)
    }
}

/// Informational entry, never priced
#[derive(Debug, Clone, PartialEq)]
pub struct NoteItem {
    pub name: Localized,
}

/// A catalog node: either a named section of children or one of the three leaf kinds
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogNode {
    Group(BTreeMap<String, CatalogNode>),
    Price(PriceItem),
    Ratio(RatioItem),
    Note(NoteItem),
}

impl CatalogNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            CatalogNode::Group(_) => NodeKind::Group,
            CatalogNode::Price(_) => NodeKind::Price,
            CatalogNode::Ratio(_) => NodeKind::Ratio,
            CatalogNode::Note(_) => NodeKind::Note,
        }
    }
}

/// Node kind, used in lookup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Price,
    Ratio,
    Note,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NodeKind::Group => "section",
            NodeKind::Price => "price item",
            NodeKind::Ratio => "ratio item",
            NodeKind::Note => "note",
        };
        f.write_str(text)
    }
}

/// Global rounding configuration shipped with the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct RoundingRules {
    /// Decimal places for money values
    pub money: u32,
    /// Rounding step for derived areas (e.g. 0.1)
    pub area: Decimal,
}

impl Default for RoundingRules {
    fn default() -> Self {
        Self {
            money: 2,
            area: Decimal::new(1, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unit_strings_match_serde_names() {
        for unit in [
            Unit::Area,
            Unit::Length,
            Unit::RunLength,
            Unit::Set,
            Unit::Piece,
            Unit::Hold,
        ] {
            let json = serde_json::to_string(&unit).unwrap();
            assert_eq!(json, format!("\"{}\"", unit.as_str()));
        }
        assert!(Unit::Area.is_area());
        assert!(!Unit::RunLength.is_area());
    }

    #[test]
    fn test_ratio_description_falls_back_to_local_name() {
        let ratio = RatioItem {
            name: Localized::new("Confined space", "Ограниченное пространство"),
            value: dec!(1.5),
            description: None,
        };
        assert_eq!(ratio.description(), "Ограниченное пространство");

        let ratio = RatioItem {
            description: Some("Трюм".to_string()),
            ..ratio
        };
        assert_eq!(ratio.description(), "Трюм");
    }
}
