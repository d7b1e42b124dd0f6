//! Priced results: estimate rows and price breakdowns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Localized, Unit};

use super::requests::{PipeSelection, WorkSelection};

/// Work category a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkGroup {
    Cleaning,
    Painting,
    Marks,
    Other,
    Pipes,
}

impl WorkGroup {
    /// Group of a catalog item, taken from the first path segment.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.split('.').next()? {
            "cleaning" => Some(WorkGroup::Cleaning),
            "painting" => Some(WorkGroup::Painting),
            "marks" => Some(WorkGroup::Marks),
            "other" => Some(WorkGroup::Other),
            _ => None,
        }
    }
}

/// One ratio as it was applied, in application order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedRatio {
    /// Key the ratio was requested by (short key or dotted path)
    pub key: String,
    /// English name at the time of pricing
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
}

/// Structured input a row was priced from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineSource {
    /// Plain catalog item priced by path and quantity
    Catalog { path: String },
    /// Paint/cleaning selection, including modifiers
    Work { selection: WorkSelection },
    /// Pipe selection, including all cost inputs
    Pipe { selection: PipeSelection },
}

/// Immutable priced estimate line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedRow {
    pub title: Localized,
    pub unit: Unit,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub applied: Vec<AppliedRatio>,
    pub group: Option<WorkGroup>,
    pub source: LineSource,
}

impl PricedRow {
    /// Applied ratio keys in application order
    pub fn ratio_keys(&self) -> Vec<&str> {
        self.applied.iter().map(|r| r.key.as_str()).collect()
    }

    pub(crate) fn with_title(mut self, title: Localized) -> Self {
        self.title = title;
        self
    }

    pub(crate) fn with_source(mut self, source: LineSource) -> Self {
        self.source = source;
        self
    }
}

/// One multiplier line of a breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownMultiplier {
    pub label: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    pub description: String,
}

/// Pipe-specific breakdown values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipeBreakdownDetail {
    #[serde(with = "rust_decimal::serde::str")]
    pub effective_length: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub flange_coefficient: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub elbow_price: Option<Decimal>,
    pub elbows: Option<u32>,
    /// Unit cost before money rounding
    #[serde(with = "rust_decimal::serde::str")]
    pub unrounded_unit_cost: Decimal,
    pub formula: String,
}

/// Audit view of how a row's price was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    pub multipliers: Vec<BreakdownMultiplier>,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipe: Option<PipeBreakdownDetail>,
}
