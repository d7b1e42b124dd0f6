//! Read-only price catalog.
//!
//! The catalog is constructed once (from JSON) and then passed by reference
//! to everything that prices work. Nothing mutates it after load.

pub mod loader;
pub mod models;
pub mod pipes;
pub mod queries;

use std::collections::{BTreeMap, HashMap};

pub use loader::{EMBEDDED_PIPES_PRICELIST, EMBEDDED_PRICELIST};
pub use models::{
    CatalogNode, Localized, NodeKind, NoteItem, PriceItem, RatioItem, RoundingRules, Unit,
};
pub use pipes::{CoefficientRecord, PipeCoefficient, PipeDimension, PipeMaterial, PipeTable};

/// Name of the section whose direct leaves are reachable by short key.
pub const RATIOS_SECTION: &str = "ratios";

/// Immutable catalog tree plus the short-key ratio side-table
#[derive(Debug, Clone)]
pub struct Catalog {
    root: BTreeMap<String, CatalogNode>,
    ratios: HashMap<String, CatalogNode>,
    rules: RoundingRules,
    calculation: String,
}

impl Catalog {
    /// Build a catalog from already-typed sections.
    ///
    /// The side-table is populated from the leaves directly under `ratios`.
    pub fn new(
        root: BTreeMap<String, CatalogNode>,
        rules: RoundingRules,
        calculation: impl Into<String>,
    ) -> Self {
        let ratios = match root.get(RATIOS_SECTION) {
            Some(CatalogNode::Group(children)) => children
                .iter()
                .filter(|(_, node)| !matches!(node, CatalogNode::Group(_)))
                .map(|(key, node)| (key.clone(), node.clone()))
                .collect(),
            _ => HashMap::new(),
        };

        Self {
            root,
            ratios,
            rules,
            calculation: calculation.into(),
        }
    }

    pub fn rules(&self) -> &RoundingRules {
        &self.rules
    }

    /// Documented calculation law, e.g. `base_price * all_selected_ratios * quantity`
    pub fn calculation(&self) -> &str {
        &self.calculation
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    pub(crate) fn root(&self) -> &BTreeMap<String, CatalogNode> {
        &self.root
    }

    pub(crate) fn ratio_side_table(&self) -> &HashMap<String, CatalogNode> {
        &self.ratios
    }
}
