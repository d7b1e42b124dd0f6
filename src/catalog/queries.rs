//! Catalog lookups.
//!
//! Pure functions over the immutable catalog: dotted-path traversal, typed
//! item resolution and short-key ratio resolution.

use tracing::debug;

use crate::error::{PricingError, Result};

use super::models::{CatalogNode, NodeKind, PriceItem, RatioItem};
use super::Catalog;

impl Catalog {
    /// Walk the tree along a dotted path (e.g. `cleaning.sand_blasting.sa2`).
    pub fn resolve_node(&self, path: &str) -> Result<&CatalogNode> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut node = self
            .root()
            .get(first)
            .ok_or_else(|| PricingError::not_found(path))?;

        for segment in segments {
            node = match node {
                CatalogNode::Group(children) => children
                    .get(segment)
                    .ok_or_else(|| PricingError::not_found(path))?,
                // A leaf cannot have children
                _ => return Err(PricingError::not_found(path)),
            };
        }

        Ok(node)
    }

    /// Resolve a path that must point at a price item.
    pub fn resolve_price_item(&self, path: &str) -> Result<&PriceItem> {
        match self.resolve_node(path)? {
            CatalogNode::Price(item) => Ok(item),
            other => Err(wrong_kind(path, NodeKind::Price, other)),
        }
    }

    /// Resolve a ratio by short key (side-table) or, failing that, by dotted path.
    pub fn resolve_ratio(&self, key: &str) -> Result<&RatioItem> {
        let node = match self.ratio_side_table().get(key) {
            Some(node) => node,
            None => self.resolve_node(key)?,
        };

        match node {
            CatalogNode::Ratio(ratio) => {
                debug!("Resolved ratio {} = {}", key, ratio.value);
                Ok(ratio)
            }
            other => Err(wrong_kind(key, NodeKind::Ratio, other)),
        }
    }

    /// All price items under a section, with their full paths, in key order.
    pub fn price_items(&self, section: &str) -> Result<Vec<(String, &PriceItem)>> {
        let mut items = Vec::new();
        collect_price_items(section, self.resolve_node(section)?, &mut items);
        Ok(items)
    }
}

fn collect_price_items<'a>(
    path: &str,
    node: &'a CatalogNode,
    items: &mut Vec<(String, &'a PriceItem)>,
) {
    match node {
        CatalogNode::Price(item) => items.push((path.to_string(), item)),
        CatalogNode::Group(children) => {
            for (key, child) in children {
                collect_price_items(&format!("{}.{}", path, key), child, items);
            }
        }
        CatalogNode::Ratio(_) | CatalogNode::Note(_) => {}
    }
}

fn wrong_kind(path: &str, expected: NodeKind, found: &CatalogNode) -> PricingError {
    PricingError::WrongKind {
        path: path.to_string(),
        expected,
        found: found.kind(),
    }
}
