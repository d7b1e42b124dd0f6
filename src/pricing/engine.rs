//! Catalog pricing engine.
//!
//! `total = base_price x (selected ratios, in order) x quantity`, with the
//! unit price and the total each rounded to money precision.

use rust_decimal::Decimal;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{PricingError, Result};

use super::calculators::round_money;
use super::responses::{AppliedRatio, LineSource, PricedRow, WorkGroup};

/// Multiply `base` by each ratio in order, recording every application.
pub fn apply_ratios<S: AsRef<str>>(
    catalog: &Catalog,
    base: Decimal,
    ratio_keys: &[S],
) -> Result<(Decimal, Vec<AppliedRatio>)> {
    let mut price = base;
    let mut applied = Vec::with_capacity(ratio_keys.len());

    for key in ratio_keys {
        let key = key.as_ref();
        let ratio = catalog.resolve_ratio(key)?;
        price *= ratio.value;
        applied.push(AppliedRatio {
            key: key.to_string(),
            name: ratio.name.en.clone(),
            value: ratio.value,
        });
    }

    Ok((price, applied))
}

/// Price one catalog item.
///
/// Fails with `NotFound`/`WrongKind` when the path or any ratio key does not
/// resolve to the expected node kind.
pub fn price_line<S: AsRef<str>>(
    catalog: &Catalog,
    path: &str,
    quantity: Decimal,
    ratio_keys: &[S],
) -> Result<PricedRow> {
    if quantity < Decimal::ZERO {
        return Err(PricingError::invalid_input(
            "quantity",
            format!("must not be negative, got {}", quantity),
        ));
    }

    let base = catalog.resolve_price_item(path)?;
    let (raw_price, applied) = apply_ratios(catalog, base.price, ratio_keys)?;

    let places = catalog.rules().money;
    let unit_price = round_money(raw_price, places);
    let total = round_money(unit_price * quantity, places);

    debug!(
        "Priced {}: base {} x {} ratios = {} x {} = {}",
        path,
        base.price,
        applied.len(),
        unit_price,
        quantity,
        total
    );

    Ok(PricedRow {
        title: base.name.clone(),
        unit: base.unit,
        quantity,
        unit_price,
        total,
        applied,
        group: WorkGroup::from_path(path),
        source: LineSource::Catalog {
            path: path.to_string(),
        },
    })
}
