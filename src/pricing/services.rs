//! Pricing services that combine a selection with the catalog.
//!
//! These sit between the session layer and the engine: derive the quantity,
//! map modifiers to ratio keys, price, then decorate the row.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};

use crate::catalog::{Catalog, Unit};
use crate::error::{PricingError, Result};

use super::calculators::quantity_from_percent;
use super::engine::price_line;
use super::modifiers::{decorate_title, ratio_keys};
use super::requests::WorkSelection;
use super::responses::{LineSource, PricedRow};

pub const MARKS_SECTION: &str = "marks";

/// Waterline length used when none is entered.
pub const DEFAULT_WATERLINE_M: Decimal = dec!(280);

/// Price a paint/cleaning selection against a ship section of `area_total` sq.m.
///
/// Area items bill `percent` of the section area; every other unit bills the
/// entered quantity (1 when left empty). `auto_ratios` are the section's own
/// surcharges and are applied first.
pub fn price_work(
    catalog: &Catalog,
    selection: &WorkSelection,
    area_total: Decimal,
    auto_ratios: &[String],
) -> Result<PricedRow> {
    let item = catalog.resolve_price_item(&selection.path)?;

    let quantity = if item.unit.is_area() {
        if !(1..=100).contains(&selection.percent) {
            return Err(PricingError::invalid_input(
                "percent",
                format!("must be between 1 and 100, got {}", selection.percent),
            ));
        }
        if area_total < Decimal::ZERO {
            return Err(PricingError::invalid_input(
                "area",
                format!("must not be negative, got {}", area_total),
            ));
        }
        quantity_from_percent(area_total, selection.percent, catalog.rules().area)
    } else {
        selection.quantity.unwrap_or(Decimal::ONE)
    };

    let keys = ratio_keys(item, selection, auto_ratios);
    debug!("{} -> ratio keys {:?}", selection.path, keys);

    let mut row = price_line(catalog, &selection.path, quantity, &keys)?;
    if let Some(title) = decorate_title(item, selection) {
        row = row.with_title(title);
    }

    Ok(row.with_source(LineSource::Work {
        selection: selection.clone(),
    }))
}

/// Price a batch of marking items from the `marks` section.
///
/// Set-priced marks bill one set each; the run-length item (waterline)
/// bills `waterline_m` metres. Fails on the first bad key without pricing
/// the rest.
pub fn price_marks<S: AsRef<str>>(
    catalog: &Catalog,
    keys: &[S],
    waterline_m: Decimal,
) -> Result<Vec<PricedRow>> {
    if waterline_m < Decimal::ZERO {
        return Err(PricingError::invalid_input(
            "waterline",
            format!("must not be negative, got {}", waterline_m),
        ));
    }

    let no_ratios: [&str; 0] = [];
    let rows = keys
        .iter()
        .map(|key| {
            let path = format!("{}.{}", MARKS_SECTION, key.as_ref());
            let item = catalog.resolve_price_item(&path)?;
            let quantity = match item.unit {
                Unit::RunLength | Unit::Length => waterline_m,
                _ => Decimal::ONE,
            };
            price_line(catalog, &path, quantity, &no_ratios)
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Priced {} marks", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::requests::{PaintingModifiers, SiteCondition};
    use crate::pricing::responses::WorkGroup;

    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    // ==================== price_work tests ====================

    #[test]
    fn test_full_area_no_modifiers() {
        let catalog = catalog();
        let selection = WorkSelection::new("cleaning.sand_blasting.sa2");
        let row = price_work(&catalog, &selection, dec!(750), &[]).unwrap();

        assert_eq!(row.quantity, dec!(750));
        assert_eq!(row.unit_price, dec!(8.90));
        assert_eq!(row.total, dec!(6675.00));
        assert_eq!(row.title.en, "Sand blasting SA-2 – 100%");
        assert_eq!(
            row.source,
            LineSource::Work {
                selection: selection.clone()
            }
        );
    }

    #[test]
    fn test_partial_area_gets_band_and_rounded_quantity() {
        let catalog = catalog();
        let selection = WorkSelection::new("cleaning.sand_blasting.sa2").with_percent(29);
        let row = price_work(&catalog, &selection, dec!(333), &[]).unwrap();

        // 333 x 29% = 96.57 -> 96.6
        assert_eq!(row.quantity, dec!(96.6));
        assert_eq!(row.ratio_keys(), vec!["area_lt_30"]);
        // 8.9 x 1.5 = 13.35
        assert_eq!(row.unit_price, dec!(13.35));
        assert_eq!(row.total, dec!(1289.61));
    }

    #[test]
    fn test_auto_ratios_come_first() {
        let catalog = catalog();
        let selection = WorkSelection::new("painting.full_single")
            .with_painting(PaintingModifiers {
                double_component: true,
                ..Default::default()
            })
            .with_condition(SiteCondition::Confined);
        let auto = vec!["hold".to_string()];
        let row = price_work(&catalog, &selection, dec!(100), &auto).unwrap();

        assert_eq!(
            row.ratio_keys(),
            vec!["hold", "painting.full_double_ratio", "confined"]
        );
        assert_eq!(row.group, Some(WorkGroup::Painting));
        assert_eq!(row.title.en, "Full coat, epoxy paint – 100%");
    }

    #[test]
    fn test_non_area_item_uses_entered_quantity() {
        let catalog = catalog();
        let selection = WorkSelection::new("other.porthole_protection")
            .with_percent(10)
            .with_quantity(dec!(24));
        let row = price_work(&catalog, &selection, dec!(750), &[]).unwrap();

        assert_eq!(row.quantity, dec!(24));
        assert!(row.applied.is_empty());
        assert_eq!(row.title.en, "Porthole protection");
        assert_eq!(row.total, dec!(288.00));

        let selection = WorkSelection::new("other.drum_disposal");
        let row = price_work(&catalog, &selection, dec!(750), &[]).unwrap();
        assert_eq!(row.quantity, Decimal::ONE);
    }

    #[test]
    fn test_price_work_rejects_bad_input() {
        let catalog = catalog();
        let selection = WorkSelection::new("painting.full_single").with_percent(0);
        assert!(matches!(
            price_work(&catalog, &selection, dec!(750), &[]),
            Err(PricingError::InvalidInput { field: "percent", .. })
        ));

        let selection = WorkSelection::new("painting.full_single").with_percent(101);
        assert!(price_work(&catalog, &selection, dec!(750), &[]).is_err());

        let selection = WorkSelection::new("painting.full_single");
        assert!(matches!(
            price_work(&catalog, &selection, dec!(-1), &[]),
            Err(PricingError::InvalidInput { field: "area", .. })
        ));

        let selection = WorkSelection::new("painting.nothing");
        assert!(price_work(&catalog, &selection, dec!(750), &[])
            .unwrap_err()
            .is_not_found());

        let auto = vec!["not_a_ratio".to_string()];
        let selection = WorkSelection::new("painting.full_single");
        assert!(price_work(&catalog, &selection, dec!(750), &auto).is_err());
    }

    // ==================== price_marks tests ====================

    #[test]
    fn test_price_marks_quantities() {
        let catalog = catalog();
        let rows = price_marks(&catalog, &["imo", "waterline"], DEFAULT_WATERLINE_M).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].quantity, Decimal::ONE);
        assert_eq!(rows[0].total, dec!(120.00));
        assert_eq!(rows[1].quantity, dec!(280));
        // 3.1 x 280
        assert_eq!(rows[1].total, dec!(868.00));
        assert!(rows.iter().all(|r| r.group == Some(WorkGroup::Marks)));
    }

    #[test]
    fn test_price_marks_unknown_key() {
        let catalog = catalog();
        let err = price_marks(&catalog, &["imo", "banner"], dec!(100)).unwrap_err();
        assert!(err.is_not_found());
    }
}
