//! Price breakdowns: the audit view of how a row's price was reached.
//!
//! Work rows are explained from their recorded ratio trail, so the order shown
//! is the order the ratios were applied. Pipe rows are recomputed from their
//! stored selection to recover the intermediate values.

use rust_decimal::Decimal;

use crate::catalog::{Catalog, PipeTable};
use crate::error::{PricingError, Result};

use super::pipes::{cost_parts, flange_description, formula};
use super::requests::PipeSelection;
use super::responses::{
    BreakdownMultiplier, LineSource, PipeBreakdownDetail, PriceBreakdown, PricedRow,
};

/// Breakdown of a paint/cleaning/marks row.
pub fn work_breakdown(catalog: &Catalog, row: &PricedRow) -> Result<PriceBreakdown> {
    let path = match &row.source {
        LineSource::Catalog { path } => path,
        LineSource::Work { selection } => &selection.path,
        LineSource::Pipe { .. } => {
            return Err(PricingError::invalid_input(
                "row",
                "pipe rows are explained by the pipe table",
            ))
        }
    };

    let base = catalog.resolve_price_item(path)?;
    let multipliers = row
        .applied
        .iter()
        .map(|applied| -> Result<BreakdownMultiplier> {
            let ratio = catalog.resolve_ratio(&applied.key)?;
            Ok(BreakdownMultiplier {
                label: applied.name.clone(),
                value: applied.value,
                description: ratio.description().to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PriceBreakdown {
        base_price: base.price,
        multipliers,
        unit_price: row.unit_price,
        quantity: row.quantity,
        total: row.total,
        pipe: None,
    })
}

/// Breakdown of a pipe row, recomputed from its selection.
pub fn pipe_breakdown(table: &PipeTable, row: &PricedRow) -> Result<PriceBreakdown> {
    match &row.source {
        LineSource::Pipe { selection } => selection_breakdown(table, selection, row),
        _ => Err(PricingError::invalid_input("row", "not a pipe row")),
    }
}

fn selection_breakdown(
    table: &PipeTable,
    selection: &PipeSelection,
    row: &PricedRow,
) -> Result<PriceBreakdown> {
    let cost = cost_parts(table, selection)?;

    let mut multipliers = Vec::new();
    if selection.flanges > 1 {
        multipliers.push(BreakdownMultiplier {
            label: "flanges".to_string(),
            value: cost.flange_coefficient,
            description: flange_description(selection.flanges),
        });
    }
    for coefficient in &selection.coefficients {
        let record = table.coefficient(*coefficient);
        multipliers.push(BreakdownMultiplier {
            label: coefficient.key().to_string(),
            value: record.value,
            description: record.description.clone(),
        });
    }

    let has_elbows = selection.elbows > 0;
    Ok(PriceBreakdown {
        base_price: cost.base_price,
        multipliers,
        unit_price: row.unit_price,
        quantity: Decimal::from(selection.pieces),
        total: row.total,
        pipe: Some(PipeBreakdownDetail {
            effective_length: cost.effective_length,
            flange_coefficient: cost.flange_coefficient,
            elbow_price: has_elbows.then_some(cost.elbow_price),
            elbows: has_elbows.then_some(selection.elbows),
            unrounded_unit_cost: cost.unrounded_unit_cost,
            formula: formula(selection, &cost),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PipeCoefficient;
    use crate::pricing::pipes::price_pipe;
    use crate::pricing::requests::{SiteCondition, WorkSelection};
    use crate::pricing::services::{price_marks, price_work};
    use rust_decimal_macros::dec;

    // ==================== work breakdown tests ====================

    #[test]
    fn test_work_breakdown_follows_application_order() {
        let catalog = Catalog::embedded().unwrap();
        let selection = WorkSelection::new("cleaning.chemical_cleaning")
            .with_percent(50)
            .with_condition(SiteCondition::Confined);
        let row = price_work(&catalog, &selection, dec!(200), &[]).unwrap();

        let breakdown = work_breakdown(&catalog, &row).unwrap();
        assert_eq!(breakdown.base_price, dec!(1.8));
        let labels: Vec<&str> = breakdown.multipliers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Coverage below 70%", "Confined space"]);
        assert_eq!(breakdown.multipliers[0].description, "Покрытие ≤ 70%");
        assert_eq!(breakdown.multipliers[1].value, dec!(1.5));
        assert_eq!(breakdown.unit_price, row.unit_price);
        assert_eq!(breakdown.quantity, dec!(100));
        assert_eq!(breakdown.total, row.total);
        assert!(breakdown.pipe.is_none());
    }

    #[test]
    fn test_marks_breakdown_has_no_multipliers() {
        let catalog = Catalog::embedded().unwrap();
        let rows = price_marks(&catalog, &["plimsoll"], dec!(280)).unwrap();
        let breakdown = work_breakdown(&catalog, &rows[0]).unwrap();
        assert_eq!(breakdown.base_price, dec!(200));
        assert!(breakdown.multipliers.is_empty());
    }

    #[test]
    fn test_work_breakdown_rejects_pipe_row() {
        let catalog = Catalog::embedded().unwrap();
        let table = PipeTable::embedded().unwrap();
        let row = price_pipe(&table, &PipeSelection::default()).unwrap();
        assert!(work_breakdown(&catalog, &row).is_err());
    }

    // ==================== pipe breakdown tests ====================

    #[test]
    fn test_pipe_breakdown_details() {
        let table = PipeTable::embedded().unwrap();
        let mut selection = PipeSelection::default();
        selection.flanges = 3;
        selection.elbows = 2;
        selection.coefficients.insert(PipeCoefficient::Painted);
        let row = price_pipe(&table, &selection).unwrap();

        let breakdown = pipe_breakdown(&table, &row).unwrap();
        let labels: Vec<&str> = breakdown.multipliers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["flanges", "painted"]);
        assert_eq!(breakdown.multipliers[0].value, dec!(1.43));

        let detail = breakdown.pipe.unwrap();
        assert_eq!(detail.effective_length, dec!(1500));
        assert_eq!(detail.elbow_price, Some(dec!(11)));
        assert_eq!(detail.elbows, Some(2));
        // (42 + 22) x 1.43 x 1.05 = 96.096
        assert_eq!(detail.unrounded_unit_cost, dec!(96.096));
        assert_eq!(breakdown.unit_price, dec!(96.10));
        assert_eq!(detail.formula, "(28 * (1 + 2)/2 + 11 * 2) * 1.3 * 1.1 * 1.05");
    }

    #[test]
    fn test_pipe_breakdown_without_elbows() {
        let table = PipeTable::embedded().unwrap();
        let row = price_pipe(&table, &PipeSelection::default()).unwrap();
        let breakdown = pipe_breakdown(&table, &row).unwrap();
        let detail = breakdown.pipe.unwrap();
        assert_eq!(detail.elbow_price, None);
        assert_eq!(detail.elbows, None);
        assert_eq!(breakdown.total, dec!(42));
    }
}
