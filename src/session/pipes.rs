//! Pipe calculator session.
//!
//! Pipe rows have no sections; every add goes to the tail.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::PipeTable;
use crate::error::PricingError;
use crate::estimate::{to_tsv, Entry, EstimateTable};
use crate::pricing::{pipe_breakdown, price_pipe, LineSource, PipeSelection, PriceBreakdown};

use super::{shift_cursor, Result};

pub const STORAGE_KEY: &str = "pipes-calculator-state";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipesCalculator {
    pub work: PipeSelection,
    table: EstimateTable<()>,
    editing: Option<usize>,
}

impl PipesCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &EstimateTable<()> {
        &self.table
    }

    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    pub fn sum(&self) -> Decimal {
        self.table.sum()
    }

    pub fn export(&self) -> String {
        to_tsv(&self.table)
    }

    pub fn add_work(&mut self, pipes: &PipeTable) -> Result<usize> {
        let row = price_pipe(pipes, &self.work)?;
        let index = self.table.append(None, row);
        info!("Added pipe DN{} at row {}", self.work.diameter, index);
        Ok(index)
    }

    pub fn start_edit(&mut self, index: usize) -> Result<()> {
        let row = self.table.row(index)?;
        let LineSource::Pipe { selection } = &row.source else {
            return Err(PricingError::invalid_input("row", "not a pipe row").into());
        };
        self.work = selection.clone();
        self.editing = Some(index);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Re-price the form into the row being edited; `None` when not editing.
    pub fn save_edit(&mut self, pipes: &PipeTable) -> Result<Option<usize>> {
        let Some(index) = self.editing else {
            return Ok(None);
        };
        let row = price_pipe(pipes, &self.work)?;
        self.table.replace_at(index, row)?;
        self.editing = None;
        info!("Updated pipe at row {}", index);
        Ok(Some(index))
    }

    pub fn remove(&mut self, index: usize) -> Result<Entry<()>> {
        let removed = self.table.remove_at(index)?;
        self.editing = shift_cursor(self.editing, index);
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.editing = None;
        info!("Pipe estimate cleared");
    }

    pub fn breakdown(&self, pipes: &PipeTable, index: usize) -> Result<PriceBreakdown> {
        let row = self.table.row(index)?;
        Ok(pipe_breakdown(pipes, row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PipeCoefficient, PipeMaterial};
    use crate::session::SessionError;
    use rust_decimal_macros::dec;

    fn pipes() -> PipeTable {
        PipeTable::embedded().unwrap()
    }

    #[test]
    fn test_add_and_sum() {
        let pipes = pipes();
        let mut calc = PipesCalculator::new();
        assert_eq!(calc.add_work(&pipes).unwrap(), 0);

        calc.work.pieces = 3;
        assert_eq!(calc.add_work(&pipes).unwrap(), 1);

        assert_eq!(calc.sum(), dec!(42) + dec!(126));
        assert_eq!(
            calc.export(),
            "Black pipe DN20 - 1m\tЧерная труба DN20 - 1м\tpcs\t1\t42,00\t\n\
             Black pipe DN20 - 1m\tЧерная труба DN20 - 1м\tpcs\t3\t42,00\t"
        );
    }

    #[test]
    fn test_unknown_diameter_does_not_mutate() {
        let pipes = pipes();
        let mut calc = PipesCalculator::new();
        calc.work.diameter = 33;
        let err = calc.add_work(&pipes).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Pricing(PricingError::DiameterNotFound { diameter: 33 })
        ));
        assert!(calc.table().is_empty());
    }

    #[test]
    fn test_edit_restores_full_selection() {
        let pipes = pipes();
        let mut calc = PipesCalculator::new();
        calc.work = PipeSelection {
            material: PipeMaterial::Galvanized,
            diameter: 50,
            length_mm: 2400,
            pieces: 2,
            flanges: 3,
            elbows: 1,
            coefficients: [PipeCoefficient::Copper, PipeCoefficient::InTank]
                .into_iter()
                .collect(),
        };
        let original = calc.work.clone();
        calc.add_work(&pipes).unwrap();

        calc.work = PipeSelection::default();
        calc.start_edit(0).unwrap();
        assert_eq!(calc.work, original);
        assert_eq!(calc.editing(), Some(0));

        calc.work.coefficients.clear();
        assert_eq!(calc.save_edit(&pipes).unwrap(), Some(0));
        let row = calc.table().row(0).unwrap();
        assert_eq!(row.ratio_keys(), vec!["flanges_3"]);
        assert_eq!(calc.editing(), None);
    }

    #[test]
    fn test_cancel_and_remove() {
        let pipes = pipes();
        let mut calc = PipesCalculator::new();
        calc.add_work(&pipes).unwrap();
        calc.add_work(&pipes).unwrap();

        calc.start_edit(1).unwrap();
        calc.cancel_edit();
        assert_eq!(calc.editing(), None);

        calc.start_edit(1).unwrap();
        calc.remove(0).unwrap();
        assert_eq!(calc.editing(), Some(0));
        assert_eq!(calc.table().len(), 1);
        assert!(calc.remove(5).is_err());
    }

    #[test]
    fn test_breakdown_for_row() {
        let pipes = pipes();
        let mut calc = PipesCalculator::new();
        calc.add_work(&pipes).unwrap();
        let breakdown = calc.breakdown(&pipes, 0).unwrap();
        assert_eq!(breakdown.unit_price, dec!(42));
        assert_eq!(breakdown.pipe.unwrap().formula, "(28 * (1 + 2)/2)");
    }
}
