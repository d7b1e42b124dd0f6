//! Pipe cost model.
//!
//! `unit = (base x effective_length / 1000 + elbow x elbows) x flange_coef x coefficients`
//!
//! The unit cost is rounded once to money precision; the total is the rounded
//! unit price times the piece count, rounded again.

use rust_decimal::Decimal;
use tracing::debug;

use crate::catalog::{Localized, PipeTable, Unit};
use crate::error::{PricingError, Result};

use super::calculators::{
    effective_length, flange_coefficient, round_money, MIN_BILLED_LENGTH_MM, MONEY_PLACES,
    PRICE_LENGTH_MM,
};
use super::requests::PipeSelection;
use super::responses::{AppliedRatio, LineSource, PricedRow, WorkGroup};

/// Every intermediate value of one pipe costing
#[derive(Debug, Clone, PartialEq)]
pub struct PipeCost {
    pub base_price: Decimal,
    pub elbow_price: Decimal,
    pub effective_length: Decimal,
    pub flange_coefficient: Decimal,
    /// Product of the active named coefficients (1 when none)
    pub modifier_coefficient: Decimal,
    pub unrounded_unit_cost: Decimal,
}

/// Compute the cost parts for a selection without building a row.
pub fn cost_parts(table: &PipeTable, selection: &PipeSelection) -> Result<PipeCost> {
    if selection.length_mm == 0 {
        return Err(PricingError::invalid_input("length", "must be positive"));
    }
    if selection.pieces == 0 {
        return Err(PricingError::invalid_input("pieces", "must be at least 1"));
    }

    let dimension = table.dimension(selection.diameter)?;
    let base_price = dimension.base_price(selection.material);
    let elbow_price = dimension.elbow_price;

    let effective_length = effective_length(selection.length_mm);
    let flange_coefficient = flange_coefficient(selection.flanges)
        .ok_or_else(|| PricingError::invalid_input("flanges", too_large(selection.flanges)))?;
    let modifier_coefficient = selection
        .coefficients
        .iter()
        .map(|c| table.coefficient(*c).value)
        .product::<Decimal>();

    let pipe_cost = base_price * effective_length / Decimal::from(PRICE_LENGTH_MM);
    let elbow_cost = elbow_price
        .checked_mul(Decimal::from(selection.elbows))
        .ok_or_else(|| PricingError::invalid_input("elbows", too_large(selection.elbows)))?;
    let unrounded_unit_cost = (pipe_cost + elbow_cost)
        .checked_mul(flange_coefficient)
        .and_then(|cost| cost.checked_mul(modifier_coefficient))
        .ok_or_else(|| PricingError::invalid_input("flanges", too_large(selection.flanges)))?;

    Ok(PipeCost {
        base_price,
        elbow_price,
        effective_length,
        flange_coefficient,
        modifier_coefficient,
        unrounded_unit_cost,
    })
}

fn too_large(count: u32) -> String {
    format!("{} is too large to price", count)
}

/// Price one pipe selection into an estimate row.
pub fn price_pipe(table: &PipeTable, selection: &PipeSelection) -> Result<PricedRow> {
    let cost = cost_parts(table, selection)?;
    let quantity = Decimal::from(selection.pieces);
    let unit_price = round_money(cost.unrounded_unit_cost, MONEY_PLACES);
    let total = unit_price
        .checked_mul(quantity)
        .map(|total| round_money(total, MONEY_PLACES))
        .ok_or_else(|| PricingError::invalid_input("pieces", too_large(selection.pieces)))?;

    debug!(
        "Priced DN{} {:?} {}mm: unit {} (exact {}) x {} = {}",
        selection.diameter,
        selection.material,
        selection.length_mm,
        unit_price,
        cost.unrounded_unit_cost,
        quantity,
        total
    );

    Ok(PricedRow {
        title: pipe_title(selection),
        unit: Unit::Piece,
        quantity,
        unit_price,
        total,
        applied: applied_multipliers(table, selection, &cost),
        group: Some(WorkGroup::Pipes),
        source: LineSource::Pipe {
            selection: selection.clone(),
        },
    })
}

/// Flange entry (when more than one flange) then active coefficients in
/// enumeration order.
pub(crate) fn applied_multipliers(
    table: &PipeTable,
    selection: &PipeSelection,
    cost: &PipeCost,
) -> Vec<AppliedRatio> {
    let mut applied = Vec::new();
    if selection.flanges > 1 {
        applied.push(AppliedRatio {
            key: format!("flanges_{}", selection.flanges),
            name: "flanges".to_string(),
            value: cost.flange_coefficient,
        });
    }
    applied.extend(selection.coefficients.iter().map(|c| AppliedRatio {
        key: c.key().to_string(),
        name: table.coefficient(*c).description.clone(),
        value: table.coefficient(*c).value,
    }));
    applied
}

/// Description of the flange step for breakdowns.
pub fn flange_description(flanges: u32) -> String {
    match flanges {
        0 | 1 => String::new(),
        2 => "2 фланца".to_string(),
        n => format!("{} фланцев (1.3 за первые 2 + 1.1 за каждый следующий)", n),
    }
}

fn metres(length_mm: u32) -> Decimal {
    (Decimal::from(length_mm) / Decimal::from(PRICE_LENGTH_MM)).normalize()
}

/// Bilingual row title, e.g. `Black pipe DN20 - 1.5m (2 flanges, 1 elbows)`.
pub fn pipe_title(selection: &PipeSelection) -> Localized {
    let material = selection.material.label();
    let length = metres(selection.length_mm);

    let (extra_en, extra_ru) = match (selection.flanges, selection.elbows) {
        (0, 0) => (String::new(), String::new()),
        (f, 0) => (format!(" ({} flanges)", f), format!(" ({} фланцев)", f)),
        (0, e) => (format!(" ({} elbows)", e), format!(" ({} колен)", e)),
        (f, e) => (
            format!(" ({} flanges, {} elbows)", f, e),
            format!(" ({} фланцев, {} колен)", f, e),
        ),
    };

    Localized::new(
        format!("{} DN{} - {}m{}", material.en, selection.diameter, length, extra_en),
        format!("{} DN{} - {}м{}", material.ru, selection.diameter, length, extra_ru),
    )
}

/// Human-readable formula with the actual values substituted.
pub fn formula(selection: &PipeSelection, cost: &PipeCost) -> String {
    let mut formula = format!("({} * ", cost.base_price.normalize());

    if selection.length_mm < MIN_BILLED_LENGTH_MM {
        formula.push_str(&format!("({} + 2)/2", metres(selection.length_mm)));
    } else {
        formula.push_str(&metres(selection.length_mm).to_string());
    }

    if selection.elbows > 0 {
        formula.push_str(&format!(
            " + {} * {}",
            cost.elbow_price.normalize(),
            selection.elbows
        ));
    }
    formula.push(')');

    if selection.flanges > 1 {
        formula.push_str(" * 1.3");
        for _ in 2..selection.flanges {
            formula.push_str(" * 1.1");
        }
    }

    if cost.modifier_coefficient != Decimal::ONE {
        formula.push_str(&format!(" * {}", cost.modifier_coefficient.normalize()));
    }
    formula
}
