//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no catalog access.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Money precision for pipe work, which has no catalog rounding rules.
pub const MONEY_PLACES: u32 = 2;

/// Pipe runs shorter than this (mm) are billed at a blended floor.
pub const MIN_BILLED_LENGTH_MM: u32 = 2000;

/// Pipe base prices are quoted per this many millimetres.
pub const PRICE_LENGTH_MM: u32 = 1000;

const TWO_FLANGE_COEFFICIENT: Decimal = dec!(1.3);
const EXTRA_FLANGE_COEFFICIENT: Decimal = dec!(1.1);

/// Round to specified decimal places, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use shipquote::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(1.005), 2), dec!(1.01));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Round an area to the nearest multiple of `step` (e.g. 0.1 sq.m).
pub fn round_area(area: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return area;
    }
    (area / step).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * step
}

/// Quantity billed for an area item covering `percent` of `area_total`.
pub fn quantity_from_percent(area_total: Decimal, percent: u8, step: Decimal) -> Decimal {
    round_area(area_total * Decimal::from(percent) / dec!(100), step).normalize()
}

/// Billing length for a pipe run.
///
/// Runs under 2000 mm are billed halfway between their length and 2000 mm.
pub fn effective_length(length_mm: u32) -> Decimal {
    if length_mm < MIN_BILLED_LENGTH_MM {
        Decimal::from(MIN_BILLED_LENGTH_MM + length_mm) / dec!(2)
    } else {
        Decimal::from(length_mm)
    }
}

/// Stepped flange coefficient: 0-1 flanges x1.0, 2 flanges x1.3,
/// and another x1.1 for every flange beyond the second.
///
/// `None` once the coefficient no longer fits in a `Decimal`.
pub fn flange_coefficient(flanges: u32) -> Option<Decimal> {
    if flanges <= 1 {
        return Some(Decimal::ONE);
    }
    (2..flanges).try_fold(TWO_FLANGE_COEFFICIENT, |acc, _| {
        acc.checked_mul(EXTRA_FLANGE_COEFFICIENT)
    })
}

/// Format a decimal the way the export expects: fixed places, comma separator.
pub fn format_comma(amount: Decimal, places: u32) -> String {
    let rounded = round_money(amount, places);
    format!("{:.*}", places as usize, rounded).replace('.', ",")
}
