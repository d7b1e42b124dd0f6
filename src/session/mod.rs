//! Interactive calculator sessions.
//!
//! A session owns one estimate table plus the selection being built and the
//! edit cursor. Every mutating action prices first and touches the table only
//! once pricing has succeeded.

pub mod paint;
pub mod pipes;

use crate::error::{PricingError, TableError};

pub use paint::{AreaKind, PaintCalculator};
pub use pipes::PipesCalculator;

/// Session action errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Table(#[from] TableError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Edit cursor after removing the entry at `removed`.
pub(crate) fn shift_cursor(editing: Option<usize>, removed: usize) -> Option<usize> {
    match editing {
        Some(index) if index == removed => None,
        Some(index) if index > removed => Some(index - 1),
        other => other,
    }
}
