//! Error handling for the pricing engine

use crate::catalog::NodeKind;

/// Pricing and catalog error type
///
/// Every variant is raised before an estimate is mutated, so a failed
/// add or edit leaves the table exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Catalog path not found: {path}")]
    NotFound { path: String },

    #[error("Expected {expected} at \"{path}\", found {found}")]
    WrongKind {
        path: String,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("Pipe with diameter DN{diameter} not found")]
    DiameterNotFound { diameter: u32 },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Invalid catalog data at \"{path}\": {reason}")]
    InvalidCatalog { path: String, reason: String },

    #[error("Catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PricingError {
    /// True for both flavours of missing reference (catalog path or pipe diameter).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PricingError::NotFound { .. } | PricingError::DiameterNotFound { .. }
        )
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        PricingError::NotFound { path: path.into() }
    }

    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;

/// Estimate table errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Row index {index} out of range (table has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Entry {index} is a section header, not a priced row")]
    NotARow { index: usize },
}

/// State persistence errors
///
/// Callers log these and carry on; they never reach the user.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("State I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No state directory available")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::not_found("cleaning.sand_blasting.sa9");
        assert!(err.to_string().contains("cleaning.sand_blasting.sa9"));

        let err = PricingError::WrongKind {
            path: "painting.full_single".to_string(),
            expected: NodeKind::Ratio,
            found: NodeKind::Price,
        };
        let text = err.to_string();
        assert!(text.contains("ratio item"));
        assert!(text.contains("price item"));

        let err = PricingError::DiameterNotFound { diameter: 21 };
        assert!(err.to_string().contains("DN21"));

        let err = PricingError::invalid_input("percent", "must be between 1 and 100");
        assert!(err.to_string().contains("percent"));
    }

    #[test]
    fn test_table_error_display() {
        let err = TableError::IndexOutOfRange { index: 5, len: 2 };
        assert_eq!(
            err.to_string(),
            "Row index 5 out of range (table has 2 entries)"
        );
        assert!(TableError::NotARow { index: 0 }
            .to_string()
            .contains("section header"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(PricingError::not_found("x").is_not_found());
        assert!(PricingError::DiameterNotFound { diameter: 20 }.is_not_found());
        assert!(!PricingError::invalid_input("length", "zero").is_not_found());
    }
}
