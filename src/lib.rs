//! Quoting engine for ship maintenance work.
//!
//! Hull cleaning and painting are priced from a bilingual catalog through an
//! ordered chain of ratios; pipe fabrication has its own cost model. Priced
//! rows are collected into sectioned estimate tables that can be totalled,
//! explained line by line and exported as tab-separated text.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use shipquote::catalog::Catalog;
//! use shipquote::pricing::{price_work, WorkSelection};
//!
//! let catalog = Catalog::embedded().unwrap();
//! let selection = WorkSelection::new("cleaning.sand_blasting.sa2");
//! let row = price_work(&catalog, &selection, dec!(750), &[]).unwrap();
//! assert_eq!(row.quantity, dec!(750));
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod estimate;
pub mod pricing;
pub mod session;
pub mod storage;

pub use catalog::{Catalog, PipeTable};
pub use config::Config;
pub use error::{PricingError, Result, StorageError, TableError};
pub use estimate::EstimateTable;
pub use session::{PaintCalculator, PipesCalculator};
