//! Estimate tables and their export.

pub mod export;
pub mod table;

pub use export::{row_line, to_tsv};
pub use table::{Entry, EstimateTable, SectionHeader};
