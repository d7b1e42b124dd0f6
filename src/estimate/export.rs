//! Tab-separated export for pasting into a spreadsheet.
//!
//! Row line: `en \t ru \t unit \t qty \t unit_price \t` with a comma decimal
//! separator on the price. Section line: `en \t ru \t\t\t\t`.

use crate::pricing::{format_comma, PricedRow};

use super::table::{EstimateTable, Entry, SectionHeader};

const PRICE_PLACES: u32 = 2;

/// A leading '-' makes spreadsheets parse the cell as a formula.
fn escape_label(label: &str) -> String {
    if label.starts_with('-') {
        format!(" {}", label)
    } else {
        label.to_string()
    }
}

/// One priced row as a single export line.
pub fn row_line(row: &PricedRow) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t",
        escape_label(&row.title.en),
        escape_label(&row.title.ru),
        row.unit,
        row.quantity.normalize(),
        format_comma(row.unit_price, PRICE_PLACES)
    )
}

pub fn section_line<K>(header: &SectionHeader<K>) -> String {
    format!("{}\t{}\t\t\t\t", header.title.en, header.title.ru)
}

/// Whole table, one line per entry, joined by newlines.
pub fn to_tsv<K>(table: &EstimateTable<K>) -> String {
    table
        .entries()
        .iter()
        .map(|entry| match entry {
            Entry::Section(header) => section_line(header),
            Entry::Row(row) => row_line(row),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
