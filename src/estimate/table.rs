//! Ordered estimate: section headers interleaved with priced rows.
//!
//! Rows for a section always stay in one contiguous run directly under that
//! section's header. Appending to a section that already exists inserts at
//! the end of its run, even when other sections follow it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Localized;
use crate::error::TableError;
use crate::pricing::PricedRow;

/// Section header, keyed by whatever groups the rows (e.g. a ship area)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionHeader<K> {
    pub key: K,
    pub title: Localized,
    /// Section area in sq.m, when the section is an area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Decimal>,
}

/// One line of the estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry<K> {
    Section(SectionHeader<K>),
    Row(PricedRow),
}

impl<K> Entry<K> {
    pub fn as_row(&self) -> Option<&PricedRow> {
        match self {
            Entry::Row(row) => Some(row),
            Entry::Section(_) => None,
        }
    }

    pub fn is_row(&self) -> bool {
        matches!(self, Entry::Row(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateTable<K> {
    entries: Vec<Entry<K>>,
}

impl<K> Default for EstimateTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq> EstimateTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row, returning the index it landed at.
    ///
    /// With no section the row goes to the tail. Otherwise the row joins the
    /// end of that section's run; a missing section is created at the tail.
    pub fn append(&mut self, section: Option<SectionHeader<K>>, row: PricedRow) -> usize {
        let Some(header) = section else {
            self.entries.push(Entry::Row(row));
            return self.entries.len() - 1;
        };

        match self.find_section(&header.key) {
            Some(start) => {
                let end = self.section_end(start);
                self.entries.insert(end, Entry::Row(row));
                end
            }
            None => {
                info!("New estimate section: {}", header.title.en);
                self.entries.push(Entry::Section(header));
                self.entries.push(Entry::Row(row));
                self.entries.len() - 1
            }
        }
    }

    /// Index of the header for `key`, if the section exists.
    pub fn find_section(&self, key: &K) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| matches!(entry, Entry::Section(h) if &h.key == key))
    }

    /// Header of the section the entry at `index` belongs to.
    pub fn section_of(&self, index: usize) -> Option<&SectionHeader<K>> {
        self.entries
            .get(..=index)?
            .iter()
            .rev()
            .find_map(|entry| match entry {
                Entry::Section(header) => Some(header),
                Entry::Row(_) => None,
            })
    }

    /// Rows directly under the header at `start`.
    pub fn section_rows(&self, start: usize) -> &[Entry<K>] {
        let end = self.section_end(start);
        self.entries.get(start + 1..end).unwrap_or_default()
    }

    // First index after the contiguous row run that follows `start`
    fn section_end(&self, start: usize) -> usize {
        let mut end = start + 1;
        while end < self.entries.len() && self.entries[end].is_row() {
            end += 1;
        }
        end
    }
}

impl<K> EstimateTable<K> {
    pub fn entries(&self) -> &[Entry<K>] {
        &self.entries
    }

    pub fn rows(&self) -> impl Iterator<Item = &PricedRow> {
        self.entries.iter().filter_map(Entry::as_row)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Priced row at `index`.
    pub fn row(&self, index: usize) -> Result<&PricedRow, TableError> {
        match self.entries.get(index) {
            Some(Entry::Row(row)) => Ok(row),
            Some(Entry::Section(_)) => Err(TableError::NotARow { index }),
            None => Err(self.out_of_range(index)),
        }
    }

    /// Remove any entry; the others keep their relative order.
    pub fn remove_at(&mut self, index: usize) -> Result<Entry<K>, TableError> {
        if index >= self.entries.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.entries.remove(index))
    }

    /// Replace the priced row at `index` in place, returning the old row.
    pub fn replace_at(&mut self, index: usize, row: PricedRow) -> Result<PricedRow, TableError> {
        let len = self.entries.len();
        match self.entries.get_mut(index) {
            Some(Entry::Row(existing)) => Ok(std::mem::replace(existing, row)),
            Some(Entry::Section(_)) => Err(TableError::NotARow { index }),
            None => Err(TableError::IndexOutOfRange { index, len }),
        }
    }

    /// Sum of row totals; headers contribute nothing.
    pub fn sum(&self) -> Decimal {
        self.rows().map(|row| row.total).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn out_of_range(&self, index: usize) -> TableError {
        TableError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        }
    }
}
