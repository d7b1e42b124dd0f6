//! Paint and cleaning calculator session.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{Catalog, Localized};
use crate::error::PricingError;
use crate::estimate::{to_tsv, Entry, EstimateTable, SectionHeader};
use crate::pricing::{
    price_marks, price_work, work_breakdown, LineSource, PriceBreakdown, PricedRow,
    WorkSelection,
};

use super::{shift_cursor, Result};

pub const STORAGE_KEY: &str = "paint-calculator-state";

pub const DEFAULT_AREA_TOTAL: Decimal = dec!(750);

/// Ship area a group of paint works belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    #[default]
    Topside,
    BootTop,
    Vertical,
    FlatBottom,
    Hold,
    Cranes,
    RudderBlade,
    VerticalBottom,
    Other,
    /// User-defined area with its own label and surcharges
    Custom {
        name: Localized,
        #[serde(default)]
        auto_ratios: Vec<String>,
    },
}

impl AreaKind {
    pub const BUILT_IN: [AreaKind; 9] = [
        AreaKind::Topside,
        AreaKind::BootTop,
        AreaKind::Vertical,
        AreaKind::FlatBottom,
        AreaKind::Hold,
        AreaKind::Cranes,
        AreaKind::RudderBlade,
        AreaKind::VerticalBottom,
        AreaKind::Other,
    ];

    pub fn custom(en: impl Into<String>, ru: impl Into<String>) -> Self {
        AreaKind::Custom {
            name: Localized::new(en, ru),
            auto_ratios: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            AreaKind::Topside => "topside",
            AreaKind::BootTop => "boottop",
            AreaKind::Vertical => "vertical",
            AreaKind::FlatBottom => "flat_bottom",
            AreaKind::Hold => "hold",
            AreaKind::Cranes => "cranes",
            AreaKind::RudderBlade => "rudder_blade",
            AreaKind::VerticalBottom => "vertical_bottom",
            AreaKind::Other => "other",
            AreaKind::Custom { name, .. } => &name.en,
        }
    }

    pub fn label(&self) -> Localized {
        let (en, ru) = match self {
            AreaKind::Topside => ("Topside", "Надводный борт"),
            AreaKind::BootTop => ("Boot-top", "ППВЛ (boot-top)"),
            AreaKind::Vertical => ("Vertical sides", "Вертикальные борта"),
            AreaKind::FlatBottom => ("Flat bottom", "Плоское днище"),
            AreaKind::Hold => ("Cargo hold", "Трюм"),
            AreaKind::Cranes => ("Cranes", "Краны/металлоконструкции"),
            AreaKind::RudderBlade => ("Rudder blade", "Перо руля"),
            AreaKind::VerticalBottom => ("Vertical bottom", "Вертикальное дно"),
            AreaKind::Other => ("Other", "Другое"),
            AreaKind::Custom { name, .. } => return name.clone(),
        };
        Localized::new(en, ru)
    }

    /// Ratio keys applied to every work in this area, ahead of any others.
    pub fn auto_ratios(&self) -> &[String] {
        match self {
            AreaKind::Custom { auto_ratios, .. } => auto_ratios,
            _ => &[],
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AreaKind {
    type Err = PricingError;

    /// Parses built-in area keys; `boot-top` and `flat-bottom` style also accepted.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.to_lowercase().replace('-', "_");
        let wanted = if wanted == "boot_top" { "boottop".to_string() } else { wanted };
        AreaKind::BUILT_IN
            .into_iter()
            .find(|kind| kind.key() == wanted)
            .ok_or_else(|| PricingError::invalid_input("area", format!("unknown area \"{}\"", s)))
    }
}

/// Paint calculator: current area, work selection, estimate and edit cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintCalculator {
    pub area_kind: AreaKind,
    #[serde(with = "rust_decimal::serde::str")]
    pub area_total: Decimal,
    pub work: WorkSelection,
    table: EstimateTable<AreaKind>,
    editing: Option<usize>,
}

impl Default for PaintCalculator {
    fn default() -> Self {
        Self {
            area_kind: AreaKind::default(),
            area_total: DEFAULT_AREA_TOTAL,
            work: WorkSelection::default(),
            table: EstimateTable::new(),
            editing: None,
        }
    }
}

impl PaintCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_area(&mut self, kind: AreaKind, total: Decimal) {
        self.area_kind = kind;
        self.area_total = total;
    }

    pub fn table(&self) -> &EstimateTable<AreaKind> {
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

    /// Header for the current area, e.g. `Topside - 750m2`.
    pub fn section_header(&self) -> SectionHeader<AreaKind> {
        let label = self.area_kind.label();
        let area = self.area_total.normalize();
        SectionHeader {
            key: self.area_kind.clone(),
            title: Localized::new(
                format!("{} - {}m2", label.en, area),
                format!("{} - {} м2", label.ru, area),
            ),
            area: Some(self.area_total),
        }
    }

    fn price_current(&self, catalog: &Catalog) -> Result<PricedRow> {
        Ok(price_work(
            catalog,
            &self.work,
            self.area_total,
            self.area_kind.auto_ratios(),
        )?)
    }

    /// Price the current selection into the current area's section.
    ///
    /// Percent and modifiers reset afterwards; the chosen item stays.
    pub fn add_work(&mut self, catalog: &Catalog) -> Result<usize> {
        let row = self.price_current(catalog)?;
        let header = self.section_header();
        let index = self.table.append(Some(header), row);
        self.work.reset_modifiers();
        info!("Added paint work {} at row {}", self.work.path, index);
        Ok(index)
    }

    /// Add a batch of marks to the current area's section.
    pub fn add_marks<S: AsRef<str>>(
        &mut self,
        catalog: &Catalog,
        keys: &[S],
        waterline_m: Decimal,
    ) -> Result<Vec<usize>> {
        let rows = price_marks(catalog, keys, waterline_m)?;
        let header = self.section_header();
        let indices = rows
            .into_iter()
            .map(|row| self.table.append(Some(header.clone()), row))
            .collect();
        Ok(indices)
    }

    /// Load the row at `index` back into the form for editing.
    ///
    /// The area and its total are restored from the row's section.
    pub fn start_edit(&mut self, index: usize) -> Result<()> {
        let row = self.table.row(index)?;
        let selection = match &row.source {
            LineSource::Work { selection } => selection.clone(),
            LineSource::Catalog { path } => WorkSelection::new(path.clone()).with_quantity(row.quantity),
            LineSource::Pipe { .. } => {
                return Err(PricingError::invalid_input("row", "not a paint row").into())
            }
        };

        if let Some(header) = self.table.section_of(index) {
            self.area_kind = header.key.clone();
            if let Some(area) = header.area {
                self.area_total = area;
            }
        }
        self.work = selection;
        self.editing = Some(index);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Re-price the form and replace the row being edited in place.
    ///
    /// The area must still match the row's section; a row cannot be moved to
    /// another area by editing. Returns the replaced index, or `None` when
    /// nothing was being edited.
    pub fn save_edit(&mut self, catalog: &Catalog) -> Result<Option<usize>> {
        let Some(index) = self.editing else {
            return Ok(None);
        };
        if let Some(header) = self.table.section_of(index) {
            let area_changed = header.key != self.area_kind
                || header.area.is_some_and(|area| area != self.area_total);
            if area_changed {
                return Err(PricingError::invalid_input(
                    "area",
                    format!(
                        "row {} belongs to {}; remove it and add it again to change the area",
                        index, header.title.en
                    ),
                )
                .into());
            }
        }
        let row = self.price_current(catalog)?;
        self.table.replace_at(index, row)?;
        self.work.reset_modifiers();
        self.editing = None;
        info!("Updated paint work at row {}", index);
        Ok(Some(index))
    }

    pub fn remove(&mut self, index: usize) -> Result<Entry<AreaKind>> {
        let removed = self.table.remove_at(index)?;
        self.editing = shift_cursor(self.editing, index);
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.editing = None;
        info!("Paint estimate cleared");
    }

    pub fn breakdown(&self, catalog: &Catalog, index: usize) -> Result<PriceBreakdown> {
        let row = self.table.row(index)?;
        Ok(work_breakdown(catalog, row)?)
    }
}
