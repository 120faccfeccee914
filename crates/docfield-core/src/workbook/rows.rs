//! Row extraction and validation below the header.

use calamine::Data;
use tracing::trace;

use super::columns::{ColumnMap, ColumnRole};
use super::sheet::SheetGrid;
use crate::coerce::{to_number, to_text};
use crate::models::BoqItem;
use crate::units::normalize_unit;

/// Values read from one row through the mapped columns, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub description: String,
    pub unit: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

impl RawRow {
    /// Read a sheet row through the column map.
    pub fn read(sheet: &SheetGrid, row: usize, columns: &ColumnMap) -> Self {
        let cell = |role| columns.get(role).map(|col| sheet.cell(row, col));
        let number = |role| cell(role).map(to_number).unwrap_or(0.0);

        let unit = match cell(ColumnRole::Unit) {
            None | Some(Data::Empty) => "Nos".to_string(),
            Some(value) => normalize_unit(&to_text(value)),
        };

        Self {
            description: cell(ColumnRole::Description).map(to_text).unwrap_or_default(),
            unit,
            quantity: number(ColumnRole::Quantity),
            rate: number(ColumnRole::Rate),
            amount: number(ColumnRole::Amount),
        }
    }

    /// Accept only describable rows carrying at least one positive number.
    pub fn is_valid(&self, min_description_len: usize) -> bool {
        self.description.chars().count() >= min_description_len
            && (self.quantity > 0.0 || self.rate > 0.0 || self.amount > 0.0)
    }

    /// Apply defaults: quantity 1.0 when absent, amount `quantity × rate` when absent.
    pub fn into_item(self, serial_number: u32, gst_rate: f64) -> BoqItem {
        let quantity = if self.quantity == 0.0 { 1.0 } else { self.quantity };
        let amount = if self.amount == 0.0 && self.rate > 0.0 {
            quantity * self.rate
        } else {
            self.amount
        };

        BoqItem {
            serial_number,
            description: self.description,
            unit: self.unit,
            quantity,
            rate: self.rate,
            amount,
            gst_rate,
        }
    }
}

/// Extract every valid item below `header_row`, numbering them from 1.
pub fn extract_items(
    sheet: &SheetGrid,
    header_row: usize,
    columns: &ColumnMap,
    min_description_len: usize,
    gst_rate: f64,
) -> Vec<BoqItem> {
    let mut items = Vec::new();

    for row in header_row + 1..sheet.height() {
        let raw = RawRow::read(sheet, row, columns);
        if !raw.is_valid(min_description_len) {
            trace!("Skipping row {}: {:?}", row + 1, raw);
            continue;
        }

        let serial = items.len() as u32 + 1;
        let item = raw.into_item(serial, gst_rate);
        trace!("Accepted row {} as item {}: {}", row + 1, serial, item.description);
        items.push(item);
    }

    items
}
