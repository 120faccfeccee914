//! Worksheet loading and selection.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::{debug, warn};

use crate::error::WorkbookError;

static EMPTY_CELL: Data = Data::Empty;

/// Sheet names that usually hold the BOQ, in priority order.
pub const PREFERRED_SHEET_NAMES: [&str; 7] = [
    "boq",
    "bill of quantities",
    "quantities",
    "estimate",
    "summary",
    "sheet1",
    "main",
];

/// A worksheet as a dense, zero-indexed grid anchored at cell A1.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    name: String,
    rows: Vec<Vec<Data>>,
    width: usize,
}

impl SheetGrid {
    /// Build a grid from rows starting at A1.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            name: name.into(),
            rows,
            width,
        }
    }

    /// Build a grid from a calamine range, padding so indices match sheet positions.
    pub fn from_range(name: impl Into<String>, range: &Range<Data>) -> Self {
        let (start_row, start_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<Data>> = vec![Vec::new(); start_row];
        for row in range.rows() {
            let mut cells = vec![Data::Empty; start_col];
            cells.extend(row.iter().cloned());
            rows.push(cells);
        }

        Self::new(name, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows, counted from row 1.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, counted from column A.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(|c| matches!(c, Data::Empty)))
    }

    /// Cell at a zero-based position; empty outside the used range.
    pub fn cell(&self, row: usize, col: usize) -> &Data {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Read every worksheet of a workbook held in memory.
pub fn load_sheets(data: &[u8]) -> Result<Vec<SheetGrid>, WorkbookError> {
    let cursor = Cursor::new(data);
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| WorkbookError::Open(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in &sheet_names {
        match workbook.worksheet_range(name) {
            Ok(range) => sheets.push(SheetGrid::from_range(name.as_str(), &range)),
            Err(e) => {
                warn!("Could not read worksheet '{}': {}", name, e);
                sheets.push(SheetGrid::new(name.as_str(), Vec::new()));
            }
        }
    }

    debug!("Loaded {} worksheets", sheets.len());
    Ok(sheets)
}

/// Pick the worksheet most likely to hold the BOQ.
///
/// Preferred names win first, then the first sheet with more than one row
/// and column, then the first sheet. `None` only for a workbook without sheets.
pub fn select_worksheet(sheets: &[SheetGrid]) -> Option<usize> {
    if sheets.is_empty() {
        return None;
    }

    for preferred in PREFERRED_SHEET_NAMES {
        if let Some(idx) = sheets
            .iter()
            .position(|s| s.name.to_lowercase().contains(preferred))
        {
            debug!("Selected worksheet '{}' by name", sheets[idx].name);
            return Some(idx);
        }
    }

    if let Some(idx) = sheets.iter().position(|s| s.height() > 1 && s.width() > 1) {
        debug!("Selected first non-trivial worksheet '{}'", sheets[idx].name);
        return Some(idx);
    }

    debug!("Falling back to first worksheet '{}'", sheets[0].name);
    Some(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(name: &str, rows: usize, cols: usize) -> SheetGrid {
        SheetGrid::new(
            name,
            vec![vec![Data::String("x".to_string()); cols]; rows],
        )
    }

    #[test]
    fn test_select_by_preferred_name() {
        let sheets = vec![grid("Cover", 5, 5), grid("Main", 5, 5), grid("BOQ - Civil", 5, 5)];
        assert_eq!(select_worksheet(&sheets), Some(2));
    }

    #[test]
    fn test_keyword_priority_beats_sheet_order() {
        let sheets = vec![grid("Summary", 5, 5), grid("Estimate", 5, 5)];
        assert_eq!(select_worksheet(&sheets), Some(1));
    }

    #[test]
    fn test_select_first_non_trivial_sheet() {
        let sheets = vec![grid("Notes", 1, 1), grid("Data", 3, 4)];
        assert_eq!(select_worksheet(&sheets), Some(1));
    }

    #[test]
    fn test_fall_back_to_first_sheet() {
        let sheets = vec![grid("A", 1, 1), grid("B", 0, 0)];
        assert_eq!(select_worksheet(&sheets), Some(0));
    }

    #[test]
    fn test_no_sheets() {
        assert_eq!(select_worksheet(&[]), None);
    }

    #[test]
    fn test_cell_outside_range_is_empty() {
        let sheet = grid("BOQ", 2, 2);
        assert_eq!(sheet.cell(10, 10), &Data::Empty);
        assert!(!sheet.is_empty());
    }

    #[test]
    fn test_load_sheets_rejects_garbage() {
        assert!(matches!(load_sheets(b"not a workbook"), Err(WorkbookError::Open(_))));
    }
}
