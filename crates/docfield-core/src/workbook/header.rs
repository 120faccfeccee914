//! BOQ header-row detection.

use tracing::{debug, trace};

use super::sheet::SheetGrid;
use crate::coerce::to_text;

/// Keywords counted towards the header threshold.
pub const HEADER_KEYWORDS: [&str; 8] = [
    "description",
    "quantity",
    "rate",
    "amount",
    "item",
    "particular",
    "unit",
    "uom",
];

const DESCRIPTION_KEYWORDS: [&str; 4] = ["description", "item", "particular", "work"];
const QUANTITY_KEYWORDS: [&str; 2] = ["quantity", "qty"];
const RATE_KEYWORDS: [&str; 2] = ["rate", "price"];

/// Lowercased, space-joined text of the non-empty cells in a row.
pub fn header_row_text(sheet: &SheetGrid, row: usize, max_cols: usize) -> String {
    (0..max_cols.min(sheet.width()))
        .map(|col| to_text(sheet.cell(row, col)).to_lowercase())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a row's text looks like a BOQ header.
///
/// Needs `min_matches` distinct header keywords, a description-like keyword,
/// and a quantity- or rate-like keyword.
pub fn is_header_text(text: &str, min_matches: usize) -> bool {
    let matches = HEADER_KEYWORDS.iter().filter(|k| text.contains(*k)).count();
    let has_description = DESCRIPTION_KEYWORDS.iter().any(|k| text.contains(k));
    let has_quantity = QUANTITY_KEYWORDS.iter().any(|k| text.contains(k));
    let has_rate = RATE_KEYWORDS.iter().any(|k| text.contains(k));

    matches >= min_matches && has_description && (has_quantity || has_rate)
}

/// Find the first header row within the scan window (zero-based index).
pub fn find_header_row(
    sheet: &SheetGrid,
    max_rows: usize,
    max_cols: usize,
    min_matches: usize,
) -> Option<usize> {
    for row in 0..max_rows.min(sheet.height()) {
        let text = header_row_text(sheet, row, max_cols);
        if text.is_empty() {
            continue;
        }
        trace!("Header candidate row {}: {}", row + 1, text);

        if is_header_text(&text, min_matches) {
            debug!("Selected header row {}", row + 1);
            return Some(row);
        }
    }

    debug!("No header row found in first {} rows", max_rows);
    None
}
