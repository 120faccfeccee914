//! Project metadata scraping from the top of a BOQ sheet.

use calamine::Data;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::sheet::SheetGrid;
use crate::coerce::to_text;
use crate::models::{MetadataField, ProjectMetadata};

lazy_static! {
    /// Label patterns per field, matched against lowercased cell text.
    static ref METADATA_PATTERNS: Vec<(MetadataField, Vec<Regex>)> = vec![
        (MetadataField::ProjectName, patterns(&[r"project\s*name", r"project\s*:", r"job\s*name"])),
        (MetadataField::Architect, patterns(&[r"architect"])),
        (MetadataField::Client, patterns(&[r"client"])),
        (MetadataField::Location, patterns(&[r"location", r"site", r"address"])),
        (MetadataField::Date, patterns(&[r"date"])),
    ];
}

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources.iter().map(|s| Regex::new(s).unwrap()).collect()
}

/// Scan the top-left window of a sheet for labelled project attributes.
///
/// The first label found for a field wins; fields without a label or value
/// are simply absent.
pub fn scrape_metadata(sheet: &SheetGrid, max_rows: usize, max_cols: usize) -> ProjectMetadata {
    let mut metadata = ProjectMetadata::new();

    for row in 0..max_rows.min(sheet.height()) {
        for col in 0..max_cols.min(sheet.width()) {
            let Data::String(text) = sheet.cell(row, col) else {
                continue;
            };
            let lower = text.trim().to_lowercase();
            if lower.is_empty() {
                continue;
            }

            for (field, regexes) in METADATA_PATTERNS.iter() {
                if metadata.contains_key(field) || !regexes.iter().any(|re| re.is_match(&lower)) {
                    continue;
                }
                if let Some(value) = adjacent_value(sheet, row, col) {
                    debug!("Metadata {} = '{}' (row {}, col {})", field, value, row + 1, col + 1);
                    metadata.insert(*field, value);
                }
            }
        }
    }

    metadata
}

/// Value belonging to a label cell: text after `:`/`-` in the same cell,
/// else the cell to the right.
fn adjacent_value(sheet: &SheetGrid, row: usize, col: usize) -> Option<String> {
    let own = to_text(sheet.cell(row, col));
    if let Some((_, rest)) = own.split_once([':', '-']) {
        let rest = rest.trim();
        if !rest.is_empty() {
            return Some(rest.to_string());
        }
    }

    let right = to_text(sheet.cell(row, col + 1));
    (!right.is_empty()).then_some(right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn test_scrape_inline_and_adjacent_values() {
        let sheet = SheetGrid::new(
            "BOQ",
            vec![
                vec![s("Project Name: Riverside Towers")],
                vec![s("Architect"), s("Studio Arc")],
                vec![s("Client -  Acme Infra Pvt Ltd")],
                vec![s("Site"), s("Whitefield, Bengaluru")],
                vec![s("Date"), Data::String("12/03/2024".to_string())],
            ],
        );

        let metadata = scrape_metadata(&sheet, 20, 10);

        assert_eq!(metadata.get(&MetadataField::ProjectName).map(String::as_str), Some("Riverside Towers"));
        assert_eq!(metadata.get(&MetadataField::Architect).map(String::as_str), Some("Studio Arc"));
        assert_eq!(metadata.get(&MetadataField::Client).map(String::as_str), Some("Acme Infra Pvt Ltd"));
        assert_eq!(metadata.get(&MetadataField::Location).map(String::as_str), Some("Whitefield, Bengaluru"));
        assert_eq!(metadata.get(&MetadataField::Date).map(String::as_str), Some("12/03/2024"));
    }

    #[test]
    fn test_first_label_wins() {
        let sheet = SheetGrid::new(
            "BOQ",
            vec![
                vec![s("Client"), s("First Client")],
                vec![s("Client"), s("Second Client")],
            ],
        );

        let metadata = scrape_metadata(&sheet, 20, 10);
        assert_eq!(metadata.get(&MetadataField::Client).map(String::as_str), Some("First Client"));
    }

    #[test]
    fn test_labels_without_values_are_absent() {
        let sheet = SheetGrid::new("BOQ", vec![vec![s("Architect")], vec![s("Random note")]]);
        assert!(scrape_metadata(&sheet, 20, 10).is_empty());
    }

    #[test]
    fn test_scan_window_is_respected() {
        let mut rows = vec![vec![]; 25];
        rows[22] = vec![s("Architect"), s("Too Late")];
        let sheet = SheetGrid::new("BOQ", rows);
        assert!(scrape_metadata(&sheet, 20, 10).is_empty());
    }
}
