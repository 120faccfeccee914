//! BOQ workbook parsing.
//!
//! Turns a spreadsheet of unknown layout into a [`BoqParseResult`]:
//!
//! 1. pick the worksheet ([`sheet`]),
//! 2. scrape project metadata from its top-left corner ([`metadata`]),
//! 3. find the header row ([`header`]),
//! 4. assign column roles ([`columns`]),
//! 5. read and validate item rows ([`rows`]).
//!
//! Only an unreadable workbook is an error. A workbook without BOQ-shaped
//! content yields an empty result with a status and a warning.

pub mod columns;
pub mod header;
pub mod metadata;
pub mod rows;
pub mod sheet;

pub use columns::{classify_header, map_columns, ColumnMap, ColumnRole, ROLE_RULES};
pub use header::{find_header_row, is_header_text};
pub use metadata::scrape_metadata;
pub use rows::extract_items;
pub use sheet::{load_sheets, select_worksheet, SheetGrid};

use tracing::{debug, info, warn};

use crate::error::{DocfieldError, Result, WorkbookError};
use crate::models::{BoqParseResult, BoqParseStatus, WorkbookConfig};

/// Parser for BOQ workbooks (xlsx, xlsm, xls, xlsb, ods).
#[derive(Debug, Clone, Default)]
pub struct BoqParser {
    config: WorkbookConfig,
}

impl BoqParser {
    pub fn new(config: WorkbookConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkbookConfig {
        &self.config
    }

    /// Parse workbook bytes.
    pub fn parse(&self, data: &[u8], filename: &str) -> Result<BoqParseResult> {
        if data.is_empty() {
            return Err(DocfieldError::EmptyInput);
        }

        let sheets = load_sheets(data)?;
        Ok(self.parse_sheets(&sheets, filename))
    }

    /// Parse already-loaded worksheets.
    pub fn parse_sheets(&self, sheets: &[SheetGrid], filename: &str) -> BoqParseResult {
        let Some(index) = select_worksheet(sheets) else {
            warn!("{}: {}", filename, WorkbookError::NoWorksheetFound);
            return BoqParseResult::empty(filename, BoqParseStatus::NoWorksheet)
                .with_warning(WorkbookError::NoWorksheetFound.to_string());
        };
        let sheet = &sheets[index];
        info!("Parsing worksheet '{}' of {}", sheet.name(), filename);

        let metadata = scrape_metadata(
            sheet,
            self.config.metadata_scan_rows,
            self.config.metadata_scan_cols,
        );
        debug!("Found {} metadata fields", metadata.len());

        let Some(header_row) = find_header_row(
            sheet,
            self.config.header_scan_rows,
            self.config.header_scan_cols,
            self.config.min_header_matches,
        ) else {
            warn!("{}: {} in sheet '{}'", filename, WorkbookError::NoHeaderRowFound, sheet.name());
            let mut result = BoqParseResult::new(filename, metadata, Vec::new());
            result.status = BoqParseStatus::NoHeaderRow;
            return result.with_warning(format!(
                "{} in the first {} rows of sheet '{}'",
                WorkbookError::NoHeaderRowFound,
                self.config.header_scan_rows,
                sheet.name()
            ));
        };

        let columns = map_columns(sheet, header_row);
        let items = extract_items(
            sheet,
            header_row,
            &columns,
            self.config.min_description_len,
            self.config.default_gst_rate,
        );

        let result = BoqParseResult::new(filename, metadata, items);
        if result.items.is_empty() {
            warn!("{}: header found at row {} but no valid items", filename, header_row + 1);
            return result.with_warning(format!(
                "header found at row {} of sheet '{}' but no rows passed validation",
                header_row + 1,
                sheet.name()
            ));
        }

        info!(
            "Parsed {} items from {} (total {:.2})",
            result.items_count, filename, result.total_value
        );
        result
    }
}
