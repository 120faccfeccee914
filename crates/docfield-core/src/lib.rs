//! Core library for heuristic document field extraction.
//!
//! This crate provides:
//! - BOQ (bill of quantities) parsing from spreadsheets of unknown layout
//! - Purchase-order field extraction from PDF and DOCX documents
//! - Value coercion and unit normalisation shared by both paths
//! - Serialisable result models and configuration

pub mod coerce;
pub mod document;
pub mod error;
pub mod format;
pub mod models;
pub mod units;
pub mod workbook;

pub use document::PurchaseOrderExtractor;
pub use error::{DocfieldError, Result, StrategyError, WorkbookError};
pub use format::FileFormat;
pub use models::{
    BoqItem, BoqParseResult, DocfieldConfig, ExtractedPurchaseOrder, ExtractionMethod, LineItem,
};
pub use units::normalize_unit;
pub use workbook::BoqParser;

use serde::Serialize;

/// Result of [`extract`]: whichever record the input's format produces.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionOutput {
    PurchaseOrder(ExtractedPurchaseOrder),
    Boq(BoqParseResult),
}

/// Extract from a file's bytes, choosing the path by its extension.
pub fn extract(data: &[u8], filename: &str, config: &DocfieldConfig) -> Result<ExtractionOutput> {
    match FileFormat::from_filename(filename)? {
        FileFormat::Workbook => BoqParser::new(config.workbook.clone())
            .parse(data, filename)
            .map(ExtractionOutput::Boq),
        FileFormat::Pdf | FileFormat::Docx => PurchaseOrderExtractor::from_config(config)
            .extract(data, filename)
            .map(ExtractionOutput::PurchaseOrder),
    }
}
