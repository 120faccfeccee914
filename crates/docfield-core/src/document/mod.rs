//! Purchase-order extraction from PDF and DOCX documents.
//!
//! PDFs go through four independent strategies ([`pdf::PDF_STRATEGIES`]),
//! each producing a scored candidate; the candidates are merged into one
//! record ([`merge::merge_candidates`]). DOCX files have a single strategy.
//!
//! A document the engine cannot read never produces an error: the caller
//! gets a zero-confidence record whose `raw_text` says what went wrong.

pub mod docx;
pub mod fields;
pub mod grid;
pub mod layout;
pub mod merge;
pub mod patterns;
pub mod pdf;
pub mod scoring;
pub mod strategy;
pub mod tables;

#[cfg(test)]
mod fixtures;

pub use docx::{extract_docx, read_docx, DocxContent};
pub use fields::{parse_fields, PoField, FIELD_RULES};
pub use merge::merge_candidates;
pub use pdf::PDF_STRATEGIES;
pub use scoring::{apply_confidence, confidence};
pub use strategy::{run_strategies, ExtractionSettings, Strategy, StrategyReport, StrategyResult};
pub use tables::{line_items_from_tables, Table};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{DocfieldError, Result, StrategyError};
use crate::format::FileFormat;
use crate::models::{DocfieldConfig, DocumentConfig, ExtractedPurchaseOrder, ExtractionMethod, ScoringWeights};

/// Extracts purchase-order fields from PDF and DOCX bytes.
#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderExtractor {
    settings: Arc<ExtractionSettings>,
}

impl PurchaseOrderExtractor {
    pub fn new(document: DocumentConfig, scoring: ScoringWeights) -> Self {
        Self {
            settings: Arc::new(ExtractionSettings { document, scoring }),
        }
    }

    pub fn from_config(config: &DocfieldConfig) -> Self {
        Self {
            settings: Arc::new(ExtractionSettings::from_config(config)),
        }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Extract a purchase order, dispatching on the filename's extension.
    ///
    /// Fails only for unsupported extensions and empty input.
    pub fn extract(&self, data: &[u8], filename: &str) -> Result<ExtractedPurchaseOrder> {
        let format = FileFormat::from_filename(filename)?;
        if data.is_empty() {
            return Err(DocfieldError::EmptyInput);
        }

        let po = match format {
            FileFormat::Pdf => self.extract_pdf(data),
            FileFormat::Docx => self.extract_docx(data),
            FileFormat::Workbook => {
                return Err(DocfieldError::UnsupportedFormat(format!(
                    "{} is a workbook, not a purchase order",
                    filename
                )));
            }
        };

        info!(
            "Extracted {} via {} (confidence {:.2})",
            filename, po.extraction_method, po.confidence_score
        );
        Ok(po)
    }

    /// Run every PDF strategy and merge the candidates.
    pub fn extract_pdf(&self, data: &[u8]) -> ExtractedPurchaseOrder {
        let reports = run_strategies(
            &PDF_STRATEGIES,
            Arc::from(data),
            Arc::clone(&self.settings),
            self.settings.timeout(),
        );

        let mut candidates = Vec::with_capacity(reports.len());
        let mut failures = Vec::new();

        for report in reports {
            match report.outcome {
                Ok(candidate) => {
                    debug!(
                        "Strategy {} scored {:.2}",
                        report.method, candidate.confidence_score
                    );
                    candidates.push(candidate);
                }
                Err(e) => {
                    warn!("Strategy {} failed: {}", report.method, e);
                    failures.push(format!("{}: {}", report.method, e));
                }
            }
        }

        merge_candidates(candidates).unwrap_or_else(|| {
            ExtractedPurchaseOrder::sentinel(
                ExtractionMethod::None,
                format!("No extraction results available: {}", failures.join("; ")),
            )
        })
    }

    /// Run the DOCX strategy, degrading failures into a sentinel record.
    pub fn extract_docx(&self, data: &[u8]) -> ExtractedPurchaseOrder {
        extract_docx(data, &self.settings).unwrap_or_else(|e| {
            warn!("DOCX extraction failed: {}", e);
            ExtractedPurchaseOrder::sentinel(
                ExtractionMethod::Error,
                format!("DOCX extraction failed: {}", e),
            )
        })
    }
}

/// Parse fields from text, attach table line items and score the result.
///
/// Shared by every strategy that reads free text.
pub fn build_candidate(
    text: &str,
    tables: &[Table],
    method: ExtractionMethod,
    settings: &ExtractionSettings,
) -> StrategyResult {
    if text.trim().is_empty() && tables.is_empty() {
        return Err(StrategyError::NoText);
    }

    let mut po = parse_fields(text, method, &settings.document);
    po.line_items = line_items_from_tables(tables, settings.document.min_table_description_len);
    apply_confidence(&mut po, &settings.scoring);
    Ok(po)
}
