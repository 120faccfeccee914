//! PDF extraction strategies.
//!
//! Four independent ways of reading a purchase order out of a PDF, from the
//! most structure-aware to the most forgiving. All share the field parser
//! and scoring; only the text (and tables) they feed it differ.

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::build_candidate;
use super::grid::anchored_tables;
use super::layout::extract_layout;
use super::scoring::apply_confidence;
use super::strategy::{ExtractionSettings, Strategy, StrategyResult};
use super::tables::{line_items_from_tables, Table};
use crate::error::StrategyError;
use crate::models::{ExtractedPurchaseOrder, ExtractionMethod};

/// PDF strategies in the order they are reported and tie-broken.
pub const PDF_STRATEGIES: [Strategy; 4] = [
    Strategy {
        method: ExtractionMethod::LayoutAware,
        run: layout_aware,
    },
    Strategy {
        method: ExtractionMethod::LayoutReconstruction,
        run: layout_reconstruction,
    },
    Strategy {
        method: ExtractionMethod::PlainText,
        run: plain_text,
    },
    Strategy {
        method: ExtractionMethod::TableFocused,
        run: table_focused,
    },
];

/// Load a PDF from memory, decrypting empty-password documents.
pub fn load_document(data: &[u8]) -> Result<Document, StrategyError> {
    let doc = Document::load_mem(data).map_err(|e| StrategyError::Load(e.to_string()))?;
    decrypt(doc)
}

fn load_document_from_path(path: &Path) -> Result<Document, StrategyError> {
    let doc = Document::load(path).map_err(|e| StrategyError::Load(e.to_string()))?;
    decrypt(doc)
}

fn decrypt(mut doc: Document) -> Result<Document, StrategyError> {
    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| StrategyError::Load(format!("encrypted document: {}", e)))?;
        debug!("Decrypted PDF with empty password");
    }
    Ok(doc)
}

/// Positioned text-layer parsing; also harvests tables for line items.
pub fn layout_aware(data: &[u8], settings: &ExtractionSettings) -> StrategyResult {
    let doc = load_document(data)?;
    let layout = extract_layout(&doc, &settings.layout_options())?;
    debug!(
        "Layout extraction: {} chars, {} tables",
        layout.text.len(),
        layout.tables.len()
    );
    build_candidate(&layout.text, &layout.tables, ExtractionMethod::LayoutAware, settings)
}

/// pdf-extract's layout-reconstructing text output.
pub fn layout_reconstruction(data: &[u8], settings: &ExtractionSettings) -> StrategyResult {
    let bytes = text_layer_bytes(data)?;
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| StrategyError::TextExtraction(e.to_string()))?;
    build_candidate(&text, &[], ExtractionMethod::LayoutReconstruction, settings)
}

/// lopdf's sequential page text.
pub fn plain_text(data: &[u8], settings: &ExtractionSettings) -> StrategyResult {
    let doc = load_document(data)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return Err(StrategyError::Load("document has no pages".to_string()));
    }

    let text = doc
        .extract_text(&pages)
        .map_err(|e| StrategyError::TextExtraction(e.to_string()))?;
    build_candidate(&text, &[], ExtractionMethod::PlainText, settings)
}

/// Tables only, read back from a temporary copy of the document.
///
/// Yields line items and no free-text fields. Tables come from the
/// header-anchored reader in [`super::grid`], not from the layout pass, so
/// sparse rows and wrapped descriptions that break layout tables are kept.
/// The temporary file has a random name and is removed when it goes out of
/// scope, on every path.
pub fn table_focused(data: &[u8], settings: &ExtractionSettings) -> StrategyResult {
    let mut file = tempfile::Builder::new()
        .prefix(&settings.document.temp_file_prefix)
        .suffix(".pdf")
        .tempfile()?;
    file.write_all(data)?;
    file.flush()?;
    debug!("Table strategy working on {}", file.path().display());

    let doc = load_document_from_path(file.path())?;
    let tables = anchored_tables(&doc)?;
    if tables.is_empty() {
        return Err(StrategyError::NoTables);
    }

    let mut po = ExtractedPurchaseOrder::new(ExtractionMethod::TableFocused, render_tables(&tables));
    po.line_items = line_items_from_tables(&tables, settings.document.min_table_description_len);
    apply_confidence(&mut po, &settings.scoring);
    Ok(po)
}

/// Tables as text, one row per line, cells separated by `" | "`.
fn render_tables(tables: &[Table]) -> String {
    tables
        .iter()
        .map(|table| {
            table
                .iter()
                .map(|row| row.join(" | "))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Bytes pdf-extract can read: decrypted and re-serialised when needed.
fn text_layer_bytes(data: &[u8]) -> Result<Cow<'_, [u8]>, StrategyError> {
    let mut doc = Document::load_mem(data).map_err(|e| StrategyError::Load(e.to_string()))?;
    if !doc.is_encrypted() {
        return Ok(Cow::Borrowed(data));
    }

    doc.decrypt("")
        .map_err(|e| StrategyError::Load(format!("encrypted document: {}", e)))?;
    let mut decrypted = Vec::new();
    doc.save_to(&mut decrypted)
        .map_err(|e| StrategyError::Load(format!("failed to save decrypted PDF: {}", e)))?;
    Ok(Cow::Owned(decrypted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::{pdf_with_text, purchase_order_pdf, sparse_table_pdf};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn settings() -> ExtractionSettings {
        ExtractionSettings::default()
    }

    #[test]
    fn test_layout_aware_reads_fields_and_tables() {
        let po = layout_aware(&purchase_order_pdf(), &settings()).unwrap();

        assert_eq!(po.extraction_method, ExtractionMethod::LayoutAware);
        assert_eq!(po.po_number.as_deref(), Some("PO-2024-001"));
        assert_eq!(po.po_date.as_deref(), Some("15/01/2024"));
        assert_eq!(po.vendor_name.as_deref(), Some("Shree Cement Traders"));
        assert_eq!(po.total_amount, Some(Decimal::from(143000)));
        assert_eq!(po.line_items.len(), 2);
        assert_eq!(po.line_items[0].description, "OPC 53 grade cement");
        assert_eq!(po.line_items[1].unit, "Ton");
        assert!((po.confidence_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_table_focused_only_yields_line_items() {
        let po = table_focused(&purchase_order_pdf(), &settings()).unwrap();

        assert_eq!(po.po_number, None);
        assert_eq!(po.line_items.len(), 2);
        assert!(po.raw_text.contains("Description | Qty | Unit | Rate | Amount"));
        assert!((po.confidence_score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_table_focused_keeps_rows_layout_tables_drop() {
        let pdf = sparse_table_pdf();

        let layout = layout_aware(&pdf, &settings()).unwrap();
        assert!(layout.line_items.is_empty());

        let po = table_focused(&pdf, &settings()).unwrap();
        assert_eq!(po.line_items.len(), 2);
        assert_eq!(po.line_items[0].description, "Site mobilisation and temporary works");
        assert_eq!(po.line_items[0].unit, "Nos");
        assert_eq!(po.line_items[0].quantity, 1.0);
        assert_eq!(po.line_items[0].amount, 25000.0);
        assert_eq!(po.line_items[1].description, "OPC 53 grade cement");
        assert_eq!(po.line_items[1].quantity, 100.0);
        assert_eq!(po.line_items[1].amount, 39000.0);
    }

    #[test]
    fn test_table_focused_without_tables() {
        let pdf = pdf_with_text(&[(50, 800, "PO Number: 77")]);
        assert!(matches!(table_focused(&pdf, &settings()), Err(StrategyError::NoTables)));
    }

    #[test]
    fn test_table_focused_removes_temp_file() {
        let prefix = format!("docfield-cleanup-{}-", std::process::id());
        let settings = ExtractionSettings {
            document: crate::models::DocumentConfig {
                temp_file_prefix: prefix.clone(),
                ..Default::default()
            },
            ..Default::default()
        };

        let _ = table_focused(&purchase_order_pdf(), &settings);
        let _ = table_focused(b"%PDF-1.4 broken", &settings);

        let leftovers = std::fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_plain_text_strategy() {
        let po = plain_text(&purchase_order_pdf(), &settings()).unwrap();
        assert_eq!(po.extraction_method, ExtractionMethod::PlainText);
        assert!(po.raw_text.contains("PO-2024-001"));
        assert!(po.line_items.is_empty());
    }

    #[test]
    fn test_corrupt_bytes_fail_every_lopdf_strategy() {
        let garbage = b"%PDF-1.4\nthis is not really a pdf";
        assert!(matches!(layout_aware(garbage, &settings()), Err(StrategyError::Load(_))));
        assert!(matches!(plain_text(garbage, &settings()), Err(StrategyError::Load(_))));
        assert!(matches!(table_focused(garbage, &settings()), Err(StrategyError::Load(_))));
    }
}
