//! Word document strategy.
//!
//! Reads `word/document.xml` out of the archive: body paragraphs become the
//! free text, top-level tables become line-item tables. Table text is kept
//! out of the free text so a table "Total" column does not read as a total.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use super::build_candidate;
use super::strategy::{ExtractionSettings, StrategyResult};
use super::tables::Table;
use crate::error::StrategyError;
use crate::models::ExtractionMethod;

/// Paragraph text and tables of a Word document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxContent {
    pub paragraphs: Vec<String>,
    pub tables: Vec<Table>,
}

impl DocxContent {
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

/// Extract a purchase order from DOCX bytes.
pub fn extract_docx(data: &[u8], settings: &ExtractionSettings) -> StrategyResult {
    let content = read_docx(data)?;
    debug!(
        "DOCX: {} paragraphs, {} tables",
        content.paragraphs.len(),
        content.tables.len()
    );
    build_candidate(&content.text(), &content.tables, ExtractionMethod::Docx, settings)
}

/// Read paragraphs and tables out of a DOCX archive.
pub fn read_docx(data: &[u8]) -> Result<DocxContent, StrategyError> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| StrategyError::Docx(format!("failed to open archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| StrategyError::Docx(format!("missing word/document.xml: {}", e)))?
        .read_to_string(&mut xml)?;

    parse_document_xml(&xml)
}

/// Walk WordprocessingML, collecting body paragraphs and outermost tables.
fn parse_document_xml(xml: &str) -> Result<DocxContent, StrategyError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut content = DocxContent::default();
    let mut paragraph = String::new();
    let mut in_text = false;

    // Nested tables are flattened into the enclosing cell.
    let mut table_depth = 0usize;
    let mut table: Table = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"tbl" => {
                    table_depth += 1;
                    if table_depth == 1 {
                        table = Vec::new();
                    }
                }
                b"tr" if table_depth == 1 => row = Vec::new(),
                b"tc" if table_depth == 1 => cell = String::new(),
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    let text = e
                        .unescape()
                        .map_err(|e| StrategyError::Docx(e.to_string()))?;
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let text = paragraph.trim();
                    if table_depth == 0 {
                        content.paragraphs.push(text.to_string());
                    } else if !text.is_empty() {
                        if !cell.is_empty() {
                            cell.push(' ');
                        }
                        cell.push_str(text);
                    }
                    paragraph.clear();
                }
                b"tc" if table_depth == 1 => row.push(std::mem::take(&mut cell)),
                b"tr" if table_depth == 1 => table.push(std::mem::take(&mut row)),
                b"tbl" => {
                    if table_depth == 1 {
                        content.tables.push(std::mem::take(&mut table));
                    }
                    table_depth = table_depth.saturating_sub(1);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(StrategyError::Docx(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::{docx_with_body, paragraph, table};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn order_body() -> String {
        [
            paragraph("PURCHASE ORDER"),
            paragraph("PO Number: PO-2024-017"),
            paragraph("Date: 03/02/2024"),
            paragraph("Supplier: Kaveri Steel &amp; Alloys"),
            table(&[
                &["Item", "Qty", "UOM", "Price", "Total"],
                &["TMT bars 16mm", "4.5", "MT", "58,000", "2,61,000"],
                &["Binding wire", "50", "kg", "85", "4,250"],
            ]),
            paragraph("Grand Total: 2,65,250"),
        ]
        .concat()
    }

    #[test]
    fn test_read_paragraphs_and_tables() {
        let content = read_docx(&docx_with_body(&order_body())).unwrap();

        assert_eq!(content.paragraphs[1], "PO Number: PO-2024-017");
        assert_eq!(content.paragraphs[3], "Supplier: Kaveri Steel & Alloys");
        assert_eq!(content.tables.len(), 1);
        assert_eq!(content.tables[0][0], vec!["Item", "Qty", "UOM", "Price", "Total"]);
        assert!(!content.text().contains("Binding wire"));
    }

    #[test]
    fn test_extract_docx_order() {
        let po = extract_docx(&docx_with_body(&order_body()), &ExtractionSettings::default()).unwrap();

        assert_eq!(po.extraction_method, ExtractionMethod::Docx);
        assert_eq!(po.po_number.as_deref(), Some("PO-2024-017"));
        assert_eq!(po.po_date.as_deref(), Some("03/02/2024"));
        assert_eq!(po.vendor_name.as_deref(), Some("Kaveri Steel & Alloys"));
        assert_eq!(po.total_amount, Some(Decimal::from(265250)));
        assert_eq!(po.line_items.len(), 2);
        assert_eq!(po.line_items[0].quantity, 4.5);
        assert_eq!(po.line_items[0].unit, "Ton");
        assert_eq!(po.line_items[1].unit, "Kg");
        assert_eq!(po.line_items[1].amount, 4250.0);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(read_docx(b"plain text"), Err(StrategyError::Docx(_))));
    }

    #[test]
    fn test_zip_without_document_xml() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"hello").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert!(matches!(read_docx(&bytes), Err(StrategyError::Docx(_))));
    }
}
