//! In-memory document builders for tests.

use std::io::{Cursor, Write};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A single-page Helvetica PDF with each `(x, y, text)` shown at that position.
pub fn pdf_with_text(lines: &[(i64, i64, &str)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for &(x, y, text) in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
        operations.push(Operation::new("Td", vec![x.into(), y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A purchase order with header fields, a three-line table and a total.
pub fn purchase_order_pdf() -> Vec<u8> {
    pdf_with_text(&[
        (50, 800, "PURCHASE ORDER"),
        (50, 780, "PO Number: PO-2024-001"),
        (50, 765, "PO Date: 15/01/2024"),
        (50, 750, "Vendor: Shree Cement Traders"),
        (50, 700, "Description"),
        (250, 700, "Qty"),
        (320, 700, "Unit"),
        (380, 700, "Rate"),
        (450, 700, "Amount"),
        (50, 685, "OPC 53 grade cement"),
        (250, 685, "100"),
        (320, 685, "bags"),
        (380, 685, "390"),
        (450, 685, "39000"),
        (50, 670, "TMT bars 12mm"),
        (250, 670, "2"),
        (320, 670, "MT"),
        (380, 670, "52000"),
        (450, 670, "104000"),
        (50, 640, "TOTAL AMOUNT: Rs. 143000"),
    ])
}

/// A line-item table with a sparse row and a wrapped description, which the
/// gap-split layout tables break apart.
pub fn sparse_table_pdf() -> Vec<u8> {
    pdf_with_text(&[
        (50, 800, "PO Number: PO-2024-031"),
        (50, 700, "Description"),
        (250, 700, "Qty"),
        (320, 700, "Unit"),
        (380, 700, "Rate"),
        (450, 700, "Amount"),
        (50, 685, "Site mobilisation and"),
        (450, 685, "25000"),
        (50, 673, "temporary works"),
        (50, 658, "OPC 53 grade cement"),
        (250, 658, "100"),
        (320, 658, "bags"),
        (380, 658, "390"),
        (450, 658, "39000"),
    ])
}

/// A DOCX archive whose body is the given WordprocessingML fragment.
pub fn docx_with_body(body: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// A paragraph with a single run.
pub fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>")
}

/// A table whose cells each hold one paragraph.
pub fn table(rows: &[&[&str]]) -> String {
    let rows: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!("<w:tc>{}</w:tc>", paragraph(cell)))
                .collect();
            format!("<w:tr>{cells}</w:tr>")
        })
        .collect();
    format!("<w:tbl>{rows}</w:tbl>")
}
