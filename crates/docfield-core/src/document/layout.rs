//! Positioned text from PDF content streams.
//!
//! Walks a page's text operators with lopdf, tracking the text matrix, and
//! emits fragments at their baseline position. Fragments are then grouped
//! into lines by baseline and split into cells at wide horizontal gaps; runs
//! of consecutive multi-cell lines become tables.
//!
//! Glyph widths are estimated (half the font size per character), and
//! strings are decoded as UTF-16BE when they carry a byte-order mark,
//! Latin-1 otherwise. Fonts with custom encodings decode to noise, which the
//! other text strategies cover.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use super::tables::Table;
use crate::error::StrategyError;

/// Approximate glyph advance as a fraction of the font size.
const GLYPH_WIDTH_FACTOR: f32 = 0.5;
/// TJ adjustments (thousandths of an em) more negative than this read as a space.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// A run of text at a position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub text: String,
}

impl TextFragment {
    fn end(&self) -> f32 {
        self.x + self.width
    }
}

/// One visual line, split into cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub y: f32,
    pub cells: Vec<String>,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.cells.join(" ")
    }
}

/// Thresholds for line grouping and table detection.
#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    pub line_tolerance: f32,
    pub column_gap: f32,
    pub min_table_columns: usize,
}

/// Text and tables of a whole document.
#[derive(Debug, Clone, Default)]
pub struct LayoutExtraction {
    pub text: String,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Copy)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translate(&self, tx: f32, ty: f32) -> Matrix {
        Matrix {
            e: self.e + tx * self.a + ty * self.c,
            f: self.f + tx * self.b + ty * self.d,
            ..*self
        }
    }

    fn vertical_scale(&self) -> f32 {
        let scale = (self.b * self.b + self.d * self.d).sqrt();
        if scale > 0.0 { scale } else { 1.0 }
    }
}

/// Text state while walking one content stream.
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font_size: f32,
    leading: f32,
    fragments: Vec<TextFragment>,
}

impl TextState {
    fn new() -> Self {
        Self {
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font_size: 12.0,
            leading: 0.0,
            fragments: Vec::new(),
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = self.tlm.translate(tx, ty);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn show(&mut self, text: String) {
        let size = self.font_size * self.tm.vertical_scale();
        let width = text.chars().count() as f32 * size * GLYPH_WIDTH_FACTOR;

        if !text.trim().is_empty() {
            self.fragments.push(TextFragment {
                x: self.tm.e,
                y: self.tm.f,
                width,
                font_size: size,
                text,
            });
        }

        self.tm = self.tm.translate(width / self.tm.vertical_scale(), 0.0);
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "BT" => {
                self.tm = Matrix::IDENTITY;
                self.tlm = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    self.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let [tx, ty] = operands {
                    let (Some(tx), Some(ty)) = (number(tx), number(ty)) else {
                        return;
                    };
                    if operator == "TD" {
                        self.leading = -ty;
                    }
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                let values: Vec<f32> = operands.iter().filter_map(number).collect();
                if let [a, b, c, d, e, f] = values[..] {
                    self.tlm = Matrix { a, b, c, d, e, f };
                    self.tm = self.tlm;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(text) = operands.first().and_then(decode_string) {
                    self.show(text);
                }
            }
            "'" => {
                self.next_line();
                if let Some(text) = operands.first().and_then(decode_string) {
                    self.show(text);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(text) = operands.get(2).and_then(decode_string) {
                    self.show(text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = operands.first() {
                    let mut text = String::new();
                    for part in parts {
                        match part {
                            Object::String(..) => {
                                if let Some(s) = decode_string(part) {
                                    text.push_str(&s);
                                }
                            }
                            other => {
                                if number(other).is_some_and(|n| n < TJ_SPACE_THRESHOLD) {
                                    text.push(' ');
                                }
                            }
                        }
                    }
                    self.show(text);
                }
            }
            _ => {}
        }
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn decode_string(obj: &Object) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if let [0xFE, 0xFF, rest @ ..] = bytes.as_slice() {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&units));
    }

    Some(bytes.iter().map(|&b| b as char).collect())
}

/// Text fragments of one page, in content-stream order.
pub fn page_fragments(doc: &Document, page_id: ObjectId) -> Result<Vec<TextFragment>, StrategyError> {
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| StrategyError::TextExtraction(e.to_string()))?;
    let content = Content::decode(&data).map_err(|e| StrategyError::TextExtraction(e.to_string()))?;

    let mut state = TextState::new();
    for op in &content.operations {
        state.apply(&op.operator, &op.operands);
    }

    trace!("Page {:?}: {} fragments", page_id, state.fragments.len());
    Ok(state.fragments)
}

/// Group fragments into lines (top to bottom) and split each line into cells.
pub fn group_lines(mut fragments: Vec<TextFragment>, options: &LayoutOptions) -> Vec<TextLine> {
    fragments.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<(f32, Vec<TextFragment>)> = Vec::new();
    for fragment in fragments {
        match rows.last_mut() {
            Some((y, row)) if (*y - fragment.y).abs() <= options.line_tolerance => row.push(fragment),
            _ => rows.push((fragment.y, vec![fragment])),
        }
    }

    rows.into_iter()
        .map(|(y, mut row)| {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            TextLine {
                y,
                cells: split_cells(&row, options.column_gap),
            }
        })
        .collect()
}

fn split_cells(row: &[TextFragment], column_gap: f32) -> Vec<String> {
    let mut cells: Vec<String> = Vec::new();
    let mut previous_end: Option<f32> = None;

    for fragment in row {
        let text = fragment.text.trim();
        let gap = previous_end.map(|end| fragment.x - end);

        match cells.last_mut() {
            Some(cell) if gap.is_some_and(|g| g < column_gap) => {
                if gap.is_some_and(|g| g > fragment.font_size * 0.1) {
                    cell.push(' ');
                }
                cell.push_str(text);
            }
            _ => cells.push(text.to_string()),
        }
        previous_end = Some(fragment.end());
    }

    cells
}

/// Runs of at least two consecutive lines with `min_columns` or more cells.
pub fn detect_tables(lines: &[TextLine], min_columns: usize) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Table = Vec::new();

    for line in lines {
        if line.cells.len() >= min_columns {
            current.push(line.cells.clone());
        } else {
            flush_table(&mut current, &mut tables);
        }
    }
    flush_table(&mut current, &mut tables);

    tables
}

fn flush_table(current: &mut Table, tables: &mut Vec<Table>) {
    if current.len() >= 2 {
        tables.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Reconstruct text and tables for every page of a loaded document.
pub fn extract_layout(doc: &Document, options: &LayoutOptions) -> Result<LayoutExtraction, StrategyError> {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(StrategyError::Load("document has no pages".to_string()));
    }

    let mut extraction = LayoutExtraction::default();
    let mut page_texts = Vec::with_capacity(pages.len());

    for (page_num, page_id) in pages {
        let fragments = page_fragments(doc, page_id)?;
        let lines = group_lines(fragments, options);

        page_texts.push(
            lines
                .iter()
                .map(TextLine::text)
                .collect::<Vec<_>>()
                .join("\n"),
        );

        let tables = detect_tables(&lines, options.min_table_columns);
        debug!("Page {}: {} lines, {} tables", page_num, lines.len(), tables.len());
        extraction.tables.extend(tables);
    }

    extraction.text = page_texts.join("\n");
    Ok(extraction)
}
