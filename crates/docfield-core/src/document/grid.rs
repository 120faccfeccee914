//! Header-anchored table reading for the table-focused strategy.
//!
//! The layout pass splits every line at wide gaps and only keeps runs of
//! lines that split into enough cells. This pass instead looks for a
//! line-item header by its keywords, takes the x position of each header
//! word as a column anchor, and drops every fragment below it into the
//! column it sits under. Rows with empty cells and descriptions wrapped onto
//! a second line stay in the table.

use lopdf::Document;
use tracing::{debug, trace};

use super::layout::{page_fragments, TextFragment};
use super::tables::{LineItemColumns, Table};
use crate::error::StrategyError;

/// Baseline distance (as a fraction of the font size) within which
/// fragments share a row.
const ROW_TOLERANCE: f32 = 0.3;
/// Header words closer than this (points) belong to one column title.
const HEADER_WORD_GAP: f32 = 6.0;
/// A fragment may start this far left of its column's anchor.
const ANCHOR_SLACK: f32 = 8.0;
/// Rows further apart than this many font sizes end the table.
const MAX_ROW_GAP: f32 = 2.2;
/// Line-item columns a header must name.
const MIN_HEADER_COLUMNS: usize = 3;

#[derive(Debug)]
struct Row {
    y: f32,
    font_size: f32,
    fragments: Vec<TextFragment>,
}

/// Tables of every page, header row first.
pub fn anchored_tables(doc: &Document) -> Result<Vec<Table>, StrategyError> {
    let mut tables = Vec::new();

    for (page_num, page_id) in doc.get_pages() {
        let rows = baseline_rows(page_fragments(doc, page_id)?);
        let found = tables_on_page(&rows);
        debug!("Page {}: {} anchored tables", page_num, found.len());
        tables.extend(found);
    }

    Ok(tables)
}

fn baseline_rows(mut fragments: Vec<TextFragment>) -> Vec<Row> {
    fragments.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<Row> = Vec::new();
    for fragment in fragments {
        match rows.last_mut() {
            Some(row) if (row.y - fragment.y).abs() <= row.font_size * ROW_TOLERANCE => {
                row.fragments.push(fragment);
            }
            _ => rows.push(Row {
                y: fragment.y,
                font_size: fragment.font_size.max(1.0),
                fragments: vec![fragment],
            }),
        }
    }

    for row in &mut rows {
        row.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    rows
}

fn tables_on_page(rows: &[Row]) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut index = 0;

    while index < rows.len() {
        let Some(anchors) = header_anchors(&rows[index]) else {
            index += 1;
            continue;
        };

        let header: Vec<String> = anchors.iter().map(|(_, title)| title.clone()).collect();
        let xs: Vec<f32> = anchors.iter().map(|(x, _)| *x).collect();
        let (body, consumed) = read_body(&rows[index..], &xs);
        trace!("Header {:?} with {} rows", header, body.len());

        if !body.is_empty() {
            let mut table = vec![header];
            table.extend(body);
            tables.push(table);
        }
        index += consumed.max(1);
    }

    tables
}

/// Column anchors `(x, title)` when the row reads as a line-item header.
fn header_anchors(row: &Row) -> Option<Vec<(f32, String)>> {
    let mut anchors: Vec<(f32, String)> = Vec::new();
    let mut previous_end: Option<f32> = None;

    for fragment in &row.fragments {
        let text = fragment.text.trim();
        if text.is_empty() {
            continue;
        }
        match anchors.last_mut() {
            Some((_, title)) if previous_end.is_some_and(|end| fragment.x - end < HEADER_WORD_GAP) => {
                title.push(' ');
                title.push_str(text);
            }
            _ => anchors.push((fragment.x, text.to_string())),
        }
        previous_end = Some(fragment.x + fragment.width);
    }

    let titles: Vec<String> = anchors.iter().map(|(_, title)| title.clone()).collect();
    let columns = LineItemColumns::from_header(&titles);
    let named = [columns.description, columns.quantity, columns.unit, columns.rate, columns.amount]
        .iter()
        .filter(|c| c.is_some())
        .count();

    (columns.description.is_some() && named >= MIN_HEADER_COLUMNS).then_some(anchors)
}

/// Rows under a header. Returns the rows and how many input rows (header
/// included) they span.
fn read_body(rows: &[Row], anchors: &[f32]) -> (Vec<Vec<String>>, usize) {
    let mut body: Vec<Vec<String>> = Vec::new();
    let mut previous = &rows[0];
    let mut consumed = 1;

    for row in &rows[1..] {
        if previous.y - row.y > previous.font_size * MAX_ROW_GAP {
            break;
        }

        let cells = place_cells(row, anchors);
        let first_only = cells[1..].iter().all(String::is_empty);

        if first_only {
            // A wrapped description continues the row above it.
            let continued = cells[0].to_lowercase();
            match body.last_mut() {
                Some(last) if !continued.contains("total") => {
                    last[0].push(' ');
                    last[0].push_str(&cells[0]);
                }
                _ => break,
            }
        } else if cells[1..].iter().any(|c| c.chars().any(|ch| ch.is_ascii_digit())) {
            body.push(cells);
        } else {
            break;
        }

        previous = row;
        consumed += 1;
    }

    (body, consumed)
}

fn place_cells(row: &Row, anchors: &[f32]) -> Vec<String> {
    let mut cells = vec![String::new(); anchors.len()];

    for fragment in &row.fragments {
        let text = fragment.text.trim();
        if text.is_empty() {
            continue;
        }
        let column = anchors
            .iter()
            .rposition(|&anchor| anchor <= fragment.x + ANCHOR_SLACK)
            .unwrap_or(0);
        let cell = &mut cells[column];
        if !cell.is_empty() {
            cell.push(' ');
        }
        cell.push_str(text);
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fragment(x: f32, y: f32, text: &str) -> TextFragment {
        TextFragment {
            x,
            y,
            width: text.chars().count() as f32 * 5.0,
            font_size: 10.0,
            text: text.to_string(),
        }
    }

    fn header(y: f32) -> Vec<TextFragment> {
        vec![
            fragment(50.0, y, "Description"),
            fragment(250.0, y, "Qty"),
            fragment(320.0, y, "Unit"),
            fragment(380.0, y, "Rate"),
            fragment(450.0, y, "Amount"),
        ]
    }

    fn tables(fragments: Vec<TextFragment>) -> Vec<Table> {
        tables_on_page(&baseline_rows(fragments))
    }

    #[test]
    fn test_sparse_rows_and_wrapped_descriptions() {
        let mut fragments = header(700.0);
        fragments.extend([
            fragment(50.0, 685.0, "Site mobilisation and"),
            fragment(450.0, 685.0, "25000"),
            fragment(50.0, 673.0, "temporary works"),
            fragment(50.0, 658.0, "Binding wire"),
            fragment(252.0, 658.0, "50"),
            fragment(320.0, 658.0, "kg"),
            fragment(380.0, 658.0, "85"),
            fragment(447.0, 658.0, "4250"),
        ]);

        let found = tables(fragments);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0][0], vec!["Description", "Qty", "Unit", "Rate", "Amount"]);
        assert_eq!(
            found[0][1],
            vec!["Site mobilisation and temporary works", "", "", "", "25000"]
        );
        assert_eq!(found[0][2], vec!["Binding wire", "50", "kg", "85", "4250"]);
    }

    #[test]
    fn test_distant_total_line_ends_the_table() {
        let mut fragments = header(700.0);
        fragments.extend([
            fragment(50.0, 685.0, "Binding wire"),
            fragment(250.0, 685.0, "50"),
            fragment(450.0, 685.0, "4250"),
            fragment(50.0, 673.0, "Sub total 4250"),
            fragment(50.0, 600.0, "Terms and conditions apply"),
        ]);

        let found = tables(fragments);
        assert_eq!(found[0].len(), 2);
        assert_eq!(found[0][1][0], "Binding wire");
    }

    #[test]
    fn test_multi_word_titles_form_one_column() {
        let rows = baseline_rows(vec![
            fragment(50.0, 700.0, "Item"),
            fragment(73.0, 700.0, "Description"),
            fragment(250.0, 700.0, "Quantity"),
            fragment(380.0, 700.0, "Unit"),
            fragment(420.0, 700.0, "Price"),
        ]);

        let anchors = header_anchors(&rows[0]).unwrap();
        assert_eq!(anchors[0], (50.0, "Item Description".to_string()));
        assert_eq!(anchors.len(), 4);
    }

    #[test]
    fn test_prose_is_not_a_header() {
        let rows = baseline_rows(vec![fragment(50.0, 700.0, "Description of works as per quantity schedule")]);
        assert!(header_anchors(&rows[0]).is_none());

        let rows = baseline_rows(vec![
            fragment(50.0, 700.0, "Qty"),
            fragment(250.0, 700.0, "Rate"),
            fragment(320.0, 700.0, "Amount"),
        ]);
        assert!(header_anchors(&rows[0]).is_none());
    }
}
