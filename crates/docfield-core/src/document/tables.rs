//! Mapping extracted tables to purchase-order line items.

use tracing::debug;

use crate::coerce::{to_number, to_text};
use crate::models::LineItem;
use crate::units::normalize_unit;

/// A table as rows of cell text; the first row is the header.
pub type Table = Vec<Vec<String>>;

/// Header variations per line-item column.
const DESCRIPTION_HEADERS: &[&str] = &["description", "item", "product", "service"];
const QUANTITY_HEADERS: &[&str] = &["quantity", "qty", "nos", "number"];
const RATE_HEADERS: &[&str] = &["rate", "price", "unit price", "cost"];
const AMOUNT_HEADERS: &[&str] = &["amount", "total", "value", "line total"];
const UNIT_HEADERS: &[&str] = &["unit", "uom", "u.o.m", "measure"];

/// Column positions found in a table header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemColumns {
    pub description: Option<usize>,
    pub quantity: Option<usize>,
    pub rate: Option<usize>,
    pub amount: Option<usize>,
    pub unit: Option<usize>,
}

impl LineItemColumns {
    /// Locate each column independently: the first header containing any of
    /// its variations.
    pub fn from_header(header: &[String]) -> Self {
        let headers: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |variations: &[&str]| {
            headers
                .iter()
                .position(|h| variations.iter().any(|v| h.contains(v)))
        };

        Self {
            description: find(DESCRIPTION_HEADERS),
            quantity: find(QUANTITY_HEADERS),
            rate: find(RATE_HEADERS),
            amount: find(AMOUNT_HEADERS),
            unit: find(UNIT_HEADERS),
        }
    }
}

/// Turn tables into line items.
///
/// Tables with fewer than two rows are skipped, as are rows with fewer than
/// two cells and rows whose description is shorter than
/// `min_description_len` characters.
pub fn line_items_from_tables(tables: &[Table], min_description_len: usize) -> Vec<LineItem> {
    let mut items = Vec::new();

    for table in tables {
        let [header, rows @ ..] = table.as_slice() else {
            continue;
        };
        if rows.is_empty() {
            continue;
        }

        let columns = LineItemColumns::from_header(header);
        debug!("Table with {} rows, columns {:?}", rows.len(), columns);

        for row in rows.iter().filter(|r| r.len() >= 2) {
            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(String::as_str);

            let description = to_text(&cell(columns.description));
            if description.chars().count() < min_description_len {
                continue;
            }

            let quantity = to_number(&cell(columns.quantity));
            let unit = match cell(columns.unit) {
                Some(raw) => normalize_unit(raw),
                None => "Nos".to_string(),
            };

            items.push(LineItem {
                description,
                unit,
                quantity: if quantity == 0.0 { 1.0 } else { quantity },
                rate: to_number(&cell(columns.rate)),
                amount: to_number(&cell(columns.amount)),
            });
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(rows: &[&[&str]]) -> Table {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_standard_table() {
        let tables = vec![table(&[
            &["Sr", "Item Description", "Qty", "UOM", "Rate", "Amount"],
            &["1", "OPC 53 grade cement", "100", "bags", "390", "39,000"],
            &["2", "TMT bars 12mm", "2", "MT", "₹ 52,000", "1,04,000"],
        ])];

        let items = line_items_from_tables(&tables, 4);

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            LineItem {
                description: "OPC 53 grade cement".to_string(),
                unit: "bags".to_string(),
                quantity: 100.0,
                rate: 390.0,
                amount: 39000.0,
            }
        );
        assert_eq!(items[1].unit, "Ton");
        assert_eq!(items[1].rate, 52000.0);
        assert_eq!(items[1].amount, 104000.0);
    }

    #[test]
    fn test_short_descriptions_and_narrow_rows_skipped() {
        let tables = vec![table(&[
            &["Description", "Qty", "Amount"],
            &["Bolt", "10", "50"],
            &["Nut", "10", "20"],
            &["Washer set"],
        ])];

        let items = line_items_from_tables(&tables, 4);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Bolt");
        assert_eq!(items[0].unit, "Nos");
    }

    #[test]
    fn test_unparseable_quantity_defaults_to_one() {
        let tables = vec![table(&[
            &["Product", "Quantity", "Price"],
            &["Site supervision", "lump sum", "15000"],
        ])];

        let items = line_items_from_tables(&tables, 4);
        assert_eq!(items[0].quantity, 1.0);
        assert_eq!(items[0].rate, 15000.0);
        assert_eq!(items[0].amount, 0.0);
    }

    #[test]
    fn test_header_only_tables_yield_nothing() {
        let tables = vec![table(&[&["Description", "Qty"]]), Vec::new()];
        assert!(line_items_from_tables(&tables, 4).is_empty());
    }
}
