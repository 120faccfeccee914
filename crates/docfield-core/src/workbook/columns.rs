//! Column-role inference from a BOQ header row.
//!
//! Roles are assigned by [`ROLE_RULES`], an ordered table: each header cell
//! takes the role of the first rule whose keywords it contains and whose
//! exclusions it does not.

use std::collections::BTreeMap;
use std::fmt;

use calamine::Data;
use tracing::debug;

use super::sheet::SheetGrid;
use crate::coerce::to_text;

/// Semantic role of a BOQ column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnRole {
    Serial,
    Description,
    Unit,
    Quantity,
    Rate,
    Amount,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Serial => "serial",
            Self::Description => "description",
            Self::Unit => "unit",
            Self::Quantity => "quantity",
            Self::Rate => "rate",
            Self::Amount => "amount",
        };
        f.write_str(name)
    }
}

/// What happens when a role is already held by an earlier column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The later column takes the role.
    Replace,
    /// The earlier column keeps the role unless the later header contains one of these.
    KeepFirstUnless(&'static [&'static str]),
}

/// One row of the role priority table.
#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub role: ColumnRole,
    /// Header must contain at least one of these.
    pub any_of: &'static [&'static str],
    /// Header must contain none of these.
    pub none_of: &'static [&'static str],
    /// Rule only applies to the first `n` columns.
    pub within_first: Option<usize>,
    pub claim: Claim,
}

impl RoleRule {
    pub fn matches(&self, col: usize, header: &str) -> bool {
        self.within_first.is_none_or(|n| col < n)
            && self.any_of.iter().any(|k| header.contains(k))
            && !self.none_of.iter().any(|k| header.contains(k))
    }
}

pub const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        role: ColumnRole::Serial,
        any_of: &["s.no", "sr.no", "serial", "sl", "sno"],
        none_of: &[],
        within_first: Some(2),
        claim: Claim::Replace,
    },
    RoleRule {
        role: ColumnRole::Description,
        any_of: &["description", "item", "particular", "work", "scope"],
        none_of: &["unit", "rate"],
        within_first: None,
        claim: Claim::Replace,
    },
    RoleRule {
        role: ColumnRole::Unit,
        any_of: &["unit", "uom", "u.o.m"],
        none_of: &["rate", "price", "amount"],
        within_first: None,
        claim: Claim::Replace,
    },
    RoleRule {
        role: ColumnRole::Quantity,
        any_of: &["qty", "quantity"],
        none_of: &["rate", "unit"],
        within_first: None,
        claim: Claim::Replace,
    },
    RoleRule {
        role: ColumnRole::Rate,
        any_of: &["rate", "price"],
        none_of: &["amount", "total"],
        within_first: None,
        claim: Claim::KeepFirstUnless(&["unit"]),
    },
    RoleRule {
        role: ColumnRole::Amount,
        any_of: &["amount", "total"],
        none_of: &["rate", "unit"],
        within_first: None,
        claim: Claim::Replace,
    },
];

/// Columns used by the description fallback.
const DESCRIPTION_FALLBACK_COLS: usize = 5;
/// Columns used by the unit fallback (column A is never a unit).
const UNIT_FALLBACK_COLS: std::ops::Range<usize> = 1..6;
/// Data rows sampled by the unit fallback.
const UNIT_FALLBACK_SAMPLE: usize = 5;

/// Role → zero-based column index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap(BTreeMap<ColumnRole, usize>);

impl ColumnMap {
    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.0.get(&role).copied()
    }

    pub fn insert(&mut self, role: ColumnRole, col: usize) {
        self.0.insert(role, col);
    }

    pub fn contains(&self, role: ColumnRole) -> bool {
        self.0.contains_key(&role)
    }

    /// Whether any role already uses this column.
    pub fn is_claimed(&self, col: usize) -> bool {
        self.0.values().any(|&c| c == col)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnRole, usize)> + '_ {
        self.0.iter().map(|(r, c)| (*r, *c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// First rule that applies to a lowercased header cell.
pub fn classify_header(col: usize, header: &str) -> Option<&'static RoleRule> {
    ROLE_RULES.iter().find(|rule| rule.matches(col, header))
}

/// Assign roles to the columns of `header_row`, then fill in description and
/// unit from position/content when no header named them.
pub fn map_columns(sheet: &SheetGrid, header_row: usize) -> ColumnMap {
    let mut map = ColumnMap::default();

    for col in 0..sheet.width() {
        let header = to_text(sheet.cell(header_row, col)).to_lowercase();
        if header.is_empty() {
            continue;
        }

        let Some(rule) = classify_header(col, &header) else {
            continue;
        };

        let take = match rule.claim {
            Claim::Replace => true,
            Claim::KeepFirstUnless(preferred) => {
                !map.contains(rule.role) || preferred.iter().any(|k| header.contains(k))
            }
        };

        if take {
            debug!("Column {} '{}' -> {}", col + 1, header, rule.role);
            map.insert(rule.role, col);
        }
    }

    if !map.contains(ColumnRole::Description) {
        if let Some(col) = (0..DESCRIPTION_FALLBACK_COLS.min(sheet.width())).find(|&c| !map.is_claimed(c)) {
            debug!("Fallback: description -> column {}", col + 1);
            map.insert(ColumnRole::Description, col);
        }
    }

    if !map.contains(ColumnRole::Unit) {
        let end = UNIT_FALLBACK_COLS.end.min(sheet.width());
        if let Some(col) = (UNIT_FALLBACK_COLS.start..end)
            .find(|&c| !map.is_claimed(c) && has_text_values(sheet, header_row, c))
        {
            debug!("Fallback: unit -> column {} (text content)", col + 1);
            map.insert(ColumnRole::Unit, col);
        }
    }

    debug!("Column mapping: {:?}", map);
    map
}

/// Whether the rows just below the header hold non-numeric text in `col`.
fn has_text_values(sheet: &SheetGrid, header_row: usize, col: usize) -> bool {
    (header_row + 1..=header_row + UNIT_FALLBACK_SAMPLE).any(|row| match sheet.cell(row, col) {
        Data::String(s) => {
            let s = s.trim();
            !s.is_empty() && !s.replace('.', "").chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn sheet(rows: Vec<Vec<Data>>) -> SheetGrid {
        SheetGrid::new("BOQ", rows)
    }

    fn role_of(header: &str, col: usize) -> Option<ColumnRole> {
        classify_header(col, header).map(|r| r.role)
    }

    #[test]
    fn test_standard_header_mapping() {
        let grid = sheet(vec![vec![
            s("S.No"),
            s("Description"),
            s("Unit"),
            s("Quantity"),
            s("Rate"),
            s("Amount"),
        ]]);

        let map = map_columns(&grid, 0);

        assert_eq!(map.get(ColumnRole::Serial), Some(0));
        assert_eq!(map.get(ColumnRole::Description), Some(1));
        assert_eq!(map.get(ColumnRole::Unit), Some(2));
        assert_eq!(map.get(ColumnRole::Quantity), Some(3));
        assert_eq!(map.get(ColumnRole::Rate), Some(4));
        assert_eq!(map.get(ColumnRole::Amount), Some(5));
    }

    #[test]
    fn test_exclusion_rules() {
        // "rate" keeps a header out of amount, "amount"/"total" keep it out of rate
        assert_eq!(role_of("rate amount", 4), None);
        assert_eq!(role_of("total rate", 4), None);
        assert_eq!(role_of("amount", 4), Some(ColumnRole::Amount));
        assert_eq!(role_of("unit rate", 4), Some(ColumnRole::Rate));
        assert_eq!(role_of("unit", 4), Some(ColumnRole::Unit));
        assert_eq!(role_of("qty", 4), Some(ColumnRole::Quantity));
        assert_eq!(role_of("item description", 4), Some(ColumnRole::Description));
    }

    #[test]
    fn test_serial_only_in_first_two_columns() {
        assert_eq!(role_of("s.no", 1), Some(ColumnRole::Serial));
        assert_eq!(role_of("s.no", 2), None);
    }

    #[test]
    fn test_unit_rate_overrides_plain_rate() {
        let grid = sheet(vec![vec![
            s("Description"),
            s("Qty"),
            s("Rate"),
            s("Unit Rate"),
            s("Price"),
        ]]);

        let map = map_columns(&grid, 0);
        assert_eq!(map.get(ColumnRole::Rate), Some(3));
    }

    #[test]
    fn test_plain_rate_does_not_override() {
        let grid = sheet(vec![vec![s("Description"), s("Qty"), s("Rate"), s("Price")]]);
        let map = map_columns(&grid, 0);
        assert_eq!(map.get(ColumnRole::Rate), Some(2));
    }

    #[test]
    fn test_later_description_replaces_earlier() {
        let grid = sheet(vec![vec![s("Item No"), s("Description of Work"), s("Qty")]]);
        let map = map_columns(&grid, 0);
        assert_eq!(map.get(ColumnRole::Description), Some(1));
    }

    #[test]
    fn test_description_fallback_uses_first_unclaimed_column() {
        let grid = sheet(vec![vec![s("Sl"), s("Specification"), s("Qty"), s("Rate")]]);
        let map = map_columns(&grid, 0);
        assert_eq!(map.get(ColumnRole::Serial), Some(0));
        assert_eq!(map.get(ColumnRole::Description), Some(1));
    }

    #[test]
    fn test_unit_fallback_requires_text_values() {
        let grid = sheet(vec![
            vec![s("Description"), s("Qty"), s("Code"), s("Measure"), s("Rate")],
            vec![s("Excavation"), Data::Float(10.0), s("12.5"), s("Cum"), Data::Float(150.0)],
            vec![s("PCC"), Data::Float(5.0), s("7"), s("Cum"), Data::Float(4000.0)],
        ]);

        let map = map_columns(&grid, 0);
        assert_eq!(map.get(ColumnRole::Unit), Some(3));
    }

    #[test]
    fn test_columns_hold_at_most_one_role() {
        let grid = sheet(vec![vec![
            s("S.No"),
            s("Description"),
            s("Unit"),
            s("Quantity"),
            s("Rate"),
            s("Amount"),
        ]]);
        let map = map_columns(&grid, 0);
        let mut cols: Vec<usize> = map.iter().map(|(_, c)| c).collect();
        cols.sort_unstable();
        cols.dedup();
        assert_eq!(cols.len(), map.len());
    }
}
