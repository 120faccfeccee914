//! Bill-of-quantities records produced by the workbook path.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Project attribute scraped from the top of a BOQ sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    ProjectName,
    Architect,
    Client,
    Location,
    Date,
}

impl MetadataField {
    pub const ALL: [MetadataField; 5] = [
        Self::ProjectName,
        Self::Architect,
        Self::Client,
        Self::Location,
        Self::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectName => "project_name",
            Self::Architect => "architect",
            Self::Client => "client",
            Self::Location => "location",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project attributes keyed by canonical field name.
pub type ProjectMetadata = BTreeMap<MetadataField, String>;

/// One accepted BOQ line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoqItem {
    /// 1-based position among accepted rows, independent of the sheet's own numbering.
    pub serial_number: u32,
    pub description: String,
    pub unit: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
    /// GST percentage applied to this item.
    pub gst_rate: f64,
}

impl BoqItem {
    /// GST on the item amount.
    pub fn gst_amount(&self) -> f64 {
        self.amount * self.gst_rate / 100.0
    }

    /// Item amount including GST.
    pub fn total_with_gst(&self) -> f64 {
        self.amount + self.gst_amount()
    }
}

/// How far a BOQ parse got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoqParseStatus {
    /// Header found and at least one item accepted.
    Complete,
    /// Header found but every row was rejected.
    NoItems,
    /// No header row in the scan window; metadata is still populated.
    NoHeaderRow,
    /// The workbook has no worksheets.
    NoWorksheet,
}

impl BoqParseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::NoItems => "no_items",
            Self::NoHeaderRow => "no_header_row",
            Self::NoWorksheet => "no_worksheet",
        }
    }
}

impl fmt::Display for BoqParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of parsing one BOQ workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoqParseResult {
    pub filename: String,
    pub metadata: ProjectMetadata,
    pub items: Vec<BoqItem>,
    /// Sum of item amounts, always recomputed.
    pub total_value: f64,
    pub items_count: usize,
    pub status: BoqParseStatus,
    /// Non-fatal problems worth surfacing to the user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl BoqParseResult {
    /// Build a result, deriving `total_value`, `items_count` and `status` from the items.
    pub fn new(filename: impl Into<String>, metadata: ProjectMetadata, items: Vec<BoqItem>) -> Self {
        let total_value = items.iter().map(|i| i.amount).sum();
        let status = if items.is_empty() {
            BoqParseStatus::NoItems
        } else {
            BoqParseStatus::Complete
        };

        Self {
            filename: filename.into(),
            metadata,
            items_count: items.len(),
            items,
            total_value,
            status,
            warnings: Vec::new(),
        }
    }

    /// Empty, error-tagged result.
    pub fn empty(filename: impl Into<String>, status: BoqParseStatus) -> Self {
        let mut result = Self::new(filename, ProjectMetadata::new(), Vec::new());
        result.status = status;
        result
    }

    /// Sum of item amounts including GST.
    pub fn total_with_gst(&self) -> f64 {
        self.items.iter().map(BoqItem::total_with_gst).sum()
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Comparison of a BOQ total against an externally stated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalReconciliation {
    /// BOQ total including GST.
    pub boq_total: f64,
    pub reference_total: f64,
    pub variance: f64,
    pub tolerance: f64,
    pub within_tolerance: bool,
}

/// Compare the GST-inclusive BOQ total with a reference (e.g. purchase-order) value.
///
/// The totals agree when `|boq - reference| <= boq * tolerance`.
pub fn reconcile_totals(items: &[BoqItem], reference_total: f64, tolerance: f64) -> TotalReconciliation {
    let boq_total: f64 = items.iter().map(BoqItem::total_with_gst).sum();
    let variance = (boq_total - reference_total).abs();

    TotalReconciliation {
        boq_total,
        reference_total,
        variance,
        tolerance,
        within_tolerance: variance <= boq_total * tolerance,
    }
}
