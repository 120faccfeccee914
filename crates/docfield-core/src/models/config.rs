//! Configuration structures for the extraction engine.
//!
//! The heuristic constants (scan windows, confidence weights, variance
//! tolerance) have no derivation beyond "worked on real documents"; they live
//! here so deployments can tune them without touching code.

use serde::{Deserialize, Serialize};

/// Main configuration for docfield.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocfieldConfig {
    /// BOQ workbook parsing configuration.
    pub workbook: WorkbookConfig,

    /// Purchase-order document extraction configuration.
    pub document: DocumentConfig,

    /// Confidence score weights.
    pub scoring: ScoringWeights,
}

/// Workbook field locator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookConfig {
    /// Rows scanned for project metadata.
    pub metadata_scan_rows: usize,

    /// Columns scanned for project metadata.
    pub metadata_scan_cols: usize,

    /// Rows scanned for the header row.
    pub header_scan_rows: usize,

    /// Columns read when building a header row's text.
    pub header_scan_cols: usize,

    /// Minimum number of distinct header keywords a header row must contain.
    pub min_header_matches: usize,

    /// Minimum description length (in characters) for an accepted item.
    pub min_description_len: usize,

    /// GST percentage assigned to parsed items.
    pub default_gst_rate: f64,

    /// Allowed relative difference between BOQ and purchase-order totals.
    pub total_variance_tolerance: f64,
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        Self {
            metadata_scan_rows: 20,
            metadata_scan_cols: 10,
            header_scan_rows: 30,
            header_scan_cols: 20,
            min_header_matches: 3,
            min_description_len: 3,
            default_gst_rate: 18.0,
            total_variance_tolerance: 0.05,
        }
    }
}

/// Document extractor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Extracted strings are truncated to this many characters.
    pub max_field_len: usize,

    /// Vendor/client lines shorter than this are rejected.
    pub min_party_len: usize,

    /// Table rows whose description is shorter than this are skipped.
    pub min_table_description_len: usize,

    /// Wall-clock budget per PDF strategy (None = wait indefinitely).
    pub strategy_timeout_ms: Option<u64>,

    /// Vertical distance (points) within which text fragments share a line.
    pub line_tolerance: f32,

    /// Horizontal gap (points) that starts a new table cell.
    pub column_gap: f32,

    /// Minimum cells for a line to count as a table row.
    pub min_table_columns: usize,

    /// Prefix for the table strategy's temporary file.
    pub temp_file_prefix: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_field_len: 100,
            min_party_len: 4,
            min_table_description_len: 4,
            strategy_timeout_ms: Some(30_000),
            line_tolerance: 3.0,
            column_gap: 12.0,
            min_table_columns: 3,
            temp_file_prefix: "docfield-".to_string(),
        }
    }
}

/// Additive confidence weights, one per field group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub po_number: f64,
    pub vendor_name: f64,
    pub total_amount: f64,
    pub po_date: f64,
    pub line_items: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            po_number: 0.25,
            vendor_name: 0.20,
            total_amount: 0.20,
            po_date: 0.15,
            line_items: 0.20,
        }
    }
}

impl DocfieldConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
