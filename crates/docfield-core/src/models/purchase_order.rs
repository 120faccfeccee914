//! Purchase-order extraction record produced by the document path.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::boq::BoqItem;

/// Structured data extracted from one purchase-order document.
///
/// Each strategy builds its own instance; the merge step is the only code
/// allowed to fill fields on an instance after its strategy returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPurchaseOrder {
    /// Purchase-order number.
    pub po_number: Option<String>,

    /// Purchase-order date as written in the document.
    pub po_date: Option<String>,

    /// Vendor / supplier name.
    pub vendor_name: Option<String>,

    /// Issuing client or company name.
    pub client_name: Option<String>,

    /// Document grand total.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,

    /// Expected delivery date as written in the document.
    #[serde(default)]
    pub delivery_date: Option<String>,

    /// Line items in document order.
    #[serde(default)]
    pub line_items: Vec<LineItem>,

    /// First email and phone number found.
    #[serde(default)]
    pub contact_info: ContactInfo,

    /// Text the fields were parsed from, or a diagnostic on failure.
    pub raw_text: String,

    /// Strategy that produced this record.
    pub extraction_method: ExtractionMethod,

    /// Completeness heuristic in [0, 1]. Not a probability.
    pub confidence_score: f64,
}

impl ExtractedPurchaseOrder {
    /// Create an empty record for the given strategy.
    pub fn new(method: ExtractionMethod, raw_text: impl Into<String>) -> Self {
        Self {
            po_number: None,
            po_date: None,
            vendor_name: None,
            client_name: None,
            total_amount: None,
            delivery_date: None,
            line_items: Vec::new(),
            contact_info: ContactInfo::default(),
            raw_text: raw_text.into(),
            extraction_method: method,
            confidence_score: 0.0,
        }
    }

    /// Zero-confidence record returned when nothing could be extracted.
    pub fn sentinel(method: ExtractionMethod, diagnostic: impl Into<String>) -> Self {
        Self::new(method, diagnostic)
    }

    /// Parse `po_date` into a calendar date when it is a valid day/month/year.
    pub fn po_date_parsed(&self) -> Option<NaiveDate> {
        self.po_date.as_deref().and_then(parse_document_date)
    }

    /// Parse `delivery_date` into a calendar date.
    pub fn delivery_date_parsed(&self) -> Option<NaiveDate> {
        self.delivery_date.as_deref().and_then(parse_document_date)
    }

    /// Convert line items into serial-numbered BOQ items.
    ///
    /// A missing amount is recomputed as `quantity × rate`.
    pub fn to_boq_items(&self, gst_rate: f64) -> Vec<BoqItem> {
        self.line_items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let amount = if item.amount > 0.0 {
                    item.amount
                } else {
                    item.quantity * item.rate
                };
                BoqItem {
                    serial_number: i as u32 + 1,
                    description: item.description.clone(),
                    unit: item.unit.clone(),
                    quantity: item.quantity,
                    rate: item.rate,
                    amount,
                    gst_rate,
                }
            })
            .collect()
    }

    /// Total amount as a float, for callers that do arithmetic in `f64`.
    pub fn total_amount_f64(&self) -> Option<f64> {
        self.total_amount.and_then(|d| d.to_f64())
    }
}

/// One line of a purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub unit: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

/// Contact details, at most one of each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

/// Which strategy produced an extraction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Positioned text-layer parser that also harvests tables.
    LayoutAware,
    /// Layout-reconstructing text extractor.
    LayoutReconstruction,
    /// Plain sequential text extraction.
    PlainText,
    /// Table-only extractor working on a temporary file.
    TableFocused,
    /// Word document paragraphs and tables.
    Docx,
    /// No strategy produced a candidate.
    None,
    /// Extraction failed outright.
    Error,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LayoutAware => "layout_aware",
            Self::LayoutReconstruction => "layout_reconstruction",
            Self::PlainText => "plain_text",
            Self::TableFocused => "table_focused",
            Self::Docx => "docx",
            Self::None => "none",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a `d/m/y` date as written in purchase orders (`/` or `-`
/// separated, two- or four-digit year).
pub fn parse_document_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }

    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let mut year: i32 = parts[2].parse().ok()?;

    if parts[2].len() <= 2 {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}
