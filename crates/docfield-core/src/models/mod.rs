//! Data models for extraction results and configuration.

pub mod boq;
pub mod config;
pub mod purchase_order;

pub use boq::{
    reconcile_totals, BoqItem, BoqParseResult, BoqParseStatus, MetadataField, ProjectMetadata,
    TotalReconciliation,
};
pub use config::{DocfieldConfig, DocumentConfig, ScoringWeights, WorkbookConfig};
pub use purchase_order::{
    parse_document_date, ContactInfo, ExtractedPurchaseOrder, ExtractionMethod, LineItem,
};
