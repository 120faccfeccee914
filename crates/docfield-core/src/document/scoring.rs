//! Confidence scoring.
//!
//! The score is a completeness proxy: a weighted count of which key fields
//! are present, capped at 1.0. It ranks candidates against each other and
//! says nothing about whether the extracted values are correct.

use crate::models::{ExtractedPurchaseOrder, ScoringWeights};

/// Completeness score of a record in [0, 1].
pub fn confidence(po: &ExtractedPurchaseOrder, weights: &ScoringWeights) -> f64 {
    let mut score = 0.0;

    if po.po_number.is_some() {
        score += weights.po_number;
    }
    if po.vendor_name.is_some() {
        score += weights.vendor_name;
    }
    if po.total_amount.is_some() {
        score += weights.total_amount;
    }
    if po.po_date.is_some() {
        score += weights.po_date;
    }
    if !po.line_items.is_empty() {
        score += weights.line_items;
    }

    score.clamp(0.0, 1.0)
}

/// Compute and store the score on the record.
pub fn apply_confidence(po: &mut ExtractedPurchaseOrder, weights: &ScoringWeights) {
    po.confidence_score = confidence(po, weights);
}
