//! Rank-and-merge of strategy candidates.

use tracing::debug;

use crate::models::ExtractedPurchaseOrder;

/// Reduce candidates to one record.
///
/// Candidates are ranked by confidence (stable, so ties keep strategy order).
/// The best one is the base; `po_number`, `vendor_name`, `total_amount` and
/// `line_items` that the base lacks are taken from the first lower-ranked
/// candidate that has them. The base keeps its own confidence score and
/// extraction method. `None` when there are no candidates.
pub fn merge_candidates(mut candidates: Vec<ExtractedPurchaseOrder>) -> Option<ExtractedPurchaseOrder> {
    candidates.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));

    let mut ranked = candidates.into_iter();
    let mut best = ranked.next()?;
    debug!(
        "Best candidate: {} ({:.2})",
        best.extraction_method, best.confidence_score
    );

    for other in ranked {
        if best.po_number.is_none() && other.po_number.is_some() {
            debug!("po_number filled from {}", other.extraction_method);
            best.po_number = other.po_number;
        }
        if best.vendor_name.is_none() && other.vendor_name.is_some() {
            debug!("vendor_name filled from {}", other.extraction_method);
            best.vendor_name = other.vendor_name;
        }
        if best.total_amount.is_none() && other.total_amount.is_some() {
            debug!("total_amount filled from {}", other.extraction_method);
            best.total_amount = other.total_amount;
        }
        if best.line_items.is_empty() && !other.line_items.is_empty() {
            debug!("line_items filled from {}", other.extraction_method);
            best.line_items = other.line_items;
        }
    }

    Some(best)
}
