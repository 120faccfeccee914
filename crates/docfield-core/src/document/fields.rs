//! Free-text field parsing for purchase orders.
//!
//! Parsing is a pure function over [`FIELD_RULES`], an ordered list of
//! (pattern, setter) pairs. Each pattern is searched once; for each field
//! the first rule whose match is accepted wins and later rules for that
//! field are skipped. A setter may reject a capture (a vendor line that is
//! just a number); the field then falls through to its next pattern.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::patterns::*;
use crate::coerce::{to_decimal, truncate_chars};
use crate::models::{DocumentConfig, ExtractedPurchaseOrder, ExtractionMethod};

/// A field that free-text parsing can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoField {
    PoNumber,
    PoDate,
    VendorName,
    ClientName,
    TotalAmount,
    DeliveryDate,
    Email,
    Phone,
}

impl fmt::Display for PoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PoNumber => "po_number",
            Self::PoDate => "po_date",
            Self::VendorName => "vendor_name",
            Self::ClientName => "client_name",
            Self::TotalAmount => "total_amount",
            Self::DeliveryDate => "delivery_date",
            Self::Email => "email",
            Self::Phone => "phone",
        };
        f.write_str(name)
    }
}

impl PoField {
    /// Whether the record already holds a value for this field.
    pub fn is_set(&self, po: &ExtractedPurchaseOrder) -> bool {
        match self {
            Self::PoNumber => po.po_number.is_some(),
            Self::PoDate => po.po_date.is_some(),
            Self::VendorName => po.vendor_name.is_some(),
            Self::ClientName => po.client_name.is_some(),
            Self::TotalAmount => po.total_amount.is_some(),
            Self::DeliveryDate => po.delivery_date.is_some(),
            Self::Email => po.contact_info.email.is_some(),
            Self::Phone => po.contact_info.phone.is_some(),
        }
    }
}

/// Stores a trimmed capture on the record; returns `false` to reject it.
pub type Setter = fn(&mut ExtractedPurchaseOrder, &str, &DocumentConfig) -> bool;

/// One entry of the ordered rule list.
pub struct FieldRule {
    pub field: PoField,
    pub pattern: &'static Regex,
    pub setter: Setter,
}

lazy_static! {
    /// Every field rule, grouped by field, in priority order.
    pub static ref FIELD_RULES: Vec<FieldRule> = vec![
        rule(PoField::PoNumber, &PO_NUMBER, set_po_number),
        rule(PoField::PoNumber, &PURCHASE_ORDER_NUMBER, set_po_number),
        rule(PoField::PoNumber, &ORDER_NUMBER, set_po_number),
        rule(PoField::PoDate, &PO_DATE, set_po_date),
        rule(PoField::PoDate, &ORDER_DATE, set_po_date),
        rule(PoField::PoDate, &ANY_DATE, set_po_date),
        rule(PoField::VendorName, &VENDOR, set_vendor),
        rule(PoField::VendorName, &SUPPLIER, set_vendor),
        rule(PoField::VendorName, &ADDRESSED_TO, set_vendor),
        rule(PoField::ClientName, &ADDRESSED_FROM, set_client),
        rule(PoField::ClientName, &COMPANY, set_client),
        rule(PoField::ClientName, &CLIENT, set_client),
        rule(PoField::TotalAmount, &TOTAL_AMOUNT, set_total),
        rule(PoField::TotalAmount, &GRAND_TOTAL, set_total),
        rule(PoField::TotalAmount, &NET_AMOUNT, set_total),
        rule(PoField::DeliveryDate, &DELIVERY_DATE, set_delivery_date),
        rule(PoField::DeliveryDate, &EXPECTED_DELIVERY, set_delivery_date),
        rule(PoField::Email, &EMAIL, set_email),
        rule(PoField::Phone, &PHONE, set_phone),
    ];
}

fn rule(field: PoField, pattern: &'static Regex, setter: Setter) -> FieldRule {
    FieldRule {
        field,
        pattern,
        setter,
    }
}

/// Parse every known field out of `text` into a fresh record.
///
/// `line_items` and `confidence_score` are left for the caller.
pub fn parse_fields(
    text: &str,
    method: ExtractionMethod,
    config: &DocumentConfig,
) -> ExtractedPurchaseOrder {
    let mut po = ExtractedPurchaseOrder::new(method, text);

    for rule in FIELD_RULES.iter() {
        if rule.field.is_set(&po) {
            continue;
        }

        let Some(capture) = rule.pattern.captures(text).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let value = capture.as_str().trim();
        if !value.is_empty() && (rule.setter)(&mut po, value, config) {
            trace!("{}: '{}' via /{}/", rule.field, value, rule.pattern.as_str());
        }
    }

    po
}

fn bounded(value: &str, config: &DocumentConfig) -> String {
    truncate_chars(value, config.max_field_len)
}

fn set_po_number(po: &mut ExtractedPurchaseOrder, value: &str, config: &DocumentConfig) -> bool {
    po.po_number = Some(bounded(value, config));
    true
}

fn set_po_date(po: &mut ExtractedPurchaseOrder, value: &str, config: &DocumentConfig) -> bool {
    po.po_date = Some(bounded(value, config));
    true
}

fn set_delivery_date(po: &mut ExtractedPurchaseOrder, value: &str, config: &DocumentConfig) -> bool {
    po.delivery_date = Some(bounded(value, config));
    true
}

fn set_vendor(po: &mut ExtractedPurchaseOrder, value: &str, config: &DocumentConfig) -> bool {
    if value.chars().count() < config.min_party_len || !value.chars().any(char::is_alphabetic) {
        return false;
    }
    po.vendor_name = Some(bounded(value, config));
    true
}

fn set_client(po: &mut ExtractedPurchaseOrder, value: &str, config: &DocumentConfig) -> bool {
    if value.chars().count() < config.min_party_len {
        return false;
    }
    po.client_name = Some(bounded(value, config));
    true
}

fn set_total(po: &mut ExtractedPurchaseOrder, value: &str, _config: &DocumentConfig) -> bool {
    match to_decimal(value) {
        Some(amount) => {
            po.total_amount = Some(amount);
            true
        }
        None => false,
    }
}

fn set_email(po: &mut ExtractedPurchaseOrder, value: &str, config: &DocumentConfig) -> bool {
    po.contact_info.email = Some(bounded(value, config));
    true
}

fn set_phone(po: &mut ExtractedPurchaseOrder, value: &str, config: &DocumentConfig) -> bool {
    po.contact_info.phone = Some(bounded(value, config));
    true
}
