//! Regex patterns for purchase-order field extraction.
//!
//! All patterns are case-insensitive. Within a field group, patterns are
//! listed in priority order.

use lazy_static::lazy_static;
use regex::Regex;

/// Capture group for an order identifier. The alternatives admit every
/// token except the words "date" and "dated", so the label of "PO Date:"
/// is never read as a number.
const ORDER_IDENT: &str = concat!(
    r"((?:[0-9A-CE-Z]",
    r"|D[0-9B-Z\-/]|DA[0-9A-SU-Z\-/]|DAT[0-9A-DF-Z\-/]",
    r"|DATE[0-9A-CE-Z]|DATED[0-9A-Z]",
    r"|D\b|DA\b|DAT\b)[A-Z0-9\-/]*)",
);

lazy_static! {
    // PO number
    pub static ref PO_NUMBER: Regex = Regex::new(&format!(
        r"(?i)\bPO\s*(?:NUMBER|NO\.?|#)?\s*:?\s*{}", ORDER_IDENT
    )).unwrap();

    pub static ref PURCHASE_ORDER_NUMBER: Regex = Regex::new(&format!(
        r"(?i)\bPURCHASE\s*ORDER\s*(?:NUMBER|NO\.?|#)?\s*:?\s*{}", ORDER_IDENT
    )).unwrap();

    pub static ref ORDER_NUMBER: Regex = Regex::new(&format!(
        r"(?i)\bORDER\s*(?:NUMBER|NO\.?|#)?\s*:?\s*{}", ORDER_IDENT
    )).unwrap();

    // Dates (d/m/y with / or -)
    pub static ref PO_DATE: Regex = Regex::new(
        r"(?i)\bPO\s*DATE\s*:?\s*(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})"
    ).unwrap();

    pub static ref ORDER_DATE: Regex = Regex::new(
        r"(?i)\bORDER\s*DATE\s*:?\s*(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})"
    ).unwrap();

    pub static ref ANY_DATE: Regex = Regex::new(
        r"(?i)\bDATE\s*:?\s*(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})"
    ).unwrap();

    pub static ref DELIVERY_DATE: Regex = Regex::new(
        r"(?i)\bDELIVERY\s*(?:DATE|BY)?\s*:?\s*(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})"
    ).unwrap();

    pub static ref EXPECTED_DELIVERY: Regex = Regex::new(
        r"(?i)\bEXPECTED\s*DELIVERY\s*:?\s*(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})"
    ).unwrap();

    // Parties. Bare TO/FROM need a colon, otherwise "TOTAL" and "FROM THE" match.
    pub static ref VENDOR: Regex = Regex::new(
        r"(?i)\bVENDOR\s*(?:NAME)?\s*:?[ \t]*([^\n]+)"
    ).unwrap();

    pub static ref SUPPLIER: Regex = Regex::new(
        r"(?i)\bSUPPLIER\s*(?:NAME)?\s*:?[ \t]*([^\n]+)"
    ).unwrap();

    pub static ref ADDRESSED_TO: Regex = Regex::new(
        r"(?i)\bTO\s*:[ \t]*([^\n]+)"
    ).unwrap();

    pub static ref ADDRESSED_FROM: Regex = Regex::new(
        r"(?i)\bFROM\s*:[ \t]*([^\n]+)"
    ).unwrap();

    pub static ref COMPANY: Regex = Regex::new(
        r"(?i)\bCOMPANY\s*(?:NAME)?\s*:?[ \t]*([^\n]+)"
    ).unwrap();

    pub static ref CLIENT: Regex = Regex::new(
        r"(?i)\bCLIENT\s*(?:NAME)?\s*:?[ \t]*([^\n]+)"
    ).unwrap();

    // Amounts
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"(?i)\bTOTAL\s*(?:AMOUNT)?\s*:?\s*(?:₹|\$|Rs\.?|INR)?\s*(\d[\d,]*(?:\.\d+)?)"
    ).unwrap();

    pub static ref GRAND_TOTAL: Regex = Regex::new(
        r"(?i)\bGRAND\s*TOTAL\s*:?\s*(?:₹|\$|Rs\.?|INR)?\s*(\d[\d,]*(?:\.\d+)?)"
    ).unwrap();

    pub static ref NET_AMOUNT: Regex = Regex::new(
        r"(?i)\bNET\s*AMOUNT\s*:?\s*(?:₹|\$|Rs\.?|INR)?\s*(\d[\d,]*(?:\.\d+)?)"
    ).unwrap();

    // Contact
    pub static ref EMAIL: Regex = Regex::new(
        r"([a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,})"
    ).unwrap();

    pub static ref PHONE: Regex = Regex::new(
        r"(\+?\d{1,3}[\s\-]?\(?\d{3,}\)?[\s\-]?\d{3,}[\s\-]?\d{3,})"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
        re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
    }

    #[test]
    fn test_po_number_patterns() {
        assert_eq!(capture(&PO_NUMBER, "PO Number: PO-2024-001"), Some("PO-2024-001"));
        assert_eq!(capture(&PO_NUMBER, "po no. 4500012345"), Some("4500012345"));
        assert_eq!(capture(&PO_NUMBER, "PO# A/17/339"), Some("A/17/339"));
        assert_eq!(
            capture(&PURCHASE_ORDER_NUMBER, "PURCHASE ORDER NO: 77-B"),
            Some("77-B")
        );
        assert_eq!(capture(&PO_NUMBER, "PO Number: ABC-XYZ"), Some("ABC-XYZ"));
    }

    #[test]
    fn test_po_number_skips_date_labels() {
        assert_eq!(capture(&PO_NUMBER, "PO Date: 15/01/2024"), None);
        assert_eq!(capture(&PO_NUMBER, "po dated 15/01/2024"), None);
        assert_eq!(capture(&ORDER_NUMBER, "Order Date 1-2-24"), None);
        assert_eq!(
            capture(&PO_NUMBER, "PO Date: 15/01/2024\nPO No: 4500012345"),
            Some("4500012345")
        );
        // Identifiers that merely start like the word still match
        assert_eq!(capture(&PO_NUMBER, "PO: DAT-77"), Some("DAT-77"));
        assert_eq!(capture(&PO_NUMBER, "PO #DATEX9"), Some("DATEX9"));
        assert_eq!(capture(&PO_NUMBER, "PO: D/45"), Some("D/45"));
    }

    #[test]
    fn test_to_does_not_match_total() {
        assert_eq!(capture(&ADDRESSED_TO, "TOTAL: 500"), None);
        assert_eq!(capture(&ADDRESSED_TO, "To: Shree Cement Traders"), Some("Shree Cement Traders"));
    }

    #[test]
    fn test_amount_patterns() {
        assert_eq!(capture(&TOTAL_AMOUNT, "TOTAL AMOUNT: ₹89,500"), Some("89,500"));
        assert_eq!(capture(&GRAND_TOTAL, "Grand Total Rs. 1,20,000.50"), Some("1,20,000.50"));
        assert_eq!(capture(&NET_AMOUNT, "Net Amount: $ 950"), Some("950"));
        assert_eq!(capture(&TOTAL_AMOUNT, "SUBTOTAL: 100"), None);
    }

    #[test]
    fn test_date_patterns() {
        assert_eq!(capture(&PO_DATE, "PO Date: 15/01/2024"), Some("15/01/2024"));
        assert_eq!(capture(&DELIVERY_DATE, "Delivery By: 1-2-24"), Some("1-2-24"));
        assert_eq!(capture(&EXPECTED_DELIVERY, "Expected Delivery 28/02/2024"), Some("28/02/2024"));
    }

    #[test]
    fn test_contact_patterns() {
        assert_eq!(
            capture(&EMAIL, "write to purchase@acme-infra.co.in today"),
            Some("purchase@acme-infra.co.in")
        );
        assert_eq!(capture(&PHONE, "Ph: +91 98450 12345 678"), Some("+91 98450 12345 678"));
    }
}
