//! Safe numeric and string coercion shared by the workbook and document parsers.
//!
//! These are the only places raw cell values and regex captures are turned
//! into numbers or text, so malformed input is handled the same way on both
//! paths: nothing here ever fails.

use std::borrow::Cow;
use std::str::FromStr;

use calamine::Data;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// A raw value that can be coerced into a number or text.
pub trait CellValue {
    /// Native numeric value, if the source already carries one.
    fn numeric(&self) -> Option<f64> {
        None
    }

    /// Textual form of the value; `None` for null/empty cells.
    fn textual(&self) -> Option<Cow<'_, str>>;
}

impl CellValue for str {
    fn textual(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl CellValue for String {
    fn textual(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

impl CellValue for f64 {
    fn numeric(&self) -> Option<f64> {
        Some(*self)
    }

    fn textual(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(format_number(*self)))
    }
}

impl CellValue for i64 {
    fn numeric(&self) -> Option<f64> {
        Some(*self as f64)
    }

    fn textual(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

impl<T: CellValue + ?Sized> CellValue for &T {
    fn numeric(&self) -> Option<f64> {
        (**self).numeric()
    }

    fn textual(&self) -> Option<Cow<'_, str>> {
        (**self).textual()
    }
}

impl<T: CellValue> CellValue for Option<T> {
    fn numeric(&self) -> Option<f64> {
        self.as_ref().and_then(CellValue::numeric)
    }

    fn textual(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(CellValue::textual)
    }
}

impl CellValue for Data {
    fn numeric(&self) -> Option<f64> {
        match self {
            Data::Int(i) => Some(*i as f64),
            Data::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn textual(&self) -> Option<Cow<'_, str>> {
        match self {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                Some(Cow::Borrowed(s.as_str()))
            }
            Data::Int(i) => Some(Cow::Owned(i.to_string())),
            Data::Float(f) => Some(Cow::Owned(format_number(*f))),
            Data::Bool(b) => Some(Cow::Borrowed(if *b { "TRUE" } else { "FALSE" })),
            Data::DateTime(dt) => Some(Cow::Owned(format_number(dt.as_f64()))),
        }
    }
}

/// Coerce a value into a finite `f64`.
///
/// Returns 0.0 for null, empty and non-numeric input. Text is stripped of
/// rupee markers (`₹`, `Rs.`, `Rs`), thousands separators and surrounding
/// whitespace before parsing.
pub fn to_number<V: CellValue + ?Sized>(value: &V) -> f64 {
    if let Some(n) = value.numeric() {
        return if n.is_finite() { n } else { 0.0 };
    }

    let Some(text) = value.textual() else {
        return 0.0;
    };

    let cleaned = clean_numeric_text(&text);
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("none") {
        return 0.0;
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Coerce a value into a [`Decimal`] using the same cleaning rules as
/// [`to_number`]; `None` when nothing numeric is present.
pub fn to_decimal<V: CellValue + ?Sized>(value: &V) -> Option<Decimal> {
    if let Some(n) = value.numeric() {
        return Decimal::from_f64(n);
    }

    let text = value.textual()?;
    let cleaned = clean_numeric_text(&text);
    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Coerce a value into trimmed text; empty string for null.
pub fn to_text<V: CellValue + ?Sized>(value: &V) -> String {
    value
        .textual()
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn clean_numeric_text(text: &str) -> String {
    text.replace('₹', "")
        .replace("Rs.", "")
        .replace("Rs", "")
        .replace(',', "")
        .trim()
        .to_string()
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number_strips_currency_and_separators() {
        assert_eq!(to_number("₹89,500"), 89500.0);
        assert_eq!(to_number("Rs. 1,250.50"), 1250.5);
        assert_eq!(to_number("  Rs 42 "), 42.0);
        assert_eq!(to_number("15000"), 15000.0);
    }

    #[test]
    fn test_to_number_is_total() {
        let garbage = ["", "   ", "none", "N/A", "abc", "1.2.3", "NaN", "inf", "-infinity", "₹", ","];
        for input in garbage {
            let n = to_number(input);
            assert!(n.is_finite(), "{input:?} produced {n}");
            assert_eq!(n, 0.0, "{input:?}");
        }

        assert_eq!(to_number(&None::<String>), 0.0);
        assert_eq!(to_number(&f64::NAN), 0.0);
        assert_eq!(to_number(&f64::INFINITY), 0.0);
        assert_eq!(to_number(&7i64), 7.0);
        assert_eq!(to_number(&Some(2.5f64)), 2.5);
    }

    #[test]
    fn test_to_number_on_cells() {
        assert_eq!(to_number(&Data::Float(150.0)), 150.0);
        assert_eq!(to_number(&Data::Int(100)), 100.0);
        assert_eq!(to_number(&Data::String("₹ 2,000".to_string())), 2000.0);
        assert_eq!(to_number(&Data::Empty), 0.0);
        assert_eq!(to_number(&Data::Bool(true)), 0.0);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&None::<String>), "");
        assert_eq!(to_text("  Excavation  "), "Excavation");
        assert_eq!(to_text(&Data::Empty), "");
        assert_eq!(to_text(&Data::Float(100.0)), "100");
        assert_eq!(to_text(&Data::Float(2.5)), "2.5");
        assert_eq!(to_text(&Data::Int(3)), "3");
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal("89,500"), Some(Decimal::from(89500)));
        assert_eq!(to_decimal("₹1,234.50"), Decimal::from_str("1234.50").ok());
        assert_eq!(to_decimal(","), None);
        assert_eq!(to_decimal(""), None);
        assert_eq!(to_decimal(&None::<String>), None);
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("₹₹₹₹", 2), "₹₹");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
