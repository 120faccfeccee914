//! Output formatting for extraction results.

use std::fs;
use std::path::Path;

use console::style;

use docfield_core::models::{BoqParseResult, ExtractedPurchaseOrder, TotalReconciliation};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Write to `path`, or to stdout when no path is given.
pub fn emit(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(output_path) = path {
        fs::write(output_path, content)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

pub fn format_purchase_order(po: &ExtractedPurchaseOrder, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(po)?),
        OutputFormat::Csv => format_po_csv(po),
        OutputFormat::Text => Ok(format_po_text(po)),
    }
}

pub fn format_boq(
    result: &BoqParseResult,
    reconciliation: Option<&TotalReconciliation>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => match reconciliation {
            Some(reconciliation) => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "boq": result,
                "reconciliation": reconciliation,
            }))?),
            None => Ok(serde_json::to_string_pretty(result)?),
        },
        OutputFormat::Csv => format_boq_csv(result),
        OutputFormat::Text => Ok(format_boq_text(result, reconciliation)),
    }
}

fn format_po_csv(po: &ExtractedPurchaseOrder) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "po_number",
        "po_date",
        "vendor_name",
        "client_name",
        "total_amount",
        "delivery_date",
        "line_items",
        "extraction_method",
        "confidence_score",
    ])?;

    let total = po.total_amount.map(|t| t.to_string()).unwrap_or_default();
    let line_items = po.line_items.len().to_string();
    let confidence = format!("{:.2}", po.confidence_score);
    let record: [&str; 9] = [
        po.po_number.as_deref().unwrap_or_default(),
        po.po_date.as_deref().unwrap_or_default(),
        po.vendor_name.as_deref().unwrap_or_default(),
        po.client_name.as_deref().unwrap_or_default(),
        &total,
        po.delivery_date.as_deref().unwrap_or_default(),
        &line_items,
        po.extraction_method.as_str(),
        &confidence,
    ];
    wtr.write_record(record)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_po_text(po: &ExtractedPurchaseOrder) -> String {
    let mut output = String::new();
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    output.push_str(&format!("PO Number: {}\n", field(&po.po_number)));
    output.push_str(&format!("PO Date:   {}\n", field(&po.po_date)));
    output.push_str(&format!("Vendor:    {}\n", field(&po.vendor_name)));
    output.push_str(&format!("Client:    {}\n", field(&po.client_name)));
    output.push_str(&format!(
        "Total:     {}\n",
        po.total_amount.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
    ));
    if let Some(delivery) = &po.delivery_date {
        output.push_str(&format!("Delivery:  {}\n", delivery));
    }
    if let Some(email) = &po.contact_info.email {
        output.push_str(&format!("Email:     {}\n", email));
    }
    if let Some(phone) = &po.contact_info.phone {
        output.push_str(&format!("Phone:     {}\n", phone));
    }

    if !po.line_items.is_empty() {
        output.push('\n');
        output.push_str("Line items:\n");
        for item in &po.line_items {
            output.push_str(&format!(
                "  {} - {} {} @ {} = {}\n",
                item.description, item.quantity, item.unit, item.rate, item.amount
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Method: {} (confidence {:.0}%)\n",
        po.extraction_method,
        po.confidence_score * 100.0
    ));
    if po.confidence_score == 0.0 {
        output.push_str(&format!("Diagnostic: {}\n", po.raw_text));
    }

    output
}

fn format_boq_csv(result: &BoqParseResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    for item in &result.items {
        wtr.serialize(item)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_boq_text(result: &BoqParseResult, reconciliation: Option<&TotalReconciliation>) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", result.filename));
    output.push_str(&format!("Status: {}\n", result.status));

    if !result.metadata.is_empty() {
        output.push('\n');
        output.push_str("Project:\n");
        for (field, value) in &result.metadata {
            output.push_str(&format!("  {}: {}\n", field, value));
        }
    }

    output.push('\n');
    output.push_str(&format!("Items ({}):\n", result.items_count));
    for item in &result.items {
        output.push_str(&format!(
            "  {:>3}. {} - {} {} @ {} = {}\n",
            item.serial_number, item.description, item.quantity, item.unit, item.rate, item.amount
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total:          {:.2}\n", result.total_value));
    output.push_str(&format!("Total with GST: {:.2}\n", result.total_with_gst()));

    if let Some(r) = reconciliation {
        output.push_str(&format!(
            "Reference:      {:.2} (variance {:.2}, {})\n",
            r.reference_total,
            r.variance,
            if r.within_tolerance { "within tolerance" } else { "outside tolerance" }
        ));
    }

    for warning in &result.warnings {
        output.push_str(&format!("Warning: {}\n", warning));
    }

    output
}
