//! Boq command - parse a bill-of-quantities workbook.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use docfield_core::models::reconcile_totals;
use docfield_core::BoqParser;

use super::output::{emit, format_boq, OutputFormat};
use super::{load_config, read_input, spinner};

/// Arguments for the boq command.
#[derive(Args)]
pub struct BoqArgs {
    /// Input workbook
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// GST percentage for parsed items (overrides config)
    #[arg(long)]
    gst_rate: Option<f64>,

    /// Purchase-order value to reconcile the BOQ total against
    #[arg(long)]
    reference_total: Option<f64>,
}

pub async fn run(args: BoqArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(gst_rate) = args.gst_rate {
        config.workbook.default_gst_rate = gst_rate;
    }

    let (data, filename) = read_input(&args.input)?;
    info!("Processing workbook: {}", args.input.display());

    // Reject PDFs and other non-workbooks before handing bytes to calamine.
    let format = docfield_core::FileFormat::from_filename(&filename)?;
    if format.is_document() {
        anyhow::bail!("{} is a {} document; use `docfield po`", filename, format);
    }

    let pb = spinner("Parsing workbook...");
    let parser = BoqParser::new(config.workbook.clone());
    let result = tokio::task::spawn_blocking(move || parser.parse(&data, &filename)).await?;
    pb.finish_and_clear();
    let result = result?;

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let reconciliation = args.reference_total.map(|reference| {
        reconcile_totals(&result.items, reference, config.workbook.total_variance_tolerance)
    });

    let output = format_boq(&result, reconciliation.as_ref(), args.format)?;
    emit(&output, args.output.as_deref())?;

    if let Some(r) = &reconciliation {
        if !r.within_tolerance {
            eprintln!(
                "{} BOQ total {:.2} differs from reference {:.2} by more than {:.0}%",
                style("⚠").yellow(),
                r.boq_total,
                r.reference_total,
                r.tolerance * 100.0
            );
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
