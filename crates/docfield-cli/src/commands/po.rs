//! Po command - extract a purchase order from a single document.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use docfield_core::PurchaseOrderExtractor;

use super::output::{emit, format_purchase_order, OutputFormat};
use super::{load_config, read_input, spinner};

/// Arguments for the po command.
#[derive(Args)]
pub struct PoArgs {
    /// Input file (PDF or DOCX)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Per-strategy time budget in milliseconds (overrides config)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Show extraction confidence
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: PoArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(timeout_ms) = args.timeout_ms {
        config.document.strategy_timeout_ms = Some(timeout_ms);
    }

    let (data, filename) = read_input(&args.input)?;
    info!("Processing file: {}", args.input.display());

    let pb = spinner("Extracting purchase order...");
    let extractor = PurchaseOrderExtractor::from_config(&config);
    let po = tokio::task::spawn_blocking(move || extractor.extract(&data, &filename)).await?;
    pb.finish_and_clear();
    let po = po?;

    let output = format_purchase_order(&po, args.format)?;
    emit(&output, args.output.as_deref())?;

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}% ({})",
            style("ℹ").blue(),
            po.confidence_score * 100.0,
            po.extraction_method
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
