//! Batch command - extract every workbook and purchase order matching a glob.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use docfield_core::models::MetadataField;
use docfield_core::{extract, DocfieldConfig, ExtractionOutput, FileFormat};

use super::load_config;
use super::output::{format_boq, format_purchase_order, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input files (quote it to stop the shell expanding it)
    #[arg(required = true)]
    pattern: String,

    /// Directory receiving one output file per input
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Format of the per-file outputs
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write summary.csv with one row per input
    #[arg(long)]
    summary: bool,

    /// Files extracted concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Keep going when a file fails
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome for one input file.
struct Processed {
    path: PathBuf,
    outcome: Result<ExtractionOutput, String>,
    elapsed_ms: u64,
}

/// One line of summary.csv.
#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'static str,
    kind: &'static str,
    /// PO number or project name.
    reference: Option<&'a str>,
    /// Vendor or client.
    party: Option<&'a str>,
    total: Option<String>,
    items: Option<usize>,
    /// Confidence for purchase orders, parse status for workbooks.
    quality: Option<String>,
    elapsed_ms: u64,
    error: Option<&'a str>,
}

impl<'a> SummaryRow<'a> {
    fn from_processed(processed: &'a Processed) -> Self {
        let filename = processed
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let mut row = SummaryRow {
            filename,
            status: "success",
            kind: "",
            reference: None,
            party: None,
            total: None,
            items: None,
            quality: None,
            elapsed_ms: processed.elapsed_ms,
            error: None,
        };

        match &processed.outcome {
            Ok(ExtractionOutput::PurchaseOrder(po)) => {
                row.kind = "purchase_order";
                row.reference = po.po_number.as_deref();
                row.party = po.vendor_name.as_deref();
                row.total = po.total_amount.map(|t| t.to_string());
                row.items = Some(po.line_items.len());
                row.quality = Some(format!("{:.2}", po.confidence_score));
            }
            Ok(ExtractionOutput::Boq(boq)) => {
                row.kind = "boq";
                row.reference = boq.metadata.get(&MetadataField::ProjectName).map(String::as_str);
                row.party = boq.metadata.get(&MetadataField::Client).map(String::as_str);
                row.total = Some(format!("{:.2}", boq.total_value));
                row.items = Some(boq.items_count);
                row.quality = Some(boq.status.to_string());
            }
            Err(message) => {
                row.status = "error";
                row.error = Some(message);
            }
        }

        row
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = Arc::new(load_config(config_path)?);

    let files = matching_files(&args.pattern)?;
    if files.is_empty() {
        anyhow::bail!("No supported files match pattern: {}", args.pattern);
    }
    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();
    for (index, path) in files.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        let config = Arc::clone(&config);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let started = Instant::now();
            let input = path.clone();
            let outcome = match tokio::task::spawn_blocking(move || extract_file(&input, &config)).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(e) => Err(format!("extraction task failed: {}", e)),
            };
            (
                index,
                Processed {
                    path,
                    outcome,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                },
            )
        });
    }

    let mut processed: Vec<(usize, Processed)> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, file) = joined?;

        if let Err(message) = &file.outcome {
            if !args.continue_on_error {
                error!("{}: {}", file.path.display(), message);
                tasks.abort_all();
                anyhow::bail!("Extraction of {} failed: {}", file.path.display(), message);
            }
            warn!("{}: {}", file.path.display(), message);
        } else if let Some(dir) = &args.output_dir {
            write_output(dir, &file, args.format)?;
        }

        progress.inc(1);
        processed.push((index, file));
    }
    progress.finish_and_clear();

    processed.sort_by_key(|(index, _)| *index);
    let processed: Vec<Processed> = processed.into_iter().map(|(_, file)| file).collect();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
            .join("summary.csv");
        write_summary(&summary_path, &processed)?;
        println!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    report(&processed, start);
    Ok(())
}

/// Files matching the pattern whose extension the engine handles, sorted.
fn matching_files(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| FileFormat::from_filename(n).is_ok())
        })
        .collect();
    files.sort();
    Ok(files)
}

fn extract_file(path: &Path, config: &DocfieldConfig) -> anyhow::Result<ExtractionOutput> {
    let data = fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    Ok(extract(&data, filename, config)?)
}

fn write_output(dir: &Path, file: &Processed, format: OutputFormat) -> anyhow::Result<()> {
    let Ok(output) = &file.outcome else {
        return Ok(());
    };

    let content = match output {
        ExtractionOutput::PurchaseOrder(po) => format_purchase_order(po, format)?,
        ExtractionOutput::Boq(boq) => format_boq(boq, None, format)?,
    };

    // Keep the input extension so `a.pdf` and `a.xlsx` get separate outputs.
    let name = file
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let target = dir.join(format!("{}.{}", name, format.extension()));
    fs::write(&target, content)?;
    debug!("Wrote {}", target.display());
    Ok(())
}

fn write_summary(path: &Path, processed: &[Processed]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for file in processed {
        wtr.serialize(SummaryRow::from_processed(file))?;
    }
    wtr.flush()?;
    Ok(())
}

fn report(processed: &[Processed], start: Instant) {
    let failures: Vec<(&Path, &str)> = processed
        .iter()
        .filter_map(|p| p.outcome.as_ref().err().map(|e| (p.path.as_path(), e.as_str())))
        .collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        processed.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(processed.len() - failures.len()).green(),
        style(failures.len()).red()
    );

    if !failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, message) in failures {
            println!("  - {}: {}", path.display(), message);
        }
    }
}
