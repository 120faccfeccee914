//! CLI application for BOQ and purchase-order field extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, boq, config, po};

/// docfield - Extract structured fields from BOQ workbooks and purchase orders
#[derive(Parser)]
#[command(name = "docfield")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration file (default: the `docfield config path` location)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a purchase order from a PDF or DOCX file
    Po(po::PoArgs),

    /// Parse a BOQ workbook (xlsx, xlsm, xls, xlsb, ods)
    Boq(boq::BoqArgs),

    /// Extract every matching file of a glob pattern
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Po(args) => po::run(args, config_path).await,
        Commands::Boq(args) => boq::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Config(args) => config::run(args).await,
    }
}

/// Logs go to stderr; stdout carries extraction output only.
fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let max_level = [Level::WARN, Level::INFO, Level::DEBUG]
        .get(usize::from(verbosity))
        .copied()
        .unwrap_or(Level::TRACE);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
