//! CLI subcommands.

pub mod batch;
pub mod boq;
pub mod config;
pub mod output;
pub mod po;

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use docfield_core::DocfieldConfig;

/// Load the configuration: `--config` if given, else the default file if it
/// exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DocfieldConfig> {
    if let Some(path) = config_path {
        return Ok(DocfieldConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(DocfieldConfig::from_file(&default_path)?)
    } else {
        Ok(DocfieldConfig::default())
    }
}

/// Read an input file, rejecting missing paths with a readable message.
pub fn read_input(path: &Path) -> anyhow::Result<(Vec<u8>, String)> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let data = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    Ok((data, filename))
}

/// Spinner shown on stderr while a blocking extraction runs.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
