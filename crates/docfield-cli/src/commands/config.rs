//! Config command - inspect and edit the JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use docfield_core::DocfieldConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Where to write it (default: the standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value, e.g. `workbook.default_gst_rate`
    Get { key: String },

    /// Change one value; the value is parsed as JSON, else taken as a string
    Set { key: String, value: String },

    /// Print where the configuration file lives
    Path,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let file = ConfigFile::standard();

    match args.command {
        ConfigCommand::Show => {
            if !file.exists() {
                println!("{} No config file found, showing defaults.", style("ℹ").blue());
            }
            println!("{}", serde_json::to_string_pretty(&file.load()?)?);
        }
        ConfigCommand::Init { output, force } => {
            let target = output.map(ConfigFile::at).unwrap_or(file);
            if target.exists() && !force {
                anyhow::bail!(
                    "{} already exists; pass --force to overwrite it",
                    target.path.display()
                );
            }
            target.save(&DocfieldConfig::default())?;
            println!(
                "{} Created configuration file at {}",
                style("✓").green(),
                target.path.display()
            );
        }
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(file.load()?)?;
            let value = lookup(&json, &key)
                .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => {
            let value: Value =
                serde_json::from_str(&value).unwrap_or_else(|_| Value::String(value.clone()));

            let mut json = serde_json::to_value(file.load()?)?;
            assign(&mut json, &key, value.clone())?;

            // Round-trip through the typed config so a wrongly typed value is rejected.
            let updated: DocfieldConfig = serde_json::from_value(json)
                .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
            file.save(&updated)?;

            println!("{} {} = {}", style("✓").green(), key, value);
        }
        ConfigCommand::Path => {
            println!("{}", file.path.display());
            if file.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!("Run 'docfield config init' to create it.");
            }
        }
    }

    Ok(())
}

/// `<config_dir>/docfield/config.json`, or `./docfield/config.json` when
/// the platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docfield")
        .join("config.json")
}

/// A configuration file on disk that may not exist yet.
struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    fn standard() -> Self {
        Self::at(default_config_path())
    }

    fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The stored configuration, or defaults when there is no file.
    fn load(&self) -> anyhow::Result<DocfieldConfig> {
        if self.exists() {
            Ok(DocfieldConfig::from_file(&self.path)?)
        } else {
            Ok(DocfieldConfig::default())
        }
    }

    fn save(&self, config: &DocfieldConfig) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        config.save(Path::new(&self.path))?;
        Ok(())
    }
}

/// Follow a dotted key through nested objects.
fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Replace the value at an existing dotted key.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parent_key, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };

    let mut parent = json;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            parent = parent
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;
        }
    }

    let object = parent
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("{} is not inside a configuration section", key))?;
    if !object.contains_key(leaf) {
        anyhow::bail!("Unknown configuration key: {}", key);
    }
    object.insert(leaf.to_string(), value);

    Ok(())
}
