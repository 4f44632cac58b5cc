//! Config command - manage the JSON configuration file.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use scancsv_core::ScanConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Write a configuration file with default values
    Init(InitArgs),

    /// Get a configuration value (e.g. "ocr.timeout_secs")
    Get {
        /// Dotted configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Dotted configuration key
        key: String,
        /// New value (parsed as JSON, falling back to a string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_config(&key),
        ConfigCommand::Set { key, value } => set_config(&key, &value),
        ConfigCommand::Path => show_path(),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scancsv")
        .join("config.json")
}

fn load_or_default() -> anyhow::Result<ScanConfig> {
    let config_path = default_config_path();
    if config_path.exists() {
        Ok(ScanConfig::from_file(&config_path)?)
    } else {
        Ok(ScanConfig::default())
    }
}

fn show_config() -> anyhow::Result<()> {
    if !default_config_path().exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    println!("{}", serde_json::to_string_pretty(&load_or_default()?)?);
    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    ScanConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );
    Ok(())
}

/// Navigate a dotted key path.
fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Replace the value at a dotted key path; the key must already exist.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parent_key, last) = match key.rsplit_once('.') {
        Some((parent, last)) => (Some(parent), last),
        None => (None, key),
    };

    let mut parent = json;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            parent = parent
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    let slot = parent
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set value at non-object path"))?
        .get_mut(last)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value;
    Ok(())
}

fn get_config(key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_or_default()?)?;
    println!("{}", serde_json::to_string_pretty(lookup(&json, key)?)?);
    Ok(())
}

fn set_config(key: &str, value: &str) -> anyhow::Result<()> {
    let config_path = default_config_path();
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(load_or_default()?)?;
    assign(&mut json, key, parsed_value.clone())?;

    let config: ScanConfig = serde_json::from_value(json)?;
    config.save(&config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );
    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let config_path = default_config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'scancsv config init' to create a configuration file.");
    }

    Ok(())
}
