//! CLI application converting scanned invoices to CSV.

mod commands;
mod output;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use commands::{check, config, parse, run};

/// Scanned invoices to CSV - extract headers and line items from OCR layout output
#[derive(Parser)]
#[command(name = "scancsv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Also write log output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the layout model over a folder and write CSV outputs
    Run(run::RunArgs),

    /// Parse a folder of raw OCR JSON files into CSV outputs
    Parse(parse::ParseArgs),

    /// Diagnose the environment and input folder
    Check(check::CheckArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run(args) => run::run(args, config_path).await,
        Commands::Parse(args) => parse::run(args, config_path),
        Commands::Check(args) => check::run(args, config_path),
        Commands::Config(args) => config::run(args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
