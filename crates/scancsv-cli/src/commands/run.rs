//! Run command - OCR a folder of scanned invoices and write CSV outputs.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use scancsv_core::{InvoiceParser, OcrRunner, PatternInvoiceParser};

use crate::output::{save_outputs, OutputPaths};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Input folder containing scanned invoices (PDF/images)
    #[arg(long = "in-dir", visible_alias = "in_dir")]
    in_dir: PathBuf,

    /// Output path for the header CSV file
    #[arg(
        long = "out-csv",
        visible_alias = "out_csv",
        default_value = "sample_output/invoices_header.csv"
    )]
    out_csv: PathBuf,

    /// Output directory for raw JSON files
    #[arg(long = "out-json", visible_alias = "out_json", default_value = "sample_output/raw")]
    out_json: PathBuf,

    /// Proceed without a model directory, using mock OCR output
    #[arg(long)]
    mock: bool,
}

pub async fn run(args: RunArgs, config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.in_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.in_dir.display());
    }

    fs::create_dir_all(&args.out_json)?;
    let paths = OutputPaths::new(&args.out_csv, &config.output).with_raw_dir(&args.out_json);
    fs::create_dir_all(paths.dir())?;

    info!("Input directory: {}", args.in_dir.display());
    info!("Output CSV: {}", args.out_csv.display());
    info!("Output JSON: {}", args.out_json.display());

    let runner = OcrRunner::new(config.ocr.clone());
    match runner.locate_model() {
        Some(path) => info!("Using model from: {}", path.display()),
        None if args.mock => warn!("No model directory found, continuing with mock OCR output"),
        None => {
            error!("No model directory found. Please check hf_model or Dolphin directories.");
            info!("Available directories:");
            for entry in fs::read_dir(".")?.filter_map(|e| e.ok()) {
                if entry.path().is_dir() {
                    info!("  - {}", entry.file_name().to_string_lossy());
                }
            }
            return Ok(());
        }
    }

    info!("Running layout model on input directory...");
    let start = Instant::now();

    let files = runner.discover_documents(&args.in_dir)?;
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let batch = runner
        .run_on_folder_with_progress(&args.in_dir, &args.out_json, |_| pb.inc(1))
        .await?;
    pb.finish_and_clear();

    if batch.is_empty() {
        warn!("No valid invoices processed");
        return Ok(());
    }

    let parser = PatternInvoiceParser::from_config(&config.extraction)?;
    let result = parser.parse_invoices(&batch);

    info!("Saving structured CSV and JSON outputs...");
    let summary = save_outputs(&result, &paths)?;

    println!(
        "{} Processed {} invoices in {:.2}s",
        style("✓").green(),
        summary.total_invoices,
        start.elapsed().as_secs_f64()
    );
    println!(
        "   {} successful, {} line items",
        style(summary.successful_invoices).green(),
        summary.total_line_items
    );
    println!("   Output saved to: {}", paths.dir().display());

    Ok(())
}
