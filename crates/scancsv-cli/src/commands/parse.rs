//! Parse command - turn previously saved raw OCR JSON into CSV outputs.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::warn;

use scancsv_core::{InvoiceParser, OcrRunner, PatternInvoiceParser};

use crate::output::{save_outputs, OutputPaths};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Directory of raw OCR JSON files (one per document)
    #[arg(long = "raw-dir", visible_alias = "raw_dir")]
    raw_dir: PathBuf,

    /// Output path for the header CSV file
    #[arg(
        long = "out-csv",
        visible_alias = "out_csv",
        default_value = "sample_output/invoices_header.csv"
    )]
    out_csv: PathBuf,

    /// Parse documents in parallel
    #[arg(long)]
    parallel: bool,
}

pub fn run(args: ParseArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let batch = OcrRunner::load_raw_dir(&args.raw_dir)?;
    if batch.is_empty() {
        warn!("No raw OCR files found in {}", args.raw_dir.display());
        return Ok(());
    }

    let parser = PatternInvoiceParser::from_config(&config.extraction)?
        .with_parallel(args.parallel || config.extraction.parallel);
    let result = parser.parse_invoices(&batch);

    let paths = OutputPaths::new(&args.out_csv, &config.output).with_raw_dir(&args.raw_dir);
    let summary = save_outputs(&result, &paths)?;

    println!(
        "{} Parsed {} invoices ({} successful), {} line items",
        style("✓").green(),
        summary.total_invoices,
        summary.successful_invoices,
        summary.total_line_items
    );
    println!("   Output saved to: {}", paths.dir().display());

    Ok(())
}
