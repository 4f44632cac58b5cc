//! Check command - diagnose the environment before a run.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use scancsv_core::OcrRunner;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Input folder to inspect
    in_dir: Option<PathBuf>,

    /// Output folder to test for writability
    #[arg(long, default_value = "sample_output")]
    out_dir: PathBuf,
}

pub fn run(args: CheckArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let runner = OcrRunner::new(config.ocr.clone());

    println!("{}", style("Environment").bold());
    println!("  Current directory: {}", std::env::current_dir()?.display());
    match runner.locate_model() {
        Some(path) => println!("  {} Model directory: {}", style("✓").green(), path.display()),
        None => println!("  {} No model directory found", style("✗").red()),
    }
    if runner.script_available() {
        println!("  {} Model script: {}", style("✓").green(), config.ocr.script.display());
    } else {
        println!(
            "  {} Model script missing: {} (mock OCR output will be used)",
            style("✗").yellow(),
            config.ocr.script.display()
        );
    }

    match &args.in_dir {
        Some(in_dir) => check_input_files(&runner, in_dir)?,
        None => {
            println!();
            println!("No input directory provided");
        }
    }

    println!();
    println!("{}", style("Output").bold());
    match check_writable(&args.out_dir) {
        Ok(()) => println!("  {} {} is writable", style("✓").green(), args.out_dir.display()),
        Err(e) => println!(
            "  {} {} is not writable: {}",
            style("✗").red(),
            args.out_dir.display(),
            e
        ),
    }

    Ok(())
}

fn check_input_files(runner: &OcrRunner, in_dir: &Path) -> anyhow::Result<()> {
    println!();
    println!("{} {}", style("Input directory").bold(), in_dir.display());

    if !in_dir.is_dir() {
        println!("  {} Directory does not exist", style("✗").red());
        return Ok(());
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(in_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    println!("  Files found: {}", entries.len());
    let mut supported = 0;
    for path in &entries {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if runner.is_supported(path) {
            supported += 1;
            println!("  {} {} - Supported format", style("✓").green(), name);
        } else {
            println!("  {} {} - Unsupported format", style("✗").yellow(), name);
        }
    }
    println!("  Supported files: {}", supported);

    Ok(())
}

fn check_writable(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let probe = dir.join(".scancsv_write_test");
    fs::write(&probe, b"ok")?;
    fs::remove_file(&probe)
}
