//! CSV and JSON summary writers for a parsed batch.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use scancsv_core::models::config::OutputConfig;
use scancsv_core::{BatchResult, OutputFiles, RunSummary};

/// Where a run's outputs are written.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub header_csv: PathBuf,
    pub lines_csv: PathBuf,
    pub summary_json: PathBuf,
    pub raw_json_dir: PathBuf,
}

impl OutputPaths {
    /// Lay out outputs next to the header CSV.
    pub fn new(header_csv: &Path, config: &OutputConfig) -> Self {
        let dir = output_dir(header_csv);
        Self {
            header_csv: header_csv.to_path_buf(),
            lines_csv: dir.join(&config.lines_csv_name),
            summary_json: dir.join(&config.summary_name),
            raw_json_dir: dir.join(&config.raw_dir_name),
        }
    }

    /// Record a raw JSON directory other than the default.
    pub fn with_raw_dir(mut self, raw_json_dir: &Path) -> Self {
        self.raw_json_dir = raw_json_dir.to_path_buf();
        self
    }

    pub fn dir(&self) -> PathBuf {
        output_dir(&self.header_csv)
    }

    fn files(&self) -> OutputFiles {
        OutputFiles {
            header_csv: self.header_csv.display().to_string(),
            lines_csv: self.lines_csv.display().to_string(),
            raw_json_dir: self.raw_json_dir.display().to_string(),
        }
    }
}

fn output_dir(header_csv: &Path) -> PathBuf {
    match header_csv.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write header CSV, line-item CSV and the JSON run summary.
///
/// Empty tables are skipped with a warning; the summary is always written.
pub fn save_outputs(result: &BatchResult, paths: &OutputPaths) -> anyhow::Result<RunSummary> {
    fs::create_dir_all(paths.dir())?;

    if result.headers.is_empty() {
        warn!("No header data to save");
    } else {
        write_csv(&paths.header_csv, &result.headers)?;
        info!(
            "Saved {} invoice headers to {}",
            result.headers.len(),
            paths.header_csv.display()
        );
    }

    if result.line_items.is_empty() {
        warn!("No line items to save");
    } else {
        write_csv(&paths.lines_csv, &result.line_items)?;
        info!(
            "Saved {} line items to {}",
            result.line_items.len(),
            paths.lines_csv.display()
        );
    }

    let summary = result.summary(paths.files());
    let file = File::create(&paths.summary_json)?;
    serde_json::to_writer_pretty(file, &summary)?;
    info!("Processing summary saved to {}", paths.summary_json.display());

    Ok(summary)
}
