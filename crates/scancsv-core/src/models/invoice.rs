//! Tabular invoice records produced by the parser.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal written to the vendor and invoice number of a failed document.
pub const ERROR_SENTINEL: &str = "Error";

/// Outcome of parsing a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Fields were extracted (possibly with defaults substituted).
    Success,
    /// The document could not be parsed at all.
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the header table. Exactly one exists per input document.
///
/// Field order matches the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderRecord {
    /// File identifier (file stem), unique within a batch.
    pub file: String,

    /// Vendor (seller) name.
    pub vendor_name: String,

    /// Invoice number.
    pub invoice_no: String,

    /// Invoice date as printed, not normalized.
    pub invoice_date: String,

    /// Currency code or symbol.
    pub currency: String,

    /// Grand total as printed, not normalized.
    pub grand_total: String,

    /// OCR processing time in seconds.
    pub processing_time: f64,

    /// Parse outcome.
    pub status: RecordStatus,
}

impl HeaderRecord {
    /// Build the placeholder header emitted for a document that failed to parse.
    pub fn error(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            vendor_name: ERROR_SENTINEL.to_string(),
            invoice_no: ERROR_SENTINEL.to_string(),
            invoice_date: String::new(),
            currency: String::new(),
            grand_total: "0.00".to_string(),
            processing_time: 0.0,
            status: RecordStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RecordStatus::Success
    }
}

/// One row of the line-item table.
///
/// Field order matches the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRecord {
    /// File identifier of the owning header.
    pub file: String,

    /// Item description.
    pub description: String,

    /// Quantity as printed.
    pub qty: String,

    /// Unit price as printed.
    pub unit_price: String,

    /// Line amount as printed.
    pub amount: String,
}

impl LineItemRecord {
    pub fn new(
        file: impl Into<String>,
        description: impl Into<String>,
        qty: impl Into<String>,
        unit_price: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            description: description.into(),
            qty: qty.into(),
            unit_price: unit_price.into(),
            amount: amount.into(),
        }
    }
}

/// Header and line-item records for a whole batch, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub headers: Vec<HeaderRecord>,
    pub line_items: Vec<LineItemRecord>,
}

impl BatchResult {
    /// Number of documents parsed with status `success`.
    pub fn successful(&self) -> usize {
        self.headers.iter().filter(|h| h.is_success()).count()
    }

    /// Line items belonging to one document.
    pub fn line_items_for<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a LineItemRecord> + 'a {
        self.line_items.iter().filter(move |item| item.file == file)
    }

    /// Build the run summary for this batch.
    pub fn summary(&self, output_files: OutputFiles) -> RunSummary {
        RunSummary {
            total_invoices: self.headers.len(),
            successful_invoices: self.successful(),
            total_line_items: self.line_items.len(),
            output_files,
        }
    }
}

/// JSON summary written alongside the CSV outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_invoices: usize,
    pub successful_invoices: usize,
    pub total_line_items: usize,
    pub output_files: OutputFiles,
}

/// Paths of the files produced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFiles {
    pub header_csv: String,
    pub lines_csv: String,
    pub raw_json_dir: String,
}
