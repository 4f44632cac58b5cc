//! Core library for converting scanned invoices to tabular records.
//!
//! This crate provides:
//! - OCR payload models and a runner for the external layout model
//! - Priority-ordered header field extraction (vendor, number, date, currency, total)
//! - Heuristic line-item table detection
//! - A batch parser that isolates per-document failures

pub mod error;
pub mod models;
pub mod ocr;
pub mod invoice;

pub use error::{ExtractionError, OcrError, Result, ScanError};
pub use models::config::ScanConfig;
pub use models::invoice::{
    BatchResult, HeaderRecord, LineItemRecord, OutputFiles, RecordStatus, RunSummary,
};
pub use ocr::{OcrBatch, OcrPayload, OcrResult, PageInfo, TextBlock};
#[cfg(feature = "native")]
pub use ocr::OcrRunner;
pub use invoice::{InvoiceExtractor, InvoiceParser, ParsedDocument, PatternInvoiceParser};
pub use invoice::rules::{extract_field, extract_line_items, field_regex, FieldKind, FieldPatterns};
