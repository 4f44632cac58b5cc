//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{InvoiceParser, ParseFailure, ParsedDocument, PatternInvoiceParser};

use crate::error::ExtractionError;
use crate::ocr::OcrResult;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for single-document invoice extractors.
pub trait InvoiceExtractor {
    /// Extract header and line items from an OCR result.
    fn extract(&self, file_id: &str, ocr_result: &OcrResult) -> ParsedDocument;

    /// Extract header and line items from plain document text.
    fn extract_from_text(&self, file_id: &str, text: &str, processing_time: f64) -> ParsedDocument;
}
