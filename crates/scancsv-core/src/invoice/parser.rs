//! Batch invoice parser combining field patterns and line-item detection.

use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::error::ExtractionError;
use crate::models::config::{ExtractionConfig, ExtractionDefaults, LineItemRules};
use crate::models::invoice::{BatchResult, HeaderRecord, LineItemRecord, RecordStatus};
use crate::ocr::{OcrBatch, OcrPayload, OcrResult};

use super::rules::{FieldKind, FieldPatterns, LineItemExtractor};
use super::{InvoiceExtractor, Result};

/// Why a single document could not be parsed.
pub type ParseFailure = ExtractionError;

/// Records extracted from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub header: HeaderRecord,
    pub line_items: Vec<LineItemRecord>,
}

impl ParsedDocument {
    /// Convert a per-document outcome into records, degrading failures to an
    /// error-status header with no line items.
    fn from_outcome(file_id: &str, outcome: Result<ParsedDocument>) -> Self {
        match outcome {
            Ok(doc) => {
                info!("{}: Found {} line items", file_id, doc.line_items.len());
                doc
            }
            Err(e) => {
                error!("Error parsing {}: {}", file_id, e);
                Self {
                    header: HeaderRecord::error(file_id),
                    line_items: Vec::new(),
                }
            }
        }
    }
}

fn assemble(documents: Vec<ParsedDocument>) -> BatchResult {
    let mut result = BatchResult::default();
    for doc in documents {
        result.headers.push(doc.header);
        result.line_items.extend(doc.line_items);
    }
    result
}

fn parse_sequential<P: InvoiceParser + ?Sized>(parser: &P, batch: &OcrBatch) -> BatchResult {
    info!("Parsing {} invoices...", batch.len());
    let documents = batch
        .iter()
        .map(|(file_id, payload)| {
            ParsedDocument::from_outcome(file_id, parser.parse_document(file_id, payload))
        })
        .collect();
    assemble(documents)
}

/// Trait for batch invoice parsing.
pub trait InvoiceParser {
    /// Parse a single document payload.
    fn parse_document(&self, file_id: &str, payload: &OcrPayload) -> Result<ParsedDocument>;

    /// Parse every document in batch order.
    ///
    /// Always yields exactly one header per input document; a failing
    /// document becomes an error-status header and the batch continues.
    fn parse_invoices(&self, batch: &OcrBatch) -> BatchResult {
        parse_sequential(self, batch)
    }

    /// Parse documents on the rayon pool; output order matches
    /// [`parse_invoices`](Self::parse_invoices).
    fn parse_invoices_parallel(&self, batch: &OcrBatch) -> BatchResult
    where
        Self: Sync,
    {
        info!("Parsing {} invoices in parallel...", batch.len());
        let entries: Vec<(&String, &OcrPayload)> = batch.iter().collect();
        let documents = entries
            .par_iter()
            .map(|(file_id, payload)| {
                ParsedDocument::from_outcome(file_id, self.parse_document(file_id, payload))
            })
            .collect();
        assemble(documents)
    }
}

/// Parser driven by priority-ordered field patterns and the table heuristic.
#[derive(Debug, Clone, Default)]
pub struct PatternInvoiceParser {
    patterns: FieldPatterns,
    defaults: ExtractionDefaults,
    line_items: LineItemExtractor,
    parallel: bool,
}

impl PatternInvoiceParser {
    /// Create a parser with the built-in patterns and defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a parser from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            patterns: FieldPatterns::from_config(&config.patterns)?,
            defaults: config.defaults.clone(),
            line_items: LineItemExtractor::new(config.line_items.clone()),
            parallel: config.parallel,
        })
    }

    /// Set the field patterns.
    pub fn with_patterns(mut self, patterns: FieldPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Set the missing-field defaults.
    pub fn with_defaults(mut self, defaults: ExtractionDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the table detection rules.
    pub fn with_line_item_rules(mut self, rules: LineItemRules) -> Self {
        self.line_items = LineItemExtractor::new(rules);
        self
    }

    /// Parse across documents on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn field(&self, kind: FieldKind, text: &str) -> String {
        self.patterns.extract(kind, text)
    }

    fn or_default(value: String, default: impl FnOnce() -> String) -> String {
        if value.is_empty() { default() } else { value }
    }
}

impl InvoiceParser for PatternInvoiceParser {
    fn parse_document(&self, file_id: &str, payload: &OcrPayload) -> Result<ParsedDocument> {
        match payload {
            OcrPayload::WellFormed(result) => Ok(self.extract(file_id, result)),
            OcrPayload::Malformed { reason } => Err(ParseFailure::MalformedOcr {
                file: file_id.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    fn parse_invoices(&self, batch: &OcrBatch) -> BatchResult {
        if self.parallel {
            self.parse_invoices_parallel(batch)
        } else {
            parse_sequential(self, batch)
        }
    }
}

impl InvoiceExtractor for PatternInvoiceParser {
    fn extract(&self, file_id: &str, ocr_result: &OcrResult) -> ParsedDocument {
        self.extract_from_text(file_id, &ocr_result.text(), ocr_result.processing_time)
    }

    fn extract_from_text(&self, file_id: &str, text: &str, processing_time: f64) -> ParsedDocument {
        debug!("Extracting {} from {} characters of text", file_id, text.len());

        let defaults = &self.defaults;
        let header = HeaderRecord {
            file: file_id.to_string(),
            vendor_name: Self::or_default(self.field(FieldKind::VendorName, text), || {
                defaults.vendor_name.clone()
            }),
            invoice_no: Self::or_default(self.field(FieldKind::InvoiceNo, text), || {
                format!("{}{}", defaults.invoice_no_prefix, file_id)
            }),
            invoice_date: self.field(FieldKind::InvoiceDate, text),
            currency: Self::or_default(self.field(FieldKind::Currency, text), || {
                defaults.currency.clone()
            }),
            grand_total: Self::or_default(self.field(FieldKind::GrandTotal, text), || {
                defaults.grand_total.clone()
            }),
            processing_time: processing_time.max(0.0),
            status: RecordStatus::Success,
        };

        ParsedDocument {
            header,
            line_items: self.line_items.extract(text, file_id),
        }
    }
}
