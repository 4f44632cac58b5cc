//! Field pattern lists for invoice header extraction.

use std::fmt;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::config::PatternConfig;

use super::fields::FieldRule;
use super::FieldExtractor;

pub const VENDOR_NAME_PATTERNS: &[&str] = &[
    r"(?:Vendor|From|Bill\s*From|Company)[:\s]*([^\n\r]+)",
    r"^([A-Z][A-Za-z\s&.,'-]+(?:Ltd|Inc|Corp|LLC|Pvt)?)(?:\n|$)",
    r"Invoice\s*From[:\s]*([^\n\r]+)",
];

pub const INVOICE_NO_PATTERNS: &[&str] = &[
    r"Invoice\s*(?:#|No\.?|Number)[:\s]*([\w-]+)",
    r"Invoice[:\s]*(INV-[\w-]+)",
    r"Bill\s*(?:#|No\.?)[:\s]*([\w-]+)",
];

pub const INVOICE_DATE_PATTERNS: &[&str] = &[
    r"(?:Invoice\s*)?Date[:\s]*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
    r"(?:Invoice\s*)?Date[:\s]*(\d{1,2}\s+\w+\s+\d{2,4})",
    r"Dated[:\s]*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
];

pub const CURRENCY_PATTERNS: &[&str] = &[
    r"(?:Currency|Total|Amount)[:\s]*([A-Z]{3})",
    r"(INR|USD|EUR|GBP|AUD|CAD)",
    r"(₹|Rs\.|\$|€|£)",
];

pub const GRAND_TOTAL_PATTERNS: &[&str] = &[
    r"(?:Grand\s*Total|Total\s*Amount|Total\s*Due|Final\s*Total)[:\s]*(?:[₹$€£]|Rs\.?|INR|USD|EUR|GBP)?\s*([\d,]+\.?\d*)",
    r"Total[:\s]*(?:[₹$€£]|Rs\.?|INR|USD|EUR|GBP)?\s*([\d,]+\.?\d*)",
];

lazy_static! {
    // Table cell separator: a run of tabs or three or more spaces
    pub static ref ROW_SEPARATOR: Regex = Regex::new(r"\t+|\s{3,}").unwrap();

    static ref DEFAULT_PATTERNS: FieldPatterns =
        FieldPatterns::from_config(&PatternConfig::default()).unwrap();
}

/// The header fields extracted by pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    VendorName,
    InvoiceNo,
    InvoiceDate,
    Currency,
    GrandTotal,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VendorName => "vendor_name",
            Self::InvoiceNo => "invoice_no",
            Self::InvoiceDate => "invoice_date",
            Self::Currency => "currency",
            Self::GrandTotal => "grand_total",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled, read-only pattern lists for every field kind.
///
/// Each list is tried in order and the first pattern that matches wins.
#[derive(Debug, Clone)]
pub struct FieldPatterns {
    vendor_name: Vec<Regex>,
    invoice_no: Vec<Regex>,
    invoice_date: Vec<Regex>,
    currency: Vec<Regex>,
    grand_total: Vec<Regex>,
}

impl FieldPatterns {
    /// Compile pattern lists from configuration.
    pub fn from_config(config: &PatternConfig) -> Result<Self, ExtractionError> {
        Ok(Self {
            vendor_name: compile(FieldKind::VendorName, &config.vendor_name)?,
            invoice_no: compile(FieldKind::InvoiceNo, &config.invoice_no)?,
            invoice_date: compile(FieldKind::InvoiceDate, &config.invoice_date)?,
            currency: compile(FieldKind::Currency, &config.currency)?,
            grand_total: compile(FieldKind::GrandTotal, &config.grand_total)?,
        })
    }

    /// Replace one field's list.
    pub fn with_patterns<S: AsRef<str>>(
        mut self,
        kind: FieldKind,
        patterns: &[S],
    ) -> Result<Self, ExtractionError> {
        let compiled = compile(kind, patterns)?;
        match kind {
            FieldKind::VendorName => self.vendor_name = compiled,
            FieldKind::InvoiceNo => self.invoice_no = compiled,
            FieldKind::InvoiceDate => self.invoice_date = compiled,
            FieldKind::Currency => self.currency = compiled,
            FieldKind::GrandTotal => self.grand_total = compiled,
        }
        Ok(self)
    }

    /// Extract one field from document text.
    ///
    /// Returns the trimmed first capture of the first matching pattern for
    /// `kind`, or an empty string when no pattern matches.
    pub fn extract(&self, kind: FieldKind, text: &str) -> String {
        match FieldRule::for_kind(self, kind).extract(text) {
            Some(found) => {
                debug!("{} matched pattern #{}: {:?}", kind, found.pattern_index, found.value);
                found.value
            }
            None => {
                debug!("{} not found", kind);
                String::new()
            }
        }
    }

    pub fn patterns(&self, kind: FieldKind) -> &[Regex] {
        match kind {
            FieldKind::VendorName => &self.vendor_name,
            FieldKind::InvoiceNo => &self.invoice_no,
            FieldKind::InvoiceDate => &self.invoice_date,
            FieldKind::Currency => &self.currency,
            FieldKind::GrandTotal => &self.grand_total,
        }
    }
}

impl Default for FieldPatterns {
    fn default() -> Self {
        DEFAULT_PATTERNS.clone()
    }
}

/// Compile a field pattern with the flags every field search uses:
/// case-insensitive, with `^`/`$` matching at line boundaries.
pub fn field_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
}

fn compile<S: AsRef<str>>(kind: FieldKind, patterns: &[S]) -> Result<Vec<Regex>, ExtractionError> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            let invalid = |reason: String| ExtractionError::InvalidPattern {
                field: kind.to_string(),
                pattern: p.to_string(),
                reason,
            };

            let regex = field_regex(p).map_err(|e| invalid(e.to_string()))?;

            if regex.captures_len() < 2 {
                return Err(invalid("pattern has no capturing group".to_string()));
            }
            Ok(regex)
        })
        .collect()
}
