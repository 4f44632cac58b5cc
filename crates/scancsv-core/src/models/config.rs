//! Configuration structures for the scan pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::invoice::rules::patterns::{
    CURRENCY_PATTERNS, GRAND_TOTAL_PATTERNS, INVOICE_DATE_PATTERNS, INVOICE_NO_PATTERNS,
    VENDOR_NAME_PATTERNS,
};

/// Main configuration for the scancsv pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// External layout model configuration.
    pub ocr: OcrConfig,

    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output file naming.
    pub output: OutputConfig,
}

/// External layout model invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Python interpreter used to run the model script.
    pub python: String,

    /// Path to the model's page-parsing script.
    pub script: PathBuf,

    /// Model weight directories, tried in order.
    pub model_candidates: Vec<PathBuf>,

    /// Wall-clock limit per document, in seconds.
    pub timeout_secs: u64,

    /// Accepted input extensions (without the dot, lower-case).
    pub supported_formats: Vec<String>,

    /// Write a synthetic OCR payload when the model is missing or fails.
    pub mock_fallback: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            python: "python".to_string(),
            script: PathBuf::from("Dolphin/demo_page_hf.py"),
            model_candidates: ["hf_model", "Dolphin", "./hf_model", "./Dolphin"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            timeout_secs: 360,
            supported_formats: ["pdf", "png", "jpg", "jpeg", "tiff", "bmp"]
                .into_iter()
                .map(String::from)
                .collect(),
            mock_fallback: true,
        }
    }
}

impl OcrConfig {
    /// Model weights passed to the script.
    pub fn model_path(&self) -> PathBuf {
        self.script
            .parent()
            .map(|dir| dir.join("hf_model"))
            .unwrap_or_else(|| PathBuf::from("hf_model"))
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Per-field pattern lists, tried in order.
    pub patterns: PatternConfig,

    /// Values substituted for missing fields.
    pub defaults: ExtractionDefaults,

    /// Table detection rules.
    pub line_items: LineItemRules,

    /// Parse documents on a rayon pool.
    pub parallel: bool,
}

/// Raw (uncompiled) pattern lists for each field kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub vendor_name: Vec<String>,
    pub invoice_no: Vec<String>,
    pub invoice_date: Vec<String>,
    pub currency: Vec<String>,
    pub grand_total: Vec<String>,
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            vendor_name: owned(VENDOR_NAME_PATTERNS),
            invoice_no: owned(INVOICE_NO_PATTERNS),
            invoice_date: owned(INVOICE_DATE_PATTERNS),
            currency: owned(CURRENCY_PATTERNS),
            grand_total: owned(GRAND_TOTAL_PATTERNS),
        }
    }
}

/// Values used when a field pattern finds nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionDefaults {
    pub vendor_name: String,

    /// Prefixed to the file identifier.
    pub invoice_no_prefix: String,

    pub currency: String,
    pub grand_total: String,
}

impl Default for ExtractionDefaults {
    fn default() -> Self {
        Self {
            vendor_name: "Unknown Vendor".to_string(),
            invoice_no_prefix: "INV-".to_string(),
            currency: "INR".to_string(),
            grand_total: "0.00".to_string(),
        }
    }
}

/// Heuristic table detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItemRules {
    /// Lower-case keywords marking a table header line.
    pub header_keywords: Vec<String>,

    /// Record emitted when no rows are detected.
    pub sentinel: SentinelItem,
}

impl Default for LineItemRules {
    fn default() -> Self {
        Self {
            header_keywords: ["description", "item", "qty", "rate", "amount"]
                .into_iter()
                .map(String::from)
                .collect(),
            sentinel: SentinelItem::default(),
        }
    }
}

/// Placeholder line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelItem {
    pub description: String,
    pub qty: String,
    pub unit_price: String,
    pub amount: String,
}

impl Default for SentinelItem {
    fn default() -> Self {
        Self {
            description: "Sample Item".to_string(),
            qty: "1".to_string(),
            unit_price: "100.00".to_string(),
            amount: "100.00".to_string(),
        }
    }
}

/// Output file naming, relative to the header CSV's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub lines_csv_name: String,
    pub summary_name: String,
    pub raw_dir_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            lines_csv_name: "invoices_lines.csv".to_string(),
            summary_name: "processing_summary.json".to_string(),
            raw_dir_name: "raw".to_string(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.ocr.timeout_secs, 360);
        assert_eq!(config.ocr.supported_formats.len(), 6);
        assert_eq!(config.extraction.defaults.currency, "INR");
        assert_eq!(config.extraction.patterns.vendor_name.len(), 3);
        assert_eq!(config.extraction.patterns.grand_total.len(), 2);
        assert!(!config.extraction.parallel);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ScanConfig =
            serde_json::from_str(r#"{"ocr": {"timeout_secs": 10}, "extraction": {"parallel": true}}"#)
                .unwrap();
        assert_eq!(config.ocr.timeout_secs, 10);
        assert_eq!(config.ocr.python, "python");
        assert!(config.extraction.parallel);
        assert_eq!(config.extraction.line_items.sentinel.description, "Sample Item");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ScanConfig::default();
        config.extraction.defaults.currency = "USD".to_string();
        config.save(&path).unwrap();

        let loaded = ScanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.defaults.currency, "USD");
        assert_eq!(loaded.extraction.patterns.invoice_no, config.extraction.patterns.invoice_no);
    }
}
