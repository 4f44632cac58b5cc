//! Error types for the scancsv-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the scancsv library.
#[derive(Error, Debug)]
pub enum ScanError {
    /// OCR invocation error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while running the external layout model.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The model did not finish within the configured wall-clock limit.
    #[error("timeout processing {path} (>{secs}s)")]
    Timeout { path: PathBuf, secs: u64 },

    /// The model exited with a non-zero status.
    #[error("layout model failed for {path}: {stderr}")]
    Failed { path: PathBuf, stderr: String },

    /// The model process could not be started.
    #[error("failed to spawn layout model: {0}")]
    Spawn(String),

    /// The model finished but produced no JSON output.
    #[error("no output file generated at {0}")]
    MissingOutput(PathBuf),

    /// The input directory does not exist.
    #[error("input directory not found: {0}")]
    InputNotFound(PathBuf),
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The OCR payload for a document could not be read as blocks.
    #[error("malformed OCR result for {file}: {reason}")]
    MalformedOcr { file: String, reason: String },

    /// A configured field pattern failed to compile.
    #[error("invalid {field} pattern {pattern:?}: {reason}")]
    InvalidPattern {
        field: String,
        pattern: String,
        reason: String,
    },
}

/// Result type for the scancsv library.
pub type Result<T> = std::result::Result<T, ScanError>;
