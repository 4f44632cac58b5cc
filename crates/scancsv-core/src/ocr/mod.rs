//! OCR payloads produced by the external layout model.

#[cfg(feature = "native")]
mod runner;

#[cfg(feature = "native")]
pub use runner::{mock_payload, OcrRunner};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A detected text span with its axis-aligned bounding box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Recognized text content.
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,

    /// Bounding box (x0, y0, x1, y1).
    #[serde(default, deserialize_with = "lenient_bbox")]
    pub bbox: [f32; 4],
}

impl TextBlock {
    pub fn new(text: impl Into<String>, bbox: [f32; 4]) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Page dimensions reported by the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub width: f32,
    pub height: f32,
}

/// Layout model output for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Text blocks in model order.
    pub blocks: Vec<TextBlock>,

    #[serde(
        default,
        deserialize_with = "lenient_page_info",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_info: Option<PageInfo>,

    /// Seconds spent running the model, attached by the runner.
    #[serde(default, rename = "_processing_time", deserialize_with = "lenient_seconds")]
    pub processing_time: f64,
}

// Only `blocks` decides whether a payload is readable. The metadata below is
// never parsed, so irregular values fall back to their defaults.

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

fn lenient_bbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[f32; 4], D::Error> {
    let mut bbox = [0.0; 4];
    if let Value::Array(coords) = Value::deserialize(deserializer)? {
        for (slot, coord) in bbox.iter_mut().zip(&coords) {
            *slot = coord.as_f64().unwrap_or(0.0) as f32;
        }
    }
    Ok(bbox)
}

fn lenient_page_info<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PageInfo>, D::Error> {
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

impl OcrResult {
    pub fn new(blocks: Vec<TextBlock>) -> Self {
        Self {
            blocks,
            page_info: None,
            processing_time: 0.0,
        }
    }

    pub fn with_processing_time(mut self, seconds: f64) -> Self {
        self.processing_time = seconds;
        self
    }

    /// Full document text (block texts joined with newlines).
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A per-document payload handed to the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrPayload {
    /// A payload with a readable block list.
    WellFormed(OcrResult),
    /// A payload whose blocks could not be read.
    Malformed { reason: String },
}

impl OcrPayload {
    /// Classify a raw JSON payload.
    pub fn from_value(value: serde_json::Value) -> Self {
        match serde_json::from_value::<OcrResult>(value) {
            Ok(result) => Self::WellFormed(result),
            Err(e) => Self::Malformed {
                reason: e.to_string(),
            },
        }
    }

    /// Classify a raw JSON document.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(json) {
            Ok(value) => Self::from_value(value),
            Err(e) => Self::Malformed {
                reason: format!("invalid JSON: {}", e),
            },
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Attached processing time, or 0.0 for malformed payloads.
    pub fn processing_time(&self) -> f64 {
        match self {
            Self::WellFormed(result) => result.processing_time,
            Self::Malformed { .. } => 0.0,
        }
    }
}

impl From<OcrResult> for OcrPayload {
    fn from(result: OcrResult) -> Self {
        Self::WellFormed(result)
    }
}

/// Payloads keyed by file identifier, in processing order.
pub type OcrBatch = IndexMap<String, OcrPayload>;
