//! Heuristic line-item table detection.
//!
//! A table starts at the first line containing a header keyword. Every
//! non-blank line after that is split on tab runs or runs of three or more
//! spaces; splits with at least three cells become line items. When nothing
//! is detected a single sentinel item is emitted so every document
//! contributes at least one row.

use crate::models::config::LineItemRules;
use crate::models::invoice::LineItemRecord;

use super::patterns::ROW_SEPARATOR;

/// Line-item extractor driven by [`LineItemRules`].
#[derive(Debug, Clone, Default)]
pub struct LineItemExtractor {
    rules: LineItemRules,
}

impl LineItemExtractor {
    pub fn new(mut rules: LineItemRules) -> Self {
        for keyword in &mut rules.header_keywords {
            *keyword = keyword.to_lowercase();
        }
        Self { rules }
    }

    fn is_header(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.rules
            .header_keywords
            .iter()
            .any(|keyword| lower.contains(keyword.as_str()))
    }

    /// Parse one data row, or `None` if it has fewer than three cells.
    fn parse_row(line: &str, file_id: &str) -> Option<LineItemRecord> {
        let parts: Vec<&str> = ROW_SEPARATOR.split(line.trim()).collect();
        if parts.len() < 3 {
            return None;
        }

        let description = parts[0];
        let qty = parts.get(1).copied().unwrap_or("1");
        let unit_price = parts.get(2).copied().unwrap_or("0.00");
        let amount = parts.get(3).or(parts.get(2)).copied().unwrap_or("0.00");

        Some(LineItemRecord::new(file_id, description, qty, unit_price, amount))
    }

    /// Extract line items; never returns an empty vector.
    pub fn extract(&self, text: &str, file_id: &str) -> Vec<LineItemRecord> {
        let mut items = Vec::new();
        let mut header_seen = false;

        for line in text.lines() {
            if self.is_header(line) {
                header_seen = true;
                continue;
            }

            if header_seen && !line.trim().is_empty() {
                if let Some(item) = Self::parse_row(line, file_id) {
                    items.push(item);
                }
            }
        }

        if items.is_empty() {
            let sentinel = &self.rules.sentinel;
            items.push(LineItemRecord::new(
                file_id,
                sentinel.description.as_str(),
                sentinel.qty.as_str(),
                sentinel.unit_price.as_str(),
                sentinel.amount.as_str(),
            ));
        }

        items
    }
}

/// Extract line items with the default rules.
pub fn extract_line_items(text: &str, file_id: &str) -> Vec<LineItemRecord> {
    LineItemExtractor::default().extract(text, file_id)
}
