//! Rule-based extractors for invoice headers and line items.

pub mod fields;
pub mod line_items;
pub mod patterns;

pub use fields::{extract_field, FieldRule};
pub use line_items::{extract_line_items, LineItemExtractor};
pub use patterns::{field_regex, FieldKind, FieldPatterns};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// An extracted value and the pattern that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Index of the pattern that produced the value.
    pub pattern_index: usize,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, pattern_index: usize) -> Self {
        Self {
            value,
            pattern_index,
        }
    }
}
