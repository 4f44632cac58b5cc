//! Priority-ordered header field extraction.

use regex::Regex;

use super::patterns::{FieldKind, FieldPatterns};
use super::{ExtractionMatch, FieldExtractor};

/// Extracts one field by trying its patterns in order.
pub struct FieldRule<'a> {
    patterns: &'a [Regex],
}

impl<'a> FieldRule<'a> {
    pub fn new(patterns: &'a [Regex]) -> Self {
        Self { patterns }
    }

    /// Rule for a configured field kind.
    pub fn for_kind(patterns: &'a FieldPatterns, kind: FieldKind) -> Self {
        Self::new(patterns.patterns(kind))
    }

    /// A match ends the search even when group 1 did not participate; the
    /// value is then empty.
    fn capture(pattern_index: usize, regex: &Regex, text: &str) -> Option<ExtractionMatch<String>> {
        let caps = regex.captures(text)?;
        let value = caps.get(1).map_or("", |group| group.as_str().trim());
        Some(ExtractionMatch::new(value.to_string(), pattern_index))
    }
}

impl FieldExtractor for FieldRule<'_> {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.patterns
            .iter()
            .enumerate()
            .find_map(|(i, regex)| Self::capture(i, regex, text))
    }
}

/// Return the trimmed first capture of the first matching pattern, or an
/// empty string when nothing matches.
///
/// Matching is case-insensitive and multi-line only if the patterns were
/// built that way: compile them with [`field_regex`] or take them from
/// [`FieldPatterns::patterns`]. A plain `Regex::new` pattern keeps its own
/// flags.
///
/// [`field_regex`]: super::patterns::field_regex
pub fn extract_field(text: &str, patterns: &[Regex]) -> String {
    FieldRule::new(patterns)
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::field_regex;

    fn compile(patterns: &[&str]) -> Vec<Regex> {
        patterns.iter().map(|p| field_regex(p).unwrap()).collect()
    }

    #[test]
    fn test_first_pattern_wins() {
        let patterns = compile(&[r"Ref[:\s]*(\w+)", r"Invoice[:\s]*(\w+)"]);
        let text = "Invoice: B-200\nRef: A100";
        assert_eq!(extract_field(text, &patterns), "A100");
        assert_eq!(FieldRule::new(&patterns).extract(text).unwrap().pattern_index, 0);
    }

    #[test]
    fn test_falls_back_to_later_pattern() {
        let patterns = compile(&[r"Vendor:\s*([^\n]+)", r"From:\s*([^\n]+)"]);
        let found = FieldRule::new(&patterns).extract("From:   Globex  \n").unwrap();
        assert_eq!(found.value, "Globex");
        assert_eq!(found.pattern_index, 1);
    }

    #[test]
    fn test_empty_inputs() {
        let patterns = compile(&[r"Total:\s*(\d+)"]);
        assert_eq!(extract_field("", &patterns), "");
        assert_eq!(extract_field("Total: 5", &[]), "");
        assert_eq!(extract_field("nothing here", &patterns), "");
    }

    #[test]
    fn test_match_without_group_stops_search() {
        let patterns = compile(&[r"Total(?::\s*(\d+))?", r"Sum\s*(\d+)"]);
        assert_eq!(extract_field("Total Sum 7", &patterns), "");

        let found = FieldRule::new(&patterns).extract("Total Sum 7").unwrap();
        assert_eq!(found.pattern_index, 0);
        assert_eq!(extract_field("Sum 7", &patterns), "7");
    }

    #[test]
    fn test_field_regex_flags() {
        let patterns = compile(&[r"^vendor:\s*(\w+)$"]);
        assert_eq!(extract_field("ref 12\nVENDOR: acme\nTotal: 5", &patterns), "acme");

        let plain = vec![Regex::new(r"^vendor:\s*(\w+)$").unwrap()];
        assert_eq!(extract_field("ref 12\nVENDOR: acme", &plain), "");
    }

    #[test]
    fn test_default_vendor_patterns() {
        let patterns = FieldPatterns::default();
        let rule = FieldRule::for_kind(&patterns, FieldKind::VendorName);

        assert_eq!(rule.extract("Vendor: Acme Corp\n").unwrap().value, "Acme Corp");
        assert_eq!(
            rule.extract("ABC Corporation Ltd\nInvoice #: 7").unwrap().value,
            "ABC Corporation Ltd"
        );
    }

    #[test]
    fn test_default_total_patterns() {
        let patterns = FieldPatterns::default();
        let text = "Subtotal: 900.00\nGrand Total: INR 1,250.00";
        assert_eq!(extract_field(text, patterns.patterns(FieldKind::GrandTotal)), "1,250.00");
    }
}
