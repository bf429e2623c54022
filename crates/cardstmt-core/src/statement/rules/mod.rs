//! Rule-based field extractors for credit-card statements.

pub mod amounts;
pub mod dates;
pub mod fields;
pub mod issuer;
pub mod patterns;
pub mod similarity;

pub use amounts::{format_usd, normalize_amount};
pub use dates::parse_statement_date;
pub use fields::{extract_field, match_rules, NOT_AVAILABLE};
pub use issuer::identify_issuer;
pub use patterns::PatternRule;
pub use similarity::partial_ratio;

/// A value found by a pattern rule, with where it came from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Label of the rule that produced the value.
    pub rule: &'static str,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rule: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            rule,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
