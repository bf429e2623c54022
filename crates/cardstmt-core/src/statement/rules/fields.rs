//! Scalar field lookup over ordered pattern rules.

use tracing::trace;

use super::patterns::PatternRule;
use super::ExtractionMatch;

/// Sentinel for a textual field that was not found.
pub const NOT_AVAILABLE: &str = "N/A";

/// Try each rule in declared order and return the first usable match.
///
/// With two or more capture groups the value is group 2 (group 1 holds
/// the label phrase); with one group it is group 1; with none it is the
/// whole match. A rule whose value group is absent or blank is skipped.
pub fn match_rules(text: &str, rules: &[PatternRule]) -> Option<ExtractionMatch<String>> {
    for rule in rules {
        let Some(caps) = rule.pattern.captures(text) else {
            continue;
        };

        let group = match rule.pattern.captures_len() - 1 {
            0 => 0,
            1 => 1,
            _ => 2,
        };

        let Some(value) = caps.get(group) else {
            trace!("Rule '{}' matched without a value group", rule.label);
            continue;
        };

        let trimmed = value.as_str().trim();
        if trimmed.is_empty() {
            continue;
        }

        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or_default();
        trace!("Rule '{}' matched '{}'", rule.label, trimmed);
        return Some(
            ExtractionMatch::new(trimmed.to_string(), rule.label, &text[whole.0..whole.1])
                .with_position(whole.0, whole.1),
        );
    }

    None
}

/// Extract a field value, or [`NOT_AVAILABLE`] when no rule matches.
///
/// A rule that matches with an absent or blank value group does not count;
/// the next rule is tried.
pub fn extract_field(text: &str, rules: &[PatternRule]) -> String {
    match_rules(text, rules)
        .map(|m| m.value)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
