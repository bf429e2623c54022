//! Labeled regex rules for statement fields.
//!
//! Each field has an ordered rule list; the first rule that matches wins.
//! Rules with two or more groups put the label phrase in group 1 and the
//! value in group 2. Label-to-value gaps are bounded and lazy so a value is
//! never found far away from its label, nor clipped by the gap.

use lazy_static::lazy_static;
use regex::Regex;

/// A label paired with a case-insensitive search expression.
#[derive(Debug)]
pub struct PatternRule {
    /// Human-readable rule name, used in logs.
    pub label: &'static str,
    /// Compiled expression.
    pub pattern: Regex,
}

impl PatternRule {
    fn new(label: &'static str, pattern: &str) -> Self {
        Self {
            label,
            pattern: Regex::new(pattern).unwrap(),
        }
    }
}

lazy_static! {
    // Numeric dates: 05/01/2024, 5-1-24
    pub static ref DUE_DATE_RULES: Vec<PatternRule> = vec![
        PatternRule::new(
            "payment due date",
            r"(?i)(Payment Due Date|Due Date|PAYMENT DUE)[\s\S]{0,20}?\b(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})\b",
        ),
        PatternRule::new(
            "payment due date (long form)",
            r"(?i)(Payment Due Date|Due Date|PAYMENT DUE)[\s\S]{0,20}?\b((?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4})\b",
        ),
    ];

    pub static ref BILLING_CYCLE_RULES: Vec<PatternRule> = vec![
        PatternRule::new(
            "statement closing date",
            r"(?i)(Statement Closing Date|Billing Cycle Ends)[\s\S]{0,20}?\b(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})\b",
        ),
        PatternRule::new(
            "closing date",
            r"(?i)(Closing Date)[\s\S]{0,20}?\b(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})\b",
        ),
        PatternRule::new(
            "statement closing date (long form)",
            r"(?i)(Statement Closing Date|Billing Cycle Ends|Closing Date)[\s\S]{0,20}?\b((?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4})\b",
        ),
    ];

    pub static ref LAST_4_RULES: Vec<PatternRule> = vec![
        PatternRule::new(
            "card ending",
            r"(?i)(Last 4 Digits|Account Number Ending In|Card Ending)[\s\S]{0,10}?\b(\d{4})\b",
        ),
        PatternRule::new(
            "account ending",
            r"(?i)(Account Ending(?: In)?|Ending In)[\s\S]{0,10}?\b(\d{4})\b",
        ),
        PatternRule::new(
            "masked card number",
            r"(?i)((?:[x*•]{4}[\s\-]?){3})(\d{4})\b",
        ),
    ];

    pub static ref BALANCE_DUE_RULES: Vec<PatternRule> = vec![
        PatternRule::new(
            "total balance due",
            r"(?i)(Total Balance Due|New Balance|PAY THIS AMOUNT)[\s\S]{0,20}?(\$?(\d{1,3}(?:,\d{3})*|\d+)\.\d{2})",
        ),
        PatternRule::new(
            "statement balance",
            r"(?i)(Statement Balance)[\s\S]{0,20}?(\$?(\d{1,3}(?:,\d{3})*|\d+)\.\d{2})",
        ),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_compile() {
        for rules in [&*DUE_DATE_RULES, &*BILLING_CYCLE_RULES, &*LAST_4_RULES, &*BALANCE_DUE_RULES] {
            assert!(!rules.is_empty());
            for rule in rules {
                assert!(rule.pattern.captures_len() >= 2, "{} has no value group", rule.label);
            }
        }
    }

    #[test]
    fn test_gap_is_bounded() {
        let far = format!("Payment Due Date{}05/01/2024", " ".repeat(40));
        assert!(!DUE_DATE_RULES[0].pattern.is_match(&far));

        let near = format!("Payment Due Date{}05/01/2024", " ".repeat(10));
        assert!(DUE_DATE_RULES[0].pattern.is_match(&near));
    }
}
