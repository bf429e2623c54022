//! Currency amount normalization.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Currency symbols removed before parsing, plus the UTF-8 rupee sign as it
/// appears when decoded as Windows-1252.
const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '₹'];
const MOJIBAKE_RUPEE: &str = "â‚¹";

/// Turn a loosely formatted currency string into a non-negative amount.
///
/// Strips currency symbols, thousands separators and whitespace. Anything
/// that does not parse, and anything that reads as negative (`-5.00`,
/// `(5.00)`, `5.00 CR`), becomes zero. Never fails.
pub fn normalize_amount(s: &str) -> Decimal {
    let mut cleaned = s.replace(MOJIBAKE_RUPEE, "");
    cleaned.retain(|c| !CURRENCY_SYMBOLS.contains(&c) && c != ',' && !c.is_whitespace());

    let mut body = cleaned.as_str();
    let mut credit = false;

    if let Some(inner) = body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        body = inner;
        credit = true;
    }

    let suffix_start = body.len().saturating_sub(2);
    if body.len() > 2
        && body
            .get(suffix_start..)
            .is_some_and(|suffix| suffix.eq_ignore_ascii_case("cr"))
    {
        body = &body[..suffix_start];
        credit = true;
    }

    match Decimal::from_str(body) {
        Ok(amount) if !credit && amount.is_sign_positive() => amount,
        _ => Decimal::ZERO,
    }
}

/// Format an amount in US style ($1,234.56).
pub fn format_usd(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.round_dp(2).abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, formatted, decimal_part)
}
