//! Fuzzy similarity for short header strings.

use strsim::normalized_levenshtein;

/// Best-window similarity of two strings on a 0..=100 scale.
///
/// The shorter string is compared against every equal-length window of
/// the longer one, so `"date"` scores 100 against `"transaction date"`.
/// Comparison is case-sensitive; callers lower-case headers first.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() {
        return 0;
    }

    let needle: String = shorter.iter().collect();
    let best = longer
        .windows(shorter.len())
        .map(|window| {
            let window: String = window.iter().collect();
            normalized_levenshtein(&needle, &window)
        })
        .fold(0.0_f64, f64::max);

    (best * 100.0).round() as u8
}
