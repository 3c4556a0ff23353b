//! Free-text cleanup applied before any output or display.

use unicode_normalization::UnicodeNormalization;

/// Decompose (NFKD), drop control characters, collapse whitespace runs.
///
/// Idempotent: `sanitize_text(&sanitize_text(s)) == sanitize_text(s)`.
pub fn sanitize_text(s: &str) -> String {
    let filtered: String = s
        .nfkd()
        .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a printed amount literal such as `"1,234.50"`, `"₹500"` or `"Rs.75"`.
///
/// Thousands separators are stripped; leading currency markers are ignored.
/// Returns `None` for anything that is not a non-negative number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let cleaned: String = raw[start..]
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let cleaned = cleaned.trim_end_matches(|c: char| !c.is_ascii_digit());

    let value: f64 = cleaned.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}
