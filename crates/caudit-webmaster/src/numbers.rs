//! Lenient number parsing for exported report cells.
//!
//! Exports use locale formatting: `1 234`, `1,234`, `3,5`, `12.5%`. Spaces (including
//! non-breaking ones) are always separators.

/// Removes every Unicode space, `U+00A0` included.
fn strip_spaces(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Parses a count such as `1 234` or `1,234`; commas are thousand separators.
///
/// A fractional value is truncated. Empty cells are `None`, as are negative values.
pub fn parse_count(value: &str) -> Option<u64> {
    let cleaned = strip_spaces(value).replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(count) = cleaned.parse::<u64>() {
        return Some(count);
    }
    let float = cleaned.parse::<f64>().ok()?;
    (float.is_finite() && float >= 0.0).then(|| float.trunc() as u64)
}

/// Parses a decimal such as `3,5`, `3.5` or `12,5%`; a comma is the decimal mark.
pub fn parse_decimal(value: &str) -> Option<f64> {
    let cleaned = strip_spaces(value).replace('%', "").replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
