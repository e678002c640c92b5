//! Shared utilities for the report pipeline.
//!
//! This module contains the cell-level helpers used by both the classifier
//! and the summarizer so they agree on what "numeric" means.

use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Numeric Parsing
// =============================================================================

// Decimal literal with optional single underscores between digits.
static DECIMAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[+-]?(?:\d(?:_?\d)*(?:\.(?:\d(?:_?\d)*)?)?|\.\d(?:_?\d)*)(?:[eE][+-]?\d(?:_?\d)*)?$",
    )
    .expect("Invalid regex: decimal literal")
});

/// Parse a raw cell as a float.
///
/// Surrounding whitespace is ignored. Accepts signed decimal and exponent
/// forms, digit-group underscores (`1_000`), and `inf`/`infinity`/`nan` in
/// any case. Empty and whitespace-only cells never parse.
pub fn parse_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (negative, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let special = match unsigned.to_ascii_lowercase().as_str() {
        "inf" | "infinity" => Some(f64::INFINITY),
        "nan" => Some(f64::NAN),
        _ => None,
    };
    if let Some(value) = special {
        return Some(if negative { -value } else { value });
    }

    if !DECIMAL_PATTERN.is_match(trimmed) {
        return None;
    }
    trimmed.replace('_', "").parse::<f64>().ok()
}

/// Check if a raw cell parses as a float.
#[inline]
pub fn is_float(raw: &str) -> bool {
    parse_float(raw).is_some()
}

/// Error text for a cell that was expected to be numeric.
pub fn float_parse_error(raw: &str) -> String {
    format!("could not convert string to float: '{raw}'")
}

// =============================================================================
// Rounding and Display
// =============================================================================

/// Round to `places` decimals, ties to even on the scaled value.
///
/// Values too large to carry a fractional part at that precision are
/// returned unchanged, which keeps the operation idempotent.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= 4_503_599_627_370_496.0 {
        return value;
    }
    scaled.round_ties_even() / factor
}

/// Format a statistic for display, always showing at least one decimal
/// for integral values (`35.0`, not `35`).
///
/// Magnitudes from 1e16 up, and below 1e-4, use exponent notation with a
/// signed two-digit exponent (`1e+16`, `2.5e-05`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return value.to_string();
    }

    let scientific = format!("{value:e}");
    if let Some((mantissa, exponent)) = scientific.split_once('e') {
        let exponent: i32 = exponent.parse().unwrap_or(0);
        if value != 0.0 && !(-4..16).contains(&exponent) {
            let sign = if exponent < 0 { '-' } else { '+' };
            return format!("{mantissa}e{sign}{:02}", exponent.abs());
        }
    }

    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
