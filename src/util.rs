// Utility helpers for amount coercion and display formatting.
//
// Storage and spreadsheet imports hand us amounts as numbers or as text, so
// everything funnels through `coerce_amount` before arithmetic happens.
use crate::types::RawAmount;
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse an amount written as text.
///
/// - Trims whitespace; blank text is treated as zero.
/// - Anything `f64::from_str` rejects yields `None`.
/// - `inf`/`NaN` spellings are rejected so they cannot poison sums.
pub fn parse_amount_text(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a stored amount to `f64`. Missing, blank or unparsable values are 0;
/// this never fails.
pub fn coerce_amount(raw: Option<&RawAmount>) -> f64 {
    match raw {
        Some(RawAmount::Number(v)) if v.is_finite() => *v,
        Some(RawAmount::Number(_)) => 0.0,
        Some(RawAmount::Text(s)) => parse_amount_text(s).unwrap_or(0.0),
        None => 0.0,
    }
}

/// `true` when the value is absent or blank.
pub fn amount_is_blank(raw: Option<&RawAmount>) -> bool {
    match raw {
        None => true,
        Some(RawAmount::Text(s)) => s.trim().is_empty(),
        Some(RawAmount::Number(_)) => false,
    }
}

/// Amount as it should appear in a re-importable sheet: numbers in plain
/// notation, text untouched, absent as an empty cell.
pub fn raw_amount_text(raw: Option<&RawAmount>) -> String {
    match raw {
        Some(RawAmount::Number(v)) => v.to_string(),
        Some(RawAmount::Text(s)) => s.clone(),
        None => String::new(),
    }
}

pub fn parse_date_safe(s: &str) -> Option<NaiveDate> {
    // Dates are expected in `YYYY-MM-DD` format.
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// Works on the digit string, so magnitudes past `u64::MAX` still group.
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus `,` thousands separators
    // (e.g. `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = group_digits(int_part);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Render an amount for display: grouped thousands, at most three
/// fractional digits, trailing zeros dropped. Absent, zero and non-finite
/// values render as `"0"`.
pub fn format_amount(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v != 0.0 && v.is_finite() => v,
        _ => return "0".to_string(),
    };
    let s = format_number(v, 3);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// `part / total` as a percentage with one fractional digit. A zero or NaN
/// total yields `"0%"`.
pub fn calculate_percentage(part: f64, total: f64) -> String {
    if total == 0.0 || total.is_nan() {
        return "0%".to_string();
    }
    format!("{:.1}%", (part / total) * 100.0)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g. `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
