//! Display formatting for spreadsheet values: dates, amounts, plain fields.
//!
//! Spreadsheet cells arrive loosely typed, so every formatter here is total:
//! bad input falls back to a printable string instead of an error.

use chrono::{DateTime, Datelike};

use crate::model::Value;

pub const CURRENCY_SYMBOL: &str = "₹";

/// Serial of 1970-01-01 in the 1900 date system (day 0 = 1899-12-30).
const UNIX_EPOCH_SERIAL: f64 = 25569.0;
const MS_PER_DAY: f64 = 86_400_000.0;
/// Largest timestamp magnitude a calendar date is produced for.
const MAX_TIMESTAMP_MS: f64 = 8.64e15;

/// Shortest decimal text for a number: `25569`, `12.5`, `Infinity`.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}

/// Text for a detail-grid field. Absent, zero and NaN display blank.
pub fn display_field(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::Text(s)) => s.clone(),
        Some(Value::Number(n)) if *n == 0.0 || n.is_nan() => String::new(),
        Some(Value::Number(n)) => number_to_string(*n),
    }
}

/// Convert a spreadsheet date serial to `DD-MM-YYYY` (UTC).
///
/// Text passes through unchanged, absent and NaN give `""`, and a serial that
/// does not map to a calendar date is returned as its raw number text.
pub fn format_serial_date(value: Option<&Value>) -> String {
    let serial = match value {
        None => return String::new(),
        Some(Value::Text(s)) => return s.clone(),
        Some(Value::Number(n)) if n.is_nan() => return String::new(),
        Some(Value::Number(n)) => *n,
    };

    // Round half toward +inf, the way spreadsheet tools do.
    let ms = ((serial - UNIX_EPOCH_SERIAL) * MS_PER_DAY + 0.5).floor();
    if !ms.is_finite() || ms.abs() > MAX_TIMESTAMP_MS {
        return number_to_string(serial);
    }
    let Some(dt) = DateTime::from_timestamp_millis(ms as i64) else {
        return number_to_string(serial);
    };
    let date = dt.date_naive();
    format!("{:02}-{:02}-{:04}", date.day(), date.month(), date.year())
}

fn amount_of(value: Option<&Value>) -> f64 {
    match value {
        None => 0.0,
        Some(Value::Number(n)) if n.is_nan() => 0.0,
        Some(Value::Number(n)) => *n,
        Some(Value::Text(s)) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else {
                t.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
    }
}

/// Two decimal places, with exact half-cent ties rounded away from zero.
///
/// A double is exactly halfway between two cents only when it is an odd
/// multiple of 1/8, so those are the only values `{:.2}` (ties to even) can
/// round differently.
fn fixed_2(n: f64) -> String {
    let magnitude = n.abs();
    let eighths = magnitude * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        let cents = (magnitude * 100.0).ceil() as u64;
        let sign = if n < 0.0 { "-" } else { "" };
        return format!("{sign}{}.{:02}", cents / 100, cents % 100);
    }
    format!("{n:.2}")
}

/// Format an amount as `₹ 1234.50`. Absent values print as zero.
pub fn format_currency(value: Option<&Value>) -> String {
    let n = amount_of(value);
    let digits = if n.is_finite() {
        // -0.0 would otherwise print as "-0.00"
        let n = if n == 0.0 { 0.0 } else { n };
        fixed_2(n)
    } else {
        number_to_string(n)
    };
    format!("{CURRENCY_SYMBOL} {digits}")
}
