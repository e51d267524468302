//! Date parsing and formatting for `date` columns.
//!
//! Accepted inputs:
//!
//! | Input | Example |
//! |-------|---------|
//! | RFC 3339 | `2024-03-29T10:15:00Z` |
//! | Naive datetime | `2024-03-29T10:15:00`, `2024-03-29 10:15:00` |
//! | Calendar date | `2024-03-29` |
//! | Unix milliseconds | `1711707300000` |
//!
//! Anything else fails closed with `None`.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Format used when a column declares none (or an invalid one).
pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y";

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

enum ParsedDate {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

fn parse_str(raw: &str) -> Option<ParsedDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedDate::Zoned(dt));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ParsedDate::Naive(dt));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(ParsedDate::Naive)
}

fn parse_value(value: &Value) -> Option<ParsedDate> {
    match value {
        Value::String(raw) => parse_str(raw),
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| ParsedDate::Zoned(dt.fixed_offset())),
        _ => None,
    }
}

/// Parse a strftime format, `None` when it contains invalid specifiers.
fn parse_format(format: &str) -> Option<Vec<Item<'_>>> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        None
    } else {
        Some(items)
    }
}

/// Format a date-like cell value.
///
/// An invalid `format` falls back to [`DEFAULT_DATE_FORMAT`]. Returns `None`
/// when the value is not a recognizable date or cannot be formatted with the
/// chosen specifiers (e.g. `%z` on a date without an offset).
pub fn format_date(value: &Value, format: Option<&str>) -> Option<String> {
    let parsed = parse_value(value)?;
    let items = format
        .and_then(parse_format)
        .or_else(|| parse_format(DEFAULT_DATE_FORMAT))?;

    let mut out = String::new();
    let written = match parsed {
        ParsedDate::Zoned(dt) => write!(out, "{}", dt.format_with_items(items.iter())),
        ParsedDate::Naive(dt) => write!(out, "{}", dt.format_with_items(items.iter())),
    };
    written.ok().map(|()| out)
}
