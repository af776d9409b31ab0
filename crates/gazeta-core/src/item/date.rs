//! Lenient publish-date extraction
//!
//! Feed payloads carry dates in whatever format the upstream source used:
//! RFC 3339, bare dates, RFC 2822, epoch seconds, or free text with a date
//! embedded somewhere. Parsing is deliberately forgiving; an unparseable
//! date means "never expires" on the rotation path, so failure here must
//! not invent a date.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Fields consulted, in order, when extracting an item's publish date
pub const DATE_FIELD_CANDIDATES: &[&str] = &[
    "date",
    "published",
    "published_at",
    "publishedAt",
    "updated",
    "updated_at",
    "updatedAt",
];

static EMBEDDED_DATE: OnceLock<Regex> = OnceLock::new();

fn embedded_date() -> &'static Regex {
    EMBEDDED_DATE.get_or_init(|| {
        Regex::new(r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})").expect("static regex")
    })
}

/// Parse a date out of a string in any of the supported formats
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // The common case: an ISO prefix (covers both bare dates and datetimes).
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.to_utc().date_naive());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.to_utc().date_naive());
    }

    // Last resort: a YYYY-MM-DD (or slashed) date buried in free text.
    if let Some(caps) = embedded_date().captures(raw) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Parse a date out of a raw JSON value (string or epoch seconds)
pub fn parse_date_value(value: &serde_json::Value) -> Option<NaiveDate> {
    match value {
        serde_json::Value::String(raw) => parse_date_str(raw),
        serde_json::Value::Number(num) => {
            let secs = num.as_f64()? as i64;
            Some(DateTime::from_timestamp(secs, 0)?.date_naive())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_date_and_datetime() {
        assert_eq!(parse_date_str("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(
            parse_date_str("2024-01-05T08:30:00Z"),
            Some(date(2024, 1, 5))
        );
        assert_eq!(
            parse_date_str("2024-01-05T23:59:59+02:00"),
            Some(date(2024, 1, 5))
        );
    }

    #[test]
    fn parses_rfc2822() {
        assert_eq!(
            parse_date_str("Fri, 05 Jan 2024 10:00:00 GMT"),
            Some(date(2024, 1, 5))
        );
    }

    #[test]
    fn rescues_embedded_date() {
        assert_eq!(
            parse_date_str("posted on 2024/02/09 by editor"),
            Some(date(2024, 2, 9))
        );
    }

    #[test]
    fn parses_epoch_seconds() {
        let value = serde_json::json!(1_704_441_600);
        assert_eq!(parse_date_value(&value), Some(date(2024, 1, 5)));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_date_str(""), None);
        assert_eq!(parse_date_str("not a date"), None);
        assert_eq!(parse_date_value(&serde_json::Value::Null), None);
    }
}
