//! Due date parsing and normalization
//!
//! Dates arrive from query strings and JSON bodies in whatever shape the
//! client produced. Everything that names a real calendar day is reduced to
//! the canonical `YYYY-MM-DD` form that the `due_date` column stores; anything
//! else is rejected.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Format used for storage and for every date sent back to clients
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest year that still fits the four-digit canonical form
const MAX_YEAR: i32 = 9999;

/// Date-only layouts, tried in order
const DATE_FORMATS: &[&str] = &[
    CANONICAL_DATE_FORMAT,
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%a %B %d %Y",
];

/// Zone-less date-time layouts, tried in order
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Errors that can occur while parsing a date string
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DateParseError {
    /// Nothing to parse
    #[error("Date string is empty")]
    Empty,

    /// No supported layout produced a real calendar date
    #[error("Failed to parse date string '{0}'")]
    Unrecognized(String),

    /// Parsed, but cannot be written as `YYYY-MM-DD`
    #[error("Date is outside the supported range (0000-9999): {0}")]
    OutOfRange(NaiveDate),
}

/// Parse a date-like string into a calendar date
///
/// Accepts RFC 3339 and RFC 2822 timestamps, ISO date-times without a zone,
/// `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY` and English month-name forms.
/// Time of day and offset are dropped; the calendar day written in the input
/// is kept. Overflowing days or months (`2023-02-30`, `2021-13-01`) are errors.
///
/// # Errors
/// Returns an error if the input is empty, matches no supported layout, or
/// falls outside years 0 through 9999
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::Empty);
    }

    let date = parse_any_layout(trimmed)
        .ok_or_else(|| DateParseError::Unrecognized(trimmed.to_string()))?;

    if !(0..=MAX_YEAR).contains(&date.year()) {
        return Err(DateParseError::OutOfRange(date));
    }

    Ok(date)
}

fn parse_any_layout(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }

    let local = strip_zone(s);
    if let Some(date) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(local, fmt).ok())
        .map(|dt| dt.date())
    {
        return Some(date);
    }

    parse_weekday_prefix(s)
}

/// Drop a trailing `Z` or numeric offset from a date-time
///
/// Only strips when the remainder carries a time of day, so a bare
/// `YYYY-MM-DD` is never cut.
fn strip_zone(s: &str) -> &str {
    if let Some(head) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        return head;
    }

    for (len, colon) in [(6, true), (5, false)] {
        let Some(split) = s.len().checked_sub(len) else {
            continue;
        };
        let (Some(head), Some(tail)) = (s.get(..split), s.get(split..)) else {
            continue;
        };
        let bytes = tail.as_bytes();
        let signed = bytes[0] == b'+' || bytes[0] == b'-';
        let digits_ok = bytes[1..].iter().enumerate().all(|(i, b)| {
            if colon && i == 2 {
                *b == b':'
            } else {
                b.is_ascii_digit()
            }
        });
        if signed && digits_ok && head.contains(':') {
            return head;
        }
    }

    s
}

/// `Fri Jan 01 2021 10:00:00 GMT+0000 (Coordinated Universal Time)` style
/// strings: the leading weekday, month, day and year decide the date
fn parse_weekday_prefix(s: &str) -> Option<NaiveDate> {
    let head: Vec<&str> = s.split_whitespace().take(4).collect();
    if head.len() < 4 {
        return None;
    }
    NaiveDate::parse_from_str(&head.join(" "), "%a %B %d %Y").ok()
}

/// Format a date in canonical `YYYY-MM-DD` form
#[must_use]
pub fn format_canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// Normalize an optional date-like input to canonical form
///
/// `None` means the input was absent or not a real calendar date. Callers
/// decide whether that is an error; the validators treat it as one.
#[must_use]
pub fn normalize_date(input: Option<&str>) -> Option<String> {
    let raw = input?;
    parse_date(raw).ok().map(format_canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_canonical_input_is_unchanged() {
        assert_eq!(
            normalize_date(Some("2021-01-01")).as_deref(),
            Some("2021-01-01")
        );
    }

    #[test]
    fn test_unpadded_input_is_padded() {
        assert_eq!(
            normalize_date(Some("2021-1-5")).as_deref(),
            Some("2021-01-05")
        );
        assert_eq!(
            normalize_date(Some("2021/2/3")).as_deref(),
            Some("2021-02-03")
        );
    }

    #[test]
    fn test_us_and_month_name_layouts() {
        assert_eq!(
            normalize_date(Some("12/25/2021")).as_deref(),
            Some("2021-12-25")
        );
        assert_eq!(
            normalize_date(Some("Jan 5 2021")).as_deref(),
            Some("2021-01-05")
        );
        assert_eq!(
            normalize_date(Some("January 5, 2021")).as_deref(),
            Some("2021-01-05")
        );
        assert_eq!(
            normalize_date(Some("5 March 2022")).as_deref(),
            Some("2022-03-05")
        );
    }

    #[test]
    fn test_time_and_zone_are_discarded() {
        assert_eq!(
            normalize_date(Some("2021-01-01T23:59:59.999Z")).as_deref(),
            Some("2021-01-01")
        );
        assert_eq!(
            normalize_date(Some("2021-06-30T01:00:00+05:30")).as_deref(),
            Some("2021-06-30")
        );
        assert_eq!(
            normalize_date(Some("2021-06-30T08:15")).as_deref(),
            Some("2021-06-30")
        );
        assert_eq!(
            normalize_date(Some("2021-06-30 08:15:00")).as_deref(),
            Some("2021-06-30")
        );
        assert_eq!(
            normalize_date(Some("Wed, 30 Jun 2021 08:15:00 GMT")).as_deref(),
            Some("2021-06-30")
        );
    }

    #[test]
    fn test_zoned_date_time_without_seconds() {
        assert_eq!(
            normalize_date(Some("2021-01-01T10:00Z")).as_deref(),
            Some("2021-01-01")
        );
        assert_eq!(
            normalize_date(Some("2021-01-01T23:30+05:30")).as_deref(),
            Some("2021-01-01")
        );
        assert_eq!(
            normalize_date(Some("2021-01-01 10:00-0800")).as_deref(),
            Some("2021-01-01")
        );
    }

    #[test]
    fn test_browser_date_string() {
        assert_eq!(
            normalize_date(Some(
                "Fri Jan 01 2021 10:00:00 GMT+0000 (Coordinated Universal Time)"
            ))
            .as_deref(),
            Some("2021-01-01")
        );
        // Weekday must agree with the date
        assert_eq!(
            normalize_date(Some("Mon Jan 01 2021 10:00:00 GMT+0000")),
            None
        );
    }

    #[test]
    fn test_zone_stripping_leaves_plain_dates_alone() {
        assert_eq!(strip_zone("2021-01-01"), "2021-01-01");
        assert_eq!(strip_zone("2021-01-01T10:00+0100"), "2021-01-01T10:00");
        assert_eq!(strip_zone("2021-01-01T10:00:00Z"), "2021-01-01T10:00:00");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(
            normalize_date(Some("  2021-03-04 ")).as_deref(),
            Some("2021-03-04")
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(normalize_date(None), None);
        assert_eq!(normalize_date(Some("")), None);
        assert_eq!(normalize_date(Some("   ")), None);
        assert_eq!(normalize_date(Some("not-a-date")), None);
        assert_eq!(normalize_date(Some("2023-02-30")), None);
        assert_eq!(normalize_date(Some("2021-01-32")), None);
        assert_eq!(normalize_date(Some("2021-13-01")), None);
    }

    #[test]
    fn test_leap_days() {
        assert_eq!(
            normalize_date(Some("2024-02-29")).as_deref(),
            Some("2024-02-29")
        );
        assert_eq!(
            normalize_date(Some("2000-02-29")).as_deref(),
            Some("2000-02-29")
        );
        assert_eq!(normalize_date(Some("2023-02-29")), None);
        assert_eq!(normalize_date(Some("1900-02-29")), None);
    }

    #[test]
    fn test_month_lengths() {
        assert!(normalize_date(Some("2021-04-30")).is_some());
        assert_eq!(normalize_date(Some("2021-04-31")), None);
        assert!(normalize_date(Some("2021-12-31")).is_some());
    }

    #[test]
    fn test_parse_date_errors() {
        assert_eq!(parse_date(""), Err(DateParseError::Empty));
        assert!(matches!(
            parse_date("tomorrow"),
            Err(DateParseError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_years_outside_four_digits_are_out_of_range() {
        assert!(matches!(
            parse_date("+10000-01-01T00:00:00Z"),
            Err(DateParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_date("+10000-01-01"),
            Err(DateParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_date("-0001-01-01"),
            Err(DateParseError::OutOfRange(_))
        ));
        assert_eq!(normalize_date(Some("+10000-01-01")), None);
    }

    #[test]
    fn test_format_canonical_zero_pads() {
        let date = NaiveDate::from_ymd_opt(987, 3, 4).unwrap();
        assert_eq!(format_canonical(date), "0987-03-04");
    }

    proptest! {
        #[test]
        fn prop_iso_string_round_trips_to_same_day(days in 0i64..2_900_000) {
            let base = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
            let date = base + chrono::Duration::days(days);
            let iso = format!("{}T00:00:00.000Z", format_canonical(date));

            let normalized = normalize_date(Some(&iso)).unwrap();
            let reparsed = NaiveDate::parse_from_str(&normalized, CANONICAL_DATE_FORMAT).unwrap();
            prop_assert_eq!(reparsed, date);
        }

        #[test]
        fn prop_normalized_output_is_a_fixed_point(days in 0i64..2_900_000) {
            let base = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
            let canonical = format_canonical(base + chrono::Duration::days(days));

            prop_assert_eq!(normalize_date(Some(&canonical)), Some(canonical.clone()));
        }
    }
}
