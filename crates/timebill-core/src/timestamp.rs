//! Normalization of `DD-MM-YY HH:MM:SS` timestamps.
//!
//! Time-tracking tables print instants with a two-digit year and no zone.
//! [`normalize`] turns such text into a canonical `YYYY-MM-DDTHH:MM:SS`
//! string, and [`parse_canonical`] is the only way canonical strings are
//! read back (for duration computation and display).

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

/// `chrono` format of a canonical timestamp.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Earliest year a timestamp may resolve to.
pub const MIN_YEAR: i32 = 1900;

/// Latest year a timestamp may resolve to.
pub const MAX_YEAR: i32 = 2100;

lazy_static! {
    static ref DATE_TOKEN: Regex = Regex::new(r"^\d{2}-\d{2}-\d{2}$").unwrap();
    static ref TIME_TOKEN: Regex = Regex::new(r"^\d{2}:\d{2}:\d{2}$").unwrap();
}

/// Normalize a `DD-MM-YY HH:MM:SS` string into a canonical timestamp.
///
/// Returns `None` for anything that is not exactly that shape or that does
/// not name a real calendar instant. Two-digit years below 50 resolve to
/// the 2000s, the rest to the 1900s.
///
/// Day and month are range-checked first (day up to 31 for every month);
/// true calendar validity such as February 31 is only settled when the
/// canonical string is parsed back.
pub fn normalize(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    let tokens: Vec<&str> = raw.split(' ').collect();
    let [date, time] = tokens.as_slice() else {
        trace!("rejecting {:?}: expected exactly two tokens", raw);
        return None;
    };

    if !DATE_TOKEN.is_match(date) || !TIME_TOKEN.is_match(time) {
        trace!("rejecting {:?}: token shape mismatch", raw);
        return None;
    }

    let parts: Vec<u32> = date.split('-').filter_map(|p| p.parse().ok()).collect();
    let [day, month, short_year] = parts.as_slice() else {
        return None;
    };

    if !(1..=12).contains(month) || !(1..=31).contains(day) {
        trace!("rejecting {:?}: day or month out of range", raw);
        return None;
    }

    let year = resolve_century(*short_year);
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }

    let canonical = format!("{:04}-{:02}-{:02}T{}", year, month, day, time);
    parse_canonical(&canonical)?;

    Some(canonical)
}

/// Parse a canonical `YYYY-MM-DDTHH:MM:SS` string.
pub fn parse_canonical(canonical: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(canonical, CANONICAL_FORMAT).ok()
}

/// Format a canonical timestamp for display, e.g. `Jun 15, 09:30 AM`.
///
/// Missing or unreadable timestamps display as a dash.
pub fn display(canonical: Option<&str>) -> String {
    canonical
        .and_then(parse_canonical)
        .map(|dt| dt.format("%b %-d, %I:%M %p").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn resolve_century(short_year: u32) -> i32 {
    let short_year = short_year as i32;
    if short_year < 50 {
        2000 + short_year
    } else {
        1900 + short_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_valid() {
        assert_eq!(
            normalize("15-06-23 09:30:00"),
            Some("2023-06-15T09:30:00".to_string())
        );
    }

    #[test]
    fn test_century_split() {
        for yy in 0..50 {
            let raw = format!("01-01-{:02} 00:00:00", yy);
            let canonical = normalize(&raw).unwrap();
            assert!(canonical.starts_with(&format!("20{:02}", yy)), "{}", canonical);
            assert!(parse_canonical(&canonical).is_some());
        }
        for yy in 50..100 {
            let raw = format!("01-01-{:02} 00:00:00", yy);
            let canonical = normalize(&raw).unwrap();
            assert!(canonical.starts_with(&format!("19{:02}", yy)), "{}", canonical);
            assert!(parse_canonical(&canonical).is_some());
        }
    }

    #[test]
    fn test_rejects_bad_month() {
        assert_eq!(normalize("15-13-23 09:30:00"), None);
        assert_eq!(normalize("15-00-23 09:30:00"), None);
    }

    #[test]
    fn test_rejects_impossible_calendar_date() {
        assert_eq!(normalize("31-02-24 10:00:00"), None);
        assert_eq!(normalize("31-04-23 10:00:00"), None);
        assert_eq!(normalize("32-01-23 10:00:00"), None);
        assert_eq!(normalize("00-01-23 10:00:00"), None);
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(
            normalize("29-02-24 10:00:00"),
            Some("2024-02-29T10:00:00".to_string())
        );
        assert_eq!(normalize("29-02-23 10:00:00"), None);
    }

    #[test]
    fn test_rejects_bad_time() {
        assert_eq!(normalize("15-06-23 25:00:00"), None);
        assert_eq!(normalize("15-06-23 09:61:00"), None);
    }

    #[test]
    fn test_rejects_malformed_shapes() {
        for raw in [
            "",
            "   ",
            "15-06-23",
            "15-06-23  09:30:00",
            "15-06-23 09:30:00 PM",
            "15/06/23 09:30:00",
            "2023-06-15 09:30:00",
            "5-06-23 09:30:00",
            "15-06-23 9:30:00",
            "15-06-23T09:30:00",
            " 15-06-23 09:30:00",
            "ab-cd-ef gh:ij:kl",
        ] {
            assert_eq!(normalize(raw), None, "{:?}", raw);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(display(Some("2023-06-15T09:30:00")), "Jun 15, 09:30 AM");
        assert_eq!(display(Some("2023-12-01T15:05:00")), "Dec 1, 03:05 PM");
        assert_eq!(display(None), "-");
        assert_eq!(display(Some("garbage")), "-");
    }
}
