//! Dialect-fixed timestamp layouts.
//!
//! Layouts without an offset are read as UTC. Mismatches follow the parse
//! policy: the lenient policy substitutes the current time, the strict one
//! fails the line.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::model::{ParseError, ParsePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    /// `2024-01-01 10:00:00`
    Generic,
    /// `2024/01/01 10:00:00`
    NginxError,
    /// `10/Oct/2000:13:55:36 -0700`
    CommonLog,
    /// `Mon Jan 01 10:00:00.123456 2024`, fraction optional
    ApacheError,
    /// `2024-01-01T10:00:00.000000Z`
    Rfc3339,
}

impl Layout {
    fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        match self {
            Layout::Generic => naive(raw, &["%Y-%m-%d %H:%M:%S"]),
            Layout::NginxError => naive(raw, &["%Y/%m/%d %H:%M:%S"]),
            Layout::ApacheError => naive(raw, &["%a %b %d %H:%M:%S%.f %Y", "%a %b %d %H:%M:%S %Y"]),
            Layout::CommonLog => DateTime::parse_from_str(raw, "%d/%b/%Y:%H:%M:%S %z")
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

fn naive(raw: &str, formats: &[&str]) -> Option<DateTime<Utc>> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.and_utc())
}

pub(crate) fn parse_timestamp(
    raw: &str,
    layout: Layout,
    policy: ParsePolicy,
) -> Result<DateTime<Utc>, ParseError> {
    match layout.parse(raw) {
        Some(ts) => Ok(ts),
        None => fallback_timestamp(raw, policy),
    }
}

/// Timestamp for a line whose timestamp is missing or unusable.
pub(crate) fn fallback_timestamp(
    raw: &str,
    policy: ParsePolicy,
) -> Result<DateTime<Utc>, ParseError> {
    match policy {
        ParsePolicy::Lenient => Ok(Utc::now()),
        ParsePolicy::Strict => Err(ParseError::InvalidTimestamp(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_generic_layout() {
        let ts = parse_timestamp("2024-01-01 10:00:00", Layout::Generic, ParsePolicy::Strict).unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2024, 1, 1, 10));
    }

    #[test]
    fn test_common_log_layout_converts_to_utc() {
        let ts = parse_timestamp("10/Oct/2000:13:55:36 -0700", Layout::CommonLog, ParsePolicy::Strict)
            .unwrap();
        assert_eq!(ts.hour(), 20);
        assert_eq!(ts.minute(), 55);
    }

    #[test]
    fn test_nginx_error_layout() {
        let ts = parse_timestamp("2024/03/05 23:59:01", Layout::NginxError, ParsePolicy::Strict).unwrap();
        assert_eq!((ts.month(), ts.day(), ts.hour()), (3, 5, 23));
    }

    #[test]
    fn test_apache_error_layout_with_and_without_fraction() {
        let with = parse_timestamp("Sun Oct 12 14:32:52.123456 2025", Layout::ApacheError, ParsePolicy::Strict)
            .unwrap();
        assert_eq!(with.hour(), 14);

        let without = parse_timestamp("Sun Oct 12 14:32:52 2025", Layout::ApacheError, ParsePolicy::Strict)
            .unwrap();
        assert_eq!(without.minute(), 32);
    }

    #[test]
    fn test_rfc3339_layout() {
        let ts = parse_timestamp("2024-01-01T06:07:08.000000Z", Layout::Rfc3339, ParsePolicy::Strict).unwrap();
        assert_eq!(ts.hour(), 6);
    }

    #[test]
    fn test_mismatch_follows_policy() {
        let before = Utc::now();
        let lenient = parse_timestamp("yesterday-ish", Layout::Generic, ParsePolicy::Lenient).unwrap();
        assert!(lenient >= before);

        let strict = parse_timestamp("yesterday-ish", Layout::Generic, ParsePolicy::Strict);
        assert_eq!(strict, Err(ParseError::InvalidTimestamp("yesterday-ish".to_string())));
    }
}
