// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.
//!
//! Stored timestamps are fixed-width RFC3339 strings (milliseconds, `Z`
//! suffix) so Firestore's lexical ordering matches chronological ordering.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with milliseconds and a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time in the stored timestamp format.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Parse a stored or client-supplied RFC3339 timestamp.
pub fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(format_utc_rfc3339(whole), "2024-01-15T10:00:00.000Z");

        let later = whole + chrono::Duration::milliseconds(5);
        assert_eq!(format_utc_rfc3339(later), "2024-01-15T10:00:00.005Z");
        assert!(format_utc_rfc3339(whole) < format_utc_rfc3339(later));
    }

    #[test]
    fn test_parse_accepts_offsets() {
        let parsed = parse_rfc3339("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(format_utc_rfc3339(parsed), "2024-01-15T10:00:00.000Z");
        assert!(parse_rfc3339("yesterday").is_none());
    }
}
