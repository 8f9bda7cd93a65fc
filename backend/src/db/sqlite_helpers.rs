//! SQLite helper utilities for type conversion
//!
//! SQLite has no native timestamp type, so timestamps are stored as TEXT.
//! Every timestamp this crate writes uses the same fixed-width UTC layout
//! (`YYYY-MM-DDTHH:MM:SS.ffffffZ`): lexical order equals chronological order
//! and the first ten characters are the calendar day.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

// ============================================================================
// ID Helpers
// ============================================================================

/// Generate a new primary key
#[inline]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Timestamp Helpers
// ============================================================================

/// Get current UTC timestamp in the stored layout
#[inline]
pub fn now_iso8601() -> String {
    datetime_to_str(Utc::now())
}

/// Convert a chrono DateTime to the stored layout
#[inline]
pub fn datetime_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Day key matching `substr(<timestamp column>, 1, 10)`
#[inline]
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Current UTC calendar day
#[inline]
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

// ============================================================================
// Query Building Helpers
// ============================================================================

/// Build a `?, ?, ?` placeholder list for an `IN (...)` clause
pub fn placeholders(count: usize) -> String {
    if count == 0 {
        return "NULL".to_string(); // `IN (NULL)` never matches
    }
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_roundtrip() {
        let dt = Utc::now();
        let s = datetime_to_str(dt);
        let parsed = DateTime::parse_from_rfc3339(&s).unwrap();
        assert_eq!(dt.timestamp_micros(), parsed.timestamp_micros());
    }

    #[test]
    fn test_layout_is_fixed_width() {
        let whole_second = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap();
        let s = datetime_to_str(whole_second);
        assert_eq!(s, "2024-01-15T10:30:45.000000Z");
        assert_eq!(s.len(), datetime_to_str(Utc::now()).len());
    }

    #[test]
    fn test_lexical_order_is_chronological() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 15, 9, 59, 59).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(datetime_to_str(earlier) < datetime_to_str(later));
    }

    #[test]
    fn test_day_key_is_timestamp_prefix() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
        let key = day_key(dt.date_naive());
        assert_eq!(key, "2024-03-05");
        assert!(datetime_to_str(dt).starts_with(&key));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(3), "?, ?, ?");
        assert_eq!(placeholders(0), "NULL");
    }
}
