//! Timestamp parsing utilities.
//!
//! Every timestamp in the system is normalized to UTC at its boundary:
//! CLI overrides, API edge fields, and stored rows all pass through here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Result, WattError};

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts the forms the upstream API and operators actually produce:
/// offset-suffixed (`2024-03-10T01:00:00+01:00`), `Z`-suffixed, naive
/// date-times, and bare dates (midnight). Naive values are assumed to
/// already be UTC.
///
/// # Errors
///
/// Returns [`WattError::InvalidTimestamp`] when no form matches.
pub fn parse_utc(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(WattError::InvalidTimestamp {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_zulu_suffix() {
        let dt = parse_utc("2024-03-10T00:00:00Z").expect("parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_offset_and_converts_to_utc() {
        let dt = parse_utc("2024-03-10T01:00:00+01:00").expect("parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn naive_datetime_is_assumed_utc() {
        let dt = parse_utc("2024-03-09T12:00:00").expect("parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap());
    }

    #[test]
    fn bare_date_is_utc_midnight() {
        let dt = parse_utc("2024-01-01").expect("parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse_utc("not-a-date").unwrap_err();
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn fractional_seconds_survive() {
        let dt = parse_utc("2024-03-10T00:00:00.500Z").expect("parse");
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }
}
