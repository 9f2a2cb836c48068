//! Fetch-window resolution.
//!
//! Decides the `[since, until]` window a run should collect. Pure: the
//! stored high-water mark and the current instant are passed in, so the
//! decision is fully testable with fixed values.

use chrono::{DateTime, Duration, Utc};

/// The resolved collection window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRange {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

/// Resolve the window to fetch.
///
/// `until` defaults to `now`. `since` defaults to one hour past
/// `high_water` when the store has data (one hour is the data's native
/// resolution, so re-runs are gap-free without re-fetching the newest
/// stored interval), otherwise to `until` minus `lookback_days`.
/// Explicit values always win.
#[must_use]
pub fn resolve(
    explicit_since: Option<DateTime<Utc>>,
    explicit_until: Option<DateTime<Utc>>,
    high_water: Option<DateTime<Utc>>,
    lookback_days: i64,
    now: DateTime<Utc>,
) -> FetchRange {
    let until = explicit_until.unwrap_or(now);
    let since = explicit_since.unwrap_or_else(|| {
        high_water.map_or_else(
            || until - Duration::days(lookback_days),
            |mark| mark + Duration::hours(1),
        )
    });
    FetchRange { since, until }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn empty_store_falls_back_ninety_days() {
        let until = utc(2024, 3, 10, 0);
        let range = resolve(None, Some(until), None, 90, utc(2024, 3, 15, 12));
        assert_eq!(range.until, until);
        assert_eq!(range.since, utc(2023, 12, 11, 0));
    }

    #[test]
    fn high_water_mark_advances_one_hour() {
        let mark = utc(2024, 3, 9, 22);
        let now = utc(2024, 3, 10, 6);
        let range = resolve(None, None, Some(mark), 90, now);
        assert_eq!(range.since, utc(2024, 3, 9, 23));
        assert_eq!(range.until, now);
    }

    #[test]
    fn explicit_bounds_win_over_everything() {
        let since = utc(2024, 1, 1, 0);
        let until = utc(2024, 2, 1, 0);
        let range = resolve(
            Some(since),
            Some(until),
            Some(utc(2024, 3, 1, 0)),
            90,
            utc(2024, 3, 15, 0),
        );
        assert_eq!(range.since, since);
        assert_eq!(range.until, until);
    }

    #[test]
    fn until_defaults_to_now() {
        let now = utc(2024, 6, 1, 18);
        let range = resolve(None, None, None, 90, now);
        assert_eq!(range.until, now);
        assert_eq!(range.since, now - Duration::days(90));
    }

    #[test]
    fn lookback_is_configurable() {
        let now = utc(2024, 6, 1, 0);
        let range = resolve(None, None, None, 7, now);
        assert_eq!(range.since, utc(2024, 5, 25, 0));
    }
}
