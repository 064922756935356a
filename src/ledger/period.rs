//! Reporting periods and their local-time boundaries.

use chrono::{Datelike, Local, NaiveDateTime};

/// Timestamp format used throughout the store. Lexicographic order matches
/// chronological order, so string `BETWEEN` range queries are correct.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A reporting window ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Since local midnight.
    Today,
    /// Since Monday 00:00 of the current week.
    Week,
    /// Since the 1st of the current month.
    Month,
}

impl Period {
    /// Display title for summary headers.
    pub fn title(self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Week => "Week",
            Period::Month => "Month",
        }
    }

    /// Inclusive `(start, end)` timestamp strings for a window ending at `now`.
    pub fn bounds_at(self, now: NaiveDateTime) -> (String, String) {
        let start = match self {
            Period::Today => now.date(),
            Period::Week => now.date() - chrono::Days::new(u64::from(now.weekday().num_days_from_monday())),
            Period::Month => now.date().with_day(1).unwrap_or_else(|| now.date()),
        };
        let start = start.and_hms_opt(0, 0, 0).unwrap_or(now);
        (
            start.format(TIMESTAMP_FORMAT).to_string(),
            now.format(TIMESTAMP_FORMAT).to_string(),
        )
    }

    /// Bounds for a window ending at the current local time.
    pub fn bounds(self) -> (String, String) {
        self.bounds_at(Local::now().naive_local())
    }
}

/// Current local time in store format.
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn today_starts_at_midnight() {
        let (start, end) = Period::Today.bounds_at(at(2026, 3, 18, 14, 30));
        assert_eq!(start, "2026-03-18 00:00:00");
        assert_eq!(end, "2026-03-18 14:30:00");
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-03-18 is a Wednesday; the Monday before is the 16th.
        let (start, _) = Period::Week.bounds_at(at(2026, 3, 18, 14, 30));
        assert_eq!(start, "2026-03-16 00:00:00");
    }

    #[test]
    fn week_on_monday_is_same_day() {
        let (start, _) = Period::Week.bounds_at(at(2026, 3, 16, 9, 0));
        assert_eq!(start, "2026-03-16 00:00:00");
    }

    #[test]
    fn month_starts_on_the_first() {
        let (start, _) = Period::Month.bounds_at(at(2026, 3, 18, 14, 30));
        assert_eq!(start, "2026-03-01 00:00:00");
    }

    #[test]
    fn timestamp_format_sorts_lexicographically() {
        let earlier = at(2026, 3, 1, 0, 0).format(TIMESTAMP_FORMAT).to_string();
        let later = at(2026, 3, 18, 23, 59).format(TIMESTAMP_FORMAT).to_string();
        assert!(earlier < later);
    }
}
