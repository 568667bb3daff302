//! Clock - "today" in local wall-clock terms
//!
//! Calendar dates are always taken from local date components, never from a
//! UTC-normalized timestamp, so a late-evening session west of UTC still
//! lands on the day the user sees.

#[cfg(test)]
use std::cell::Cell;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Clock {
    /// Today's calendar date in the local time zone
    fn today(&self) -> NaiveDate;

    /// Current instant, used for snapshot timestamps
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Device clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a date, movable by tests
#[cfg(test)]
#[derive(Debug)]
pub struct FixedClock {
    today: Cell<NaiveDate>,
}

#[cfg(test)]
impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today: Cell::new(today) }
    }

    pub fn set_today(&self, today: NaiveDate) {
        self.today.set(today);
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today.get()
    }

    fn now(&self) -> DateTime<Utc> {
        self.today.get().and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

/// Format as YYYY-MM-DD
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a YYYY-MM-DD string
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Day of week, 0 = Sunday .. 6 = Saturday
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_is_zero_padded() {
        assert_eq!(format_date(date(2024, 1, 3)), "2024-01-03");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29"), Some(date(2024, 2, 29)));
        assert_eq!(parse_date(" 2024-02-01 "), Some(date(2024, 2, 1)));
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_weekday_index_sunday_is_zero() {
        // 2024-01-07 was a Sunday
        assert_eq!(weekday_index(date(2024, 1, 7)), 0);
        assert_eq!(weekday_index(date(2024, 1, 10)), 3);
        assert_eq!(weekday_index(date(2024, 1, 13)), 6);
    }

    #[test]
    fn test_date_order_matches_string_order() {
        let a = date(2023, 12, 31);
        let b = date(2024, 1, 1);
        assert!(a < b);
        assert!(format_date(a) < format_date(b));
    }

    #[test]
    fn test_fixed_clock_moves() {
        let clock = FixedClock::new(date(2024, 1, 1));
        assert_eq!(clock.today(), date(2024, 1, 1));
        clock.set_today(date(2024, 1, 2));
        assert_eq!((&clock).today(), date(2024, 1, 2));
        assert_eq!(clock.now().date_naive(), date(2024, 1, 2));
    }
}
