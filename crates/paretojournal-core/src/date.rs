//! Calendar-date utilities.
//!
//! Every daily page is keyed by a local calendar date in canonical
//! `YYYY-MM-DD` form. [`CalendarDate`] wraps [`chrono::NaiveDate`] so that
//! ordering is the same as lexical ordering on the canonical string, which is
//! zero-padded and fixed-width. No timezone conversion is performed: "today"
//! is the local wall-clock date at call time.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A local calendar date, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build a date from its components. Returns `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The underlying chrono date.
    pub fn naive(self) -> NaiveDate {
        self.0
    }

    /// Shift by `n` days (negative moves backwards).
    pub fn add_days(self, n: i64) -> Self {
        Self(self.0 + Duration::days(n))
    }

    /// Sugar for `add_days(-n)`.
    pub fn subtract_days(self, n: i64) -> Self {
        self.add_days(-n)
    }

    /// The calendar day before.
    pub fn previous_day(self) -> Self {
        self.add_days(-1)
    }

    /// The calendar day after.
    pub fn next_day(self) -> Self {
        self.add_days(1)
    }

    /// Day of month, 1..=31.
    pub fn day_of_month(self) -> u32 {
        self.0.day()
    }

    /// The `YYYY-MM` prefix shared by every date in the same month.
    pub fn month_key(self) -> String {
        format!("{:04}-{:02}", self.0.year(), self.0.month())
    }

    /// Whether both dates fall in the same calendar month.
    pub fn same_month(self, other: CalendarDate) -> bool {
        self.0.year() == other.0.year() && self.0.month() == other.0.month()
    }

    /// Strictly before `today`.
    pub fn is_before(self, today: CalendarDate) -> bool {
        self < today
    }

    /// Strictly after `today`.
    pub fn is_after(self, today: CalendarDate) -> bool {
        self > today
    }

    /// Iterate every date strictly between `self` and `end`, ascending.
    pub fn days_between_exclusive(self, end: CalendarDate) -> impl Iterator<Item = CalendarDate> {
        let mut cursor = self.add_days(1);
        std::iter::from_fn(move || {
            if cursor < end {
                let current = cursor;
                cursor = cursor.add_days(1);
                Some(current)
            } else {
                None
            }
        })
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidDate(s.to_string());
        let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| invalid())?;
        // chrono accepts unpadded fields and signed years; only the
        // canonical four-digit form may be used as a page key
        if !(0..=9999).contains(&date.0.year()) || date.to_string() != s {
            return Err(invalid());
        }
        Ok(date)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The local wall-clock date right now.
pub fn today() -> CalendarDate {
    CalendarDate(Local::now().date_naive())
}

/// Shift `date` by `n` days.
pub fn add_days(date: CalendarDate, n: i64) -> CalendarDate {
    date.add_days(n)
}

/// Shift `date` back by `n` days.
pub fn subtract_days(date: CalendarDate, n: i64) -> CalendarDate {
    date.subtract_days(n)
}

/// Day of month, 1..=31.
pub fn day_of_month(date: CalendarDate) -> u32 {
    date.day_of_month()
}

/// Strictly before the local date today.
pub fn is_past(date: CalendarDate) -> bool {
    date.is_before(today())
}

/// Strictly after the local date today.
pub fn is_future(date: CalendarDate) -> bool {
    date.is_after(today())
}

/// The `YYYY-MM` prefix of `date`.
pub fn month_key(date: CalendarDate) -> String {
    date.month_key()
}

/// Source of "now" and "today" for the engine.
pub trait Clock: Send {
    /// Current instant, used for `createdAt`/`completedAt` stamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current local calendar date.
    fn today(&self) -> CalendarDate;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> CalendarDate {
        today()
    }
}

/// A clock frozen at a given instant and date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub today: CalendarDate,
}

impl FixedClock {
    /// Freeze on `today`, with `now` at noon UTC of that date.
    pub fn on(today: CalendarDate) -> Self {
        let now = today
            .naive()
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self { now, today }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> CalendarDate {
        self.today
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display_roundtrip_canonical_form() {
        assert_eq!(d("2024-03-05").to_string(), "2024-03-05");
    }

    #[test]
    fn rejects_unpadded_and_impossible_dates() {
        assert!("2024-3-5".parse::<CalendarDate>().is_err());
        assert!("2024-02-30".parse::<CalendarDate>().is_err());
        assert!("yesterday".parse::<CalendarDate>().is_err());
    }

    #[test]
    fn rejects_years_outside_four_digits() {
        assert!("-999-01-01".parse::<CalendarDate>().is_err());
        assert!("-0999-01-01".parse::<CalendarDate>().is_err());
        assert!("+2024-01-01".parse::<CalendarDate>().is_err());
        assert!("12024-01-01".parse::<CalendarDate>().is_err());
        assert_eq!(d("0001-01-01").to_string(), "0001-01-01");
    }

    #[test]
    fn add_days_crosses_month_and_year() {
        assert_eq!(add_days(d("2024-01-31"), 1), d("2024-02-01"));
        assert_eq!(add_days(d("2024-12-31"), 1), d("2025-01-01"));
        assert_eq!(subtract_days(d("2024-03-01"), 1), d("2024-02-29"));
        assert_eq!(d("2024-03-01").previous_day(), d("2024-02-29"));
        assert_eq!(d("2024-02-29").next_day(), d("2024-03-01"));
    }

    #[test]
    fn month_key_and_day_of_month() {
        assert_eq!(month_key(d("2024-03-15")), "2024-03");
        assert_eq!(day_of_month(d("2024-03-15")), 15);
        assert!(d("2024-03-01").same_month(d("2024-03-31")));
        assert!(!d("2024-03-31").same_month(d("2024-04-01")));
    }

    #[test]
    fn days_between_is_exclusive_on_both_ends() {
        let between: Vec<String> = d("2024-01-01")
            .days_between_exclusive(d("2024-01-04"))
            .map(|x| x.to_string())
            .collect();
        assert_eq!(between, vec!["2024-01-02", "2024-01-03"]);
        assert_eq!(d("2024-01-01").days_between_exclusive(d("2024-01-02")).count(), 0);
    }

    #[test]
    fn past_and_future_relative_to_today() {
        let now = today();
        assert!(is_past(now.subtract_days(1)));
        assert!(is_future(now.add_days(1)));
        assert!(!is_past(now));
        assert!(!is_future(now));
    }

    #[test]
    fn serde_uses_canonical_string() {
        let json = serde_json::to_string(&d("2024-01-09")).unwrap();
        assert_eq!(json, "\"2024-01-09\"");
        let back: CalendarDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d("2024-01-09"));
    }

    proptest! {
        #[test]
        fn ordering_matches_lexical_order(a in 0i64..40_000, b in 0i64..40_000) {
            let base = d("1970-01-01");
            let x = base.add_days(a);
            let y = base.add_days(b);
            prop_assert_eq!(x.cmp(&y), x.to_string().cmp(&y.to_string()));
        }

        #[test]
        fn subtract_is_inverse_of_add(a in 0i64..40_000, n in -400i64..400) {
            let x = d("1970-01-01").add_days(a);
            prop_assert_eq!(x.add_days(n).subtract_days(n), x);
        }
    }
}
