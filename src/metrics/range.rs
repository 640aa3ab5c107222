//! Inclusive calendar date ranges.
//!
//! All aggregation works on local calendar days, so ranges are plain
//! `NaiveDate` pairs. Both ends are inclusive.

use chrono::{Datelike, Days, IsoWeek, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Longest trailing window a caller can ask for, about ten years.
pub const MAX_RANGE_DAYS: u32 = 3660;

/// An inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range; `start` must not be after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, &'static str> {
        if start > end {
            return Err("Range start must not be after range end");
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The `days` days ending at (and including) `today`.
    ///
    /// `days` is clamped to `1..=MAX_RANGE_DAYS`.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.clamp(1, MAX_RANGE_DAYS) - 1);
        let start = today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Monday through Sunday of an ISO 8601 week.
    pub fn iso_week(week: IsoWeek) -> Self {
        let monday = NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon)
            .unwrap_or(NaiveDate::MIN);
        let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
        Self {
            start: monday,
            end: sunday,
        }
    }

    /// The ISO week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        Self::iso_week(date.iso_week())
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self {
            start: first,
            end: last,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterate every day in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    /// The range of the same length immediately before this one.
    pub fn preceding(&self) -> Self {
        let len = self.num_days() as u64;
        let start = self
            .start
            .checked_sub_days(Days::new(len))
            .unwrap_or(NaiveDate::MIN);
        let end = self.start.pred_opt().unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(DateRange::new(date(2024, 3, 2), date(2024, 3, 1)).is_err());
        assert!(DateRange::new(date(2024, 3, 1), date(2024, 3, 1)).is_ok());
    }

    #[test]
    fn test_last_days_includes_today() {
        let range = DateRange::last_days(date(2024, 3, 10), 7);
        assert_eq!(range.start(), date(2024, 3, 4));
        assert_eq!(range.end(), date(2024, 3, 10));
        assert_eq!(range.num_days(), 7);
        assert_eq!(DateRange::last_days(date(2024, 3, 10), 0).num_days(), 1);
    }

    #[test]
    fn test_last_days_is_capped() {
        let range = DateRange::last_days(date(2024, 3, 10), u32::MAX);
        assert_eq!(range.num_days(), i64::from(MAX_RANGE_DAYS));
        assert_eq!(range.end(), date(2024, 3, 10));
    }

    #[test]
    fn test_iso_week_runs_monday_to_sunday() {
        // 2024-01-01 is a Monday and belongs to ISO week 1 of 2024
        let range = DateRange::week_of(date(2024, 1, 3));
        assert_eq!(range.start(), date(2024, 1, 1));
        assert_eq!(range.end(), date(2024, 1, 7));

        // 2021-01-03 is a Sunday in ISO week 53 of 2020
        let range = DateRange::week_of(date(2021, 1, 3));
        assert_eq!(range.start(), date(2020, 12, 28));
        assert_eq!(range.end(), date(2021, 1, 3));
    }

    #[test]
    fn test_month_of_handles_leap_february() {
        let range = DateRange::month_of(date(2024, 2, 15));
        assert_eq!(range.start(), date(2024, 2, 1));
        assert_eq!(range.end(), date(2024, 2, 29));
    }

    #[test]
    fn test_days_iterates_inclusive() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 1)).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], date(2024, 2, 27));
        assert_eq!(days[3], date(2024, 3, 1));
    }

    #[test]
    fn test_preceding_has_same_length() {
        let range = DateRange::last_days(date(2024, 3, 14), 7);
        let previous = range.preceding();
        assert_eq!(previous.start(), date(2024, 3, 1));
        assert_eq!(previous.end(), date(2024, 3, 7));
    }
}
