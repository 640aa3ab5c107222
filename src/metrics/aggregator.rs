//! Aggregation of raw log entries into per-day, per-week and per-range totals.
//!
//! Every timestamp is reduced to its local calendar day before grouping, and
//! all ranges are inclusive on both ends.

use crate::exercises::types::ExerciseId;
use crate::metrics::range::DateRange;
use crate::metrics::types::{ExerciseStats, MonthlyTotal, PeriodChange, ProgressOverview, StatsReport};
use crate::storage::database::{Database, DatabaseError};
use chrono::{Datelike, IsoWeek, Months, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Read-only statistics over the log.
pub struct Aggregator<'a> {
    db: &'a Database,
}

impl<'a> Aggregator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Total count for one exercise on one day.
    pub fn daily_total(&self, exercise_id: ExerciseId, date: NaiveDate) -> Result<i64, DatabaseError> {
        self.db.total_count(Some(exercise_id), DateRange::day(date))
    }

    /// Total count for one exercise over an ISO week (Monday to Sunday).
    pub fn weekly_total(&self, exercise_id: ExerciseId, week: IsoWeek) -> Result<i64, DatabaseError> {
        self.db.total_count(Some(exercise_id), DateRange::iso_week(week))
    }

    /// Per-exercise statistics over `range`.
    ///
    /// Every active exercise gets a row, idle ones with zeros. Inactive
    /// exercises only appear when they have entries in the range.
    pub fn stats_report(&self, range: DateRange) -> Result<StatsReport, DatabaseError> {
        let exercises = self.db.list_exercises(true)?;
        let daily = self.db.daily_totals(None, range)?;

        let mut per_exercise: HashMap<ExerciseId, (i64, u32)> = HashMap::new();
        let mut days = BTreeSet::new();
        for day in &daily {
            let entry = per_exercise.entry(day.exercise_id).or_default();
            entry.0 += day.total;
            entry.1 += 1;
            days.insert(day.date);
        }

        let rows = exercises
            .into_iter()
            .filter_map(|exercise| {
                let (total, days_active) =
                    per_exercise.get(&exercise.id).copied().unwrap_or_default();
                if exercise.active || total > 0 {
                    Some(ExerciseStats::new(exercise, total, days_active))
                } else {
                    None
                }
            })
            .collect();

        tracing::debug!(%range, entries = daily.len(), "Built stats report");

        Ok(StatsReport {
            range,
            rows,
            active_days: days.len() as u32,
        })
    }

    /// All-exercise totals for each day of `range`, idle days included as zero.
    pub fn daily_series(&self, range: DateRange) -> Result<Vec<(NaiveDate, i64)>, DatabaseError> {
        let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for day in self.db.daily_totals(None, range)? {
            *by_day.entry(day.date).or_default() += day.total;
        }

        Ok(range
            .days()
            .map(|date| (date, by_day.get(&date).copied().unwrap_or(0)))
            .collect())
    }

    /// Rolling week and calendar month compared with the periods before them.
    pub fn progress_overview(&self, today: NaiveDate) -> Result<ProgressOverview, DatabaseError> {
        let week = DateRange::last_days(today, 7);
        let month = DateRange::month_of(today);
        let previous_month = month
            .start()
            .pred_opt()
            .map(DateRange::month_of)
            .unwrap_or(month);

        Ok(ProgressOverview {
            week: PeriodChange::between(
                self.db.total_count(None, week)?,
                self.db.total_count(None, week.preceding())?,
            ),
            month: PeriodChange::between(
                self.db.total_count(None, month)?,
                self.db.total_count(None, previous_month)?,
            ),
        })
    }

    /// Totals for the `months` calendar months ending with the one containing
    /// `today`, most recent first. Months without activity are included.
    pub fn monthly_totals(&self, today: NaiveDate, months: u32) -> Result<Vec<MonthlyTotal>, DatabaseError> {
        let mut totals = Vec::with_capacity(months as usize);
        let Some(first_of_month) = today.with_day(1) else {
            return Ok(totals);
        };

        for back in 0..months {
            let Some(start) = first_of_month.checked_sub_months(Months::new(back)) else {
                break;
            };
            totals.push(MonthlyTotal {
                year: start.year(),
                month: start.month(),
                total: self.db.total_count(None, DateRange::month_of(start))?,
            });
        }

        Ok(totals)
    }
}
