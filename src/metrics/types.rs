//! Statistics report types.

use crate::exercises::types::Exercise;
use crate::metrics::range::DateRange;
use chrono::NaiveDate;
use serde::Serialize;

/// Activity of one exercise over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseStats {
    pub exercise: Exercise,
    /// Sum of all counts in the range
    pub total_count: i64,
    /// Distinct days with at least one entry
    pub days_active: u32,
    /// `total_count / days_active`, 0.0 when there were no active days
    pub average_per_active_day: f64,
}

impl ExerciseStats {
    pub fn new(exercise: Exercise, total_count: i64, days_active: u32) -> Self {
        let average_per_active_day = if days_active == 0 {
            0.0
        } else {
            total_count as f64 / f64::from(days_active)
        };

        Self {
            exercise,
            total_count,
            days_active,
            average_per_active_day,
        }
    }

    /// Average rounded to one decimal for display.
    pub fn average_display(&self) -> String {
        format!("{:.1}", self.average_per_active_day)
    }

    pub fn is_idle(&self) -> bool {
        self.total_count == 0
    }
}

/// Per-exercise statistics for a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub range: DateRange,
    /// One row per exercise, ordered by name
    pub rows: Vec<ExerciseStats>,
    /// Distinct days with any activity at all
    pub active_days: u32,
}

impl StatsReport {
    /// Sum of every exercise's total.
    pub fn grand_total(&self) -> i64 {
        self.rows.iter().map(|row| row.total_count).sum()
    }

    /// Up to `n` exercises with activity, highest total first.
    pub fn top_exercises(&self, n: usize) -> Vec<&ExerciseStats> {
        let mut active: Vec<&ExerciseStats> =
            self.rows.iter().filter(|row| !row.is_idle()).collect();
        active.sort_by(|a, b| {
            b.total_count
                .cmp(&a.total_count)
                .then_with(|| a.exercise.name.cmp(&b.exercise.name))
        });
        active.truncate(n);
        active
    }

    /// Find the row for an exercise by name (case-insensitive).
    pub fn row(&self, name: &str) -> Option<&ExerciseStats> {
        self.rows
            .iter()
            .find(|row| row.exercise.name.eq_ignore_ascii_case(name))
    }
}

/// Comparison of a period's total against the period before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodChange {
    pub current: i64,
    pub previous: i64,
    pub diff: i64,
    /// Percentage change relative to `previous`
    pub pct: f64,
}

impl PeriodChange {
    /// Compare two totals.
    ///
    /// With nothing in the previous period the change is reported as 100%
    /// when the current period has activity and 0% otherwise.
    pub fn between(current: i64, previous: i64) -> Self {
        let diff = current - previous;
        let pct = if previous > 0 {
            diff as f64 / previous as f64 * 100.0
        } else if current > 0 {
            100.0
        } else {
            0.0
        };

        Self {
            current,
            previous,
            diff,
            pct,
        }
    }

    pub fn is_improvement(&self) -> bool {
        self.diff > 0
    }
}

/// Week-over-week and month-over-month progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressOverview {
    /// The last 7 days against the 7 days before
    pub week: PeriodChange,
    /// This calendar month against the previous one
    pub month: PeriodChange,
}

/// Total of all exercises in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: i64,
}

impl MonthlyTotal {
    /// Short label such as "Mar 2024".
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|first| first.format("%b %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }
}
