//! Metrics module for log aggregation and statistics.

pub mod aggregator;
pub mod range;
pub mod types;

pub use aggregator::Aggregator;
pub use range::DateRange;
pub use types::{ExerciseStats, MonthlyTotal, PeriodChange, ProgressOverview, StatsReport};
