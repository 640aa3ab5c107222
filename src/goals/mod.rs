//! Goals module.
//!
//! Goals are stored as fields on each exercise (a daily and a weekly target,
//! 0 meaning unset). This module classifies logged totals against them.

pub mod evaluator;
pub mod types;

// Re-exports for convenience
pub use evaluator::{GoalEvaluator, GoalMap};
pub use types::{GoalPeriod, GoalProgress, GoalState};
