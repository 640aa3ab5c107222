//! Workout module for randomized daily plans.

pub mod randomizer;
pub mod types;

pub use randomizer::Randomizer;
pub use types::{DailyWorkoutPlan, PlanError, PlanLine, PlannedExercise};
