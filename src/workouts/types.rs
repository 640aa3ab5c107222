//! Daily workout plan type definitions.

use crate::exercises::types::{Exercise, ExerciseId};
use crate::storage::database::DatabaseError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One exercise in a plan with its target count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub exercise_id: ExerciseId,
    pub target_count: u32,
}

/// The randomized workout for a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWorkoutPlan {
    pub date: NaiveDate,
    /// Exercises in the order they were drawn
    pub entries: Vec<PlannedExercise>,
    pub generated_at: DateTime<Utc>,
}

impl DailyWorkoutPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the plan includes an exercise.
    pub fn contains(&self, exercise_id: ExerciseId) -> bool {
        self.entries.iter().any(|e| e.exercise_id == exercise_id)
    }
}

/// A planned exercise resolved against the catalogue and today's log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanLine {
    pub exercise: Exercise,
    pub target_count: u32,
    /// Everything logged for the exercise on the plan's day
    pub logged: i64,
}

impl PlanLine {
    pub fn is_complete(&self) -> bool {
        self.logged >= i64::from(self.target_count)
    }
}

/// Errors related to workout plans.
#[derive(Debug, Error)]
pub enum PlanError {
    /// No exercise is eligible for randomization
    #[error("No active exercises to build a workout from")]
    EmptyPool,

    /// The exercise is already part of the day's plan
    #[error("{0} is already in the workout")]
    AlreadyPlanned(String),

    /// The exercise is not part of the day's plan
    #[error("{0} is not in the workout")]
    NotPlanned(String),

    #[error("Target must be a positive number")]
    InvalidTarget,

    /// Storage failure while reading or saving a plan
    #[error(transparent)]
    Storage(#[from] DatabaseError),
}
