//! Random daily workout generation.
//!
//! The pool is every active exercise flagged as randomizable, or every active
//! exercise when none are flagged. A workout is a uniform sample without
//! replacement from that pool, each with a target drawn uniformly from the
//! exercise's own rep range or the default one. A stored plan can be
//! edited afterwards by adding or removing single exercises.

use crate::exercises::types::{Exercise, RepRange};
use crate::storage::config::Settings;
use crate::storage::database::Database;
use crate::workouts::types::{DailyWorkoutPlan, PlanError, PlannedExercise};
use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// Builds and persists daily workout plans.
pub struct Randomizer<'a> {
    db: &'a Database,
    workout_size: usize,
    default_range: RepRange,
}

impl<'a> Randomizer<'a> {
    pub fn new(db: &'a Database, settings: &Settings) -> Self {
        Self {
            db,
            workout_size: settings.default_workout_size,
            default_range: settings.default_rep_range,
        }
    }

    /// Override the number of exercises per workout.
    pub fn with_size(mut self, size: usize) -> Self {
        self.workout_size = size;
        self
    }

    /// Exercises eligible for selection.
    pub fn pool(&self) -> Result<Vec<Exercise>, PlanError> {
        let active = self.db.list_exercises(false)?;
        if active.iter().any(|e| e.randomizable) {
            Ok(active.into_iter().filter(|e| e.randomizable).collect())
        } else {
            Ok(active)
        }
    }

    /// Draw a new plan for `date` without storing it.
    pub fn generate<R: Rng>(
        &self,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<DailyWorkoutPlan, PlanError> {
        let pool = self.pool()?;
        if pool.is_empty() {
            return Err(PlanError::EmptyPool);
        }

        let size = self.workout_size.min(pool.len());
        let entries = pool
            .choose_multiple(rng, size)
            .map(|exercise| PlannedExercise {
                exercise_id: exercise.id,
                target_count: self.draw_target(exercise, rng),
            })
            .collect();

        Ok(DailyWorkoutPlan {
            date,
            entries,
            generated_at: Utc::now(),
        })
    }

    /// The plan for `date`: the stored one unless `force` is set, otherwise a
    /// freshly drawn plan that replaces it.
    pub fn plan_for<R: Rng>(
        &self,
        date: NaiveDate,
        force: bool,
        rng: &mut R,
    ) -> Result<DailyWorkoutPlan, PlanError> {
        if !force {
            if let Some(plan) = self.db.get_plan(date)? {
                tracing::debug!(%date, "Reusing stored workout plan");
                return Ok(plan);
            }
        }

        let plan = self.generate(date, rng)?;
        self.db.save_plan(&plan)?;
        tracing::info!(%date, exercises = plan.len(), force, "Generated workout plan");

        Ok(plan)
    }

    /// Append an exercise to the plan stored for `date`, starting an empty
    /// plan if none was drawn. Without `target` one is drawn from the
    /// exercise's range.
    pub fn add_exercise<R: Rng>(
        &self,
        date: NaiveDate,
        exercise: &Exercise,
        target: Option<u32>,
        rng: &mut R,
    ) -> Result<DailyWorkoutPlan, PlanError> {
        if target == Some(0) {
            return Err(PlanError::InvalidTarget);
        }

        let mut plan = self.db.get_plan(date)?.unwrap_or_else(|| DailyWorkoutPlan {
            date,
            entries: Vec::new(),
            generated_at: Utc::now(),
        });
        if plan.contains(exercise.id) {
            return Err(PlanError::AlreadyPlanned(exercise.name.clone()));
        }

        let target_count = match target {
            Some(target) => target,
            None => self.draw_target(exercise, rng),
        };
        plan.entries.push(PlannedExercise {
            exercise_id: exercise.id,
            target_count,
        });
        self.db.save_plan(&plan)?;

        tracing::info!(%date, exercise = %exercise.name, target_count, "Added to workout plan");
        Ok(plan)
    }

    /// Drop an exercise from the plan stored for `date`.
    pub fn remove_exercise(
        &self,
        date: NaiveDate,
        exercise: &Exercise,
    ) -> Result<DailyWorkoutPlan, PlanError> {
        let mut plan = self
            .db
            .get_plan(date)?
            .filter(|plan| plan.contains(exercise.id))
            .ok_or_else(|| PlanError::NotPlanned(exercise.name.clone()))?;

        plan.entries.retain(|e| e.exercise_id != exercise.id);
        self.db.save_plan(&plan)?;

        tracing::info!(%date, exercise = %exercise.name, "Removed from workout plan");
        Ok(plan)
    }

    /// Active exercises not yet in the plan for `date`.
    pub fn candidates(&self, date: NaiveDate) -> Result<Vec<Exercise>, PlanError> {
        let plan = self.db.get_plan(date)?;
        Ok(self
            .db
            .list_exercises(false)?
            .into_iter()
            .filter(|e| !plan.as_ref().is_some_and(|p| p.contains(e.id)))
            .collect())
    }

    fn draw_target<R: Rng>(&self, exercise: &Exercise, rng: &mut R) -> u32 {
        let range = exercise.rep_range.unwrap_or(self.default_range);
        rng.gen_range(range.min..=range.max)
    }
}
