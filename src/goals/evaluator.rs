//! Goal evaluation against logged totals.
//!
//! Targets are read from the exercises at evaluation time. There is no goal
//! history, so changing a goal also changes how past periods classify.

use crate::exercises::types::ExerciseId;
use crate::goals::types::{GoalPeriod, GoalProgress};
use crate::metrics::range::DateRange;
use crate::storage::database::{Database, DatabaseError};
use chrono::{Datelike, IsoWeek, Local, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Goal progress keyed by exercise.
pub type GoalMap = BTreeMap<ExerciseId, GoalProgress>;

/// Evaluates goal completion for active exercises.
pub struct GoalEvaluator<'a> {
    db: &'a Database,
}

impl<'a> GoalEvaluator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Daily goal progress for `date`.
    pub fn evaluate_day(&self, date: NaiveDate) -> Result<GoalMap, DatabaseError> {
        self.evaluate(GoalPeriod::Daily, DateRange::day(date))
    }

    /// Weekly goal progress for an ISO week.
    pub fn evaluate_week(&self, week: IsoWeek) -> Result<GoalMap, DatabaseError> {
        self.evaluate(GoalPeriod::Weekly, DateRange::iso_week(week))
    }

    pub fn evaluate_today(&self) -> Result<GoalMap, DatabaseError> {
        self.evaluate_day(Local::now().date_naive())
    }

    pub fn evaluate_this_week(&self) -> Result<GoalMap, DatabaseError> {
        self.evaluate_week(Local::now().date_naive().iso_week())
    }

    fn evaluate(&self, period: GoalPeriod, range: DateRange) -> Result<GoalMap, DatabaseError> {
        let mut totals: HashMap<ExerciseId, i64> = HashMap::new();
        for day in self.db.daily_totals(None, range)? {
            *totals.entry(day.exercise_id).or_default() += day.total;
        }

        let progress: GoalMap = self
            .db
            .list_exercises(false)?
            .into_iter()
            .filter(|exercise| period.target_of(exercise) > 0)
            .map(|exercise| {
                let total = totals.get(&exercise.id).copied().unwrap_or(0);
                (exercise.id, GoalProgress::new(exercise, period, total))
            })
            .collect();

        tracing::debug!(%period, %range, goals = progress.len(), "Evaluated goals");
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::types::NewExercise;
    use crate::goals::types::GoalState;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_pushups_goal_met_after_two_sets() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let pushups = db
            .add_exercise(&NewExercise::new("Pushups").with_goals(50, 300))
            .unwrap();
        let d = day(2024, 3, 4);

        let evaluator = GoalEvaluator::new(&db);
        assert_eq!(
            evaluator.evaluate_day(d).unwrap()[&pushups].state,
            GoalState::InProgress
        );

        db.record_log(pushups, 20, d.and_hms_opt(8, 0, 0).unwrap(), None).unwrap();
        assert_eq!(
            evaluator.evaluate_day(d).unwrap()[&pushups].state,
            GoalState::InProgress
        );

        db.record_log(pushups, 35, d.and_hms_opt(12, 0, 0).unwrap(), None).unwrap();
        let progress = &evaluator.evaluate_day(d).unwrap()[&pushups];
        assert_eq!(progress.total, 55);
        assert_eq!(progress.state, GoalState::Met);
    }

    #[test]
    fn test_only_active_exercises_with_goals_appear() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let with_goal = db
            .add_exercise(&NewExercise::new("Squats").with_goals(40, 0))
            .unwrap();
        db.add_exercise(&NewExercise::new("Planks")).unwrap();
        let retired = db
            .add_exercise(&NewExercise::new("Burpees").with_goals(10, 50))
            .unwrap();
        db.deactivate_exercise(retired).unwrap();

        let evaluator = GoalEvaluator::new(&db);
        let daily = evaluator.evaluate_day(day(2024, 3, 4)).unwrap();
        assert_eq!(daily.keys().copied().collect::<Vec<_>>(), vec![with_goal]);

        // Squats has no weekly goal
        assert!(evaluator
            .evaluate_week(day(2024, 3, 4).iso_week())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_week_sums_monday_to_sunday() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let lunges = db
            .add_exercise(&NewExercise::new("Lunges").with_goals(60, 140))
            .unwrap();

        // Sunday 2024-03-03 belongs to the previous ISO week
        for (d, count) in [(3, 100), (4, 70), (10, 70)] {
            db.record_log(lunges, count, day(2024, 3, d).and_hms_opt(9, 0, 0).unwrap(), None)
                .unwrap();
        }

        let week = GoalEvaluator::new(&db)
            .evaluate_week(day(2024, 3, 7).iso_week())
            .unwrap();
        assert_eq!(week[&lunges].total, 140);
        assert_eq!(week[&lunges].state, GoalState::Met);
    }

    #[test]
    fn test_raising_goal_reclassifies_past_days() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let id = db
            .add_exercise(&NewExercise::new("Crunches").with_goals(50, 0))
            .unwrap();
        let d = day(2024, 3, 4);
        db.record_log(id, 60, d.and_hms_opt(9, 0, 0).unwrap(), None).unwrap();

        let evaluator = GoalEvaluator::new(&db);
        assert!(evaluator.evaluate_day(d).unwrap()[&id].state.is_met());

        db.set_goal(id, Some(100), None).unwrap();
        assert_eq!(
            evaluator.evaluate_day(d).unwrap()[&id].state,
            GoalState::InProgress
        );
    }
}
