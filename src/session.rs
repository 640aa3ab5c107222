//! Session façade.
//!
//! The single entry point used by the CLI. A session owns the database
//! connection and the settings for one invocation and exposes every user
//! operation by exercise name.

use crate::exercises::types::{
    Exercise, ExerciseId, LogEntry, LogEntryId, NewExercise, RepRange, Tag,
};
use crate::goals::evaluator::{GoalEvaluator, GoalMap};
use crate::goals::types::GoalState;
use crate::metrics::aggregator::Aggregator;
use crate::metrics::range::DateRange;
use crate::metrics::types::{MonthlyTotal, ProgressOverview, StatsReport};
use crate::storage::config::{Settings, SettingsError};
use crate::storage::database::{Database, DatabaseError};
use crate::workouts::randomizer::Randomizer;
use crate::workouts::types::{DailyWorkoutPlan, PlanError, PlanLine};
use chrono::{Datelike, IsoWeek, Local, NaiveDate, NaiveDateTime};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Result of logging a set.
#[derive(Debug, Clone, PartialEq)]
pub struct LogOutcome {
    pub entry_id: LogEntryId,
    pub exercise: Exercise,
    /// The exercise's total for the day of the entry, including it
    pub daily_total: i64,
    /// Daily goal state after the entry
    pub goal_state: GoalState,
}

/// A log entry with the name of its exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub entry: LogEntry,
    pub exercise_name: String,
    pub unit: String,
}

/// One open database plus the settings it was opened with.
pub struct Session {
    db: Database,
    settings: Settings,
}

impl Session {
    /// Open the database named by the settings, seeding the starter
    /// exercises and tags into a new one.
    pub fn open(settings: Settings) -> Result<Self, SessionError> {
        let path = settings.database_path();
        let db = Database::open(&path)?;

        if db.count_exercises()? == 0 {
            db.seed_default_exercises()?;
        }
        if db.count_tags()? == 0 {
            db.seed_default_tags()?;
        }

        Ok(Self { db, settings })
    }

    /// A session over an empty in-memory database.
    pub fn open_in_memory(settings: Settings) -> Result<Self, SessionError> {
        Ok(Self {
            db: Database::open_in_memory()?,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Look up an active exercise by name.
    fn resolve(&self, name: &str) -> Result<Exercise, SessionError> {
        self.db
            .find_exercise_by_name(name)?
            .ok_or_else(|| DatabaseError::UnknownExercise(format!("'{}'", name.trim())).into())
    }

    fn resolve_tag(&self, name: &str) -> Result<Tag, SessionError> {
        self.db
            .find_tag_by_name(name)?
            .ok_or_else(|| DatabaseError::UnknownTag(format!("'{}'", name.trim())).into())
    }

    // ========== Logging ==========

    /// Log a set of `count` for the named exercise at the current time.
    pub fn log_reps(
        &self,
        name: &str,
        count: i64,
        note: Option<&str>,
    ) -> Result<LogOutcome, SessionError> {
        self.log_reps_at(name, count, note, Local::now().naive_local())
    }

    /// Log a set at an explicit local time.
    pub fn log_reps_at(
        &self,
        name: &str,
        count: i64,
        note: Option<&str>,
        logged_at: NaiveDateTime,
    ) -> Result<LogOutcome, SessionError> {
        let exercise = self.resolve(name)?;
        let entry_id = self.db.record_log(exercise.id, count, logged_at, note)?;
        let daily_total = Aggregator::new(&self.db).daily_total(exercise.id, logged_at.date())?;

        Ok(LogOutcome {
            entry_id,
            goal_state: GoalState::classify(daily_total, exercise.daily_goal),
            exercise,
            daily_total,
        })
    }

    /// Entries from the last `days` days, oldest first.
    pub fn recent_logs(&self, days: u32) -> Result<Vec<LogLine>, SessionError> {
        self.logs_in(None, self.last_days_range(days))
    }

    /// Entries in `range`, optionally for one exercise, oldest first.
    pub fn logs_in(
        &self,
        exercise: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<LogLine>, SessionError> {
        let exercise_id = match exercise {
            Some(name) => Some(self.resolve(name)?.id),
            None => None,
        };

        let names: HashMap<_, _> = self
            .db
            .list_exercises(true)?
            .into_iter()
            .map(|e| (e.id, (e.name, e.unit)))
            .collect();

        let mut lines = Vec::new();
        self.db
            .query_logs(exercise_id, range)
            .try_for_each(|entry| {
                let (name, unit) = names
                    .get(&entry.exercise_id)
                    .cloned()
                    .unwrap_or_else(|| (entry.exercise_id.to_string(), String::new()));
                lines.push(LogLine {
                    entry,
                    exercise_name: name,
                    unit,
                });
                Ok(())
            })?;

        Ok(lines)
    }

    pub fn correct_log(&self, id: LogEntryId, count: i64) -> Result<(), SessionError> {
        Ok(self.db.correct_log(id, count)?)
    }

    pub fn delete_log(&self, id: LogEntryId) -> Result<(), SessionError> {
        Ok(self.db.delete_log(id)?)
    }

    // ========== Statistics ==========

    /// The `days` days ending today.
    pub fn last_days_range(&self, days: u32) -> DateRange {
        DateRange::last_days(Self::today(), days)
    }

    pub fn get_stats(&self, range: DateRange) -> Result<StatsReport, SessionError> {
        Ok(Aggregator::new(&self.db).stats_report(range)?)
    }

    /// All-exercise totals for each of the last `days` days.
    pub fn daily_series(&self, days: u32) -> Result<Vec<(NaiveDate, i64)>, SessionError> {
        Ok(Aggregator::new(&self.db).daily_series(self.last_days_range(days))?)
    }

    pub fn progress_overview(&self) -> Result<ProgressOverview, SessionError> {
        Ok(Aggregator::new(&self.db).progress_overview(Self::today())?)
    }

    pub fn monthly_totals(&self, months: u32) -> Result<Vec<MonthlyTotal>, SessionError> {
        Ok(Aggregator::new(&self.db).monthly_totals(Self::today(), months)?)
    }

    // ========== Goals ==========

    pub fn get_goals_today(&self) -> Result<GoalMap, SessionError> {
        Ok(GoalEvaluator::new(&self.db).evaluate_today()?)
    }

    pub fn get_goals_this_week(&self) -> Result<GoalMap, SessionError> {
        Ok(GoalEvaluator::new(&self.db).evaluate_this_week()?)
    }

    pub fn get_goals_for_day(&self, date: NaiveDate) -> Result<GoalMap, SessionError> {
        Ok(GoalEvaluator::new(&self.db).evaluate_day(date)?)
    }

    pub fn get_goals_for_week(&self, week: IsoWeek) -> Result<GoalMap, SessionError> {
        Ok(GoalEvaluator::new(&self.db).evaluate_week(week)?)
    }

    /// Update the named exercise's goals. `None` keeps the current value.
    pub fn set_goal(
        &self,
        name: &str,
        daily: Option<u32>,
        weekly: Option<u32>,
    ) -> Result<Exercise, SessionError> {
        let exercise = self.resolve(name)?;
        self.db.set_goal(exercise.id, daily, weekly)?;
        self.reload(&exercise)
    }

    // ========== Workouts ==========

    /// Today's workout, drawn once and then reused until `force` is set.
    pub fn randomize_today(&self, force: bool) -> Result<DailyWorkoutPlan, SessionError> {
        self.randomize_for(Self::today(), force, &mut rand::thread_rng())
    }

    pub fn randomize_for<R: Rng>(
        &self,
        date: NaiveDate,
        force: bool,
        rng: &mut R,
    ) -> Result<DailyWorkoutPlan, SessionError> {
        Ok(Randomizer::new(&self.db, &self.settings).plan_for(date, force, rng)?)
    }

    /// The stored plan for a day, if one was drawn.
    pub fn stored_plan(&self, date: NaiveDate) -> Result<Option<DailyWorkoutPlan>, SessionError> {
        Ok(self.db.get_plan(date)?)
    }

    /// Add the named exercise to today's workout.
    pub fn add_to_plan(
        &self,
        name: &str,
        target: Option<u32>,
    ) -> Result<DailyWorkoutPlan, SessionError> {
        self.add_to_plan_for(Self::today(), name, target, &mut rand::thread_rng())
    }

    pub fn add_to_plan_for<R: Rng>(
        &self,
        date: NaiveDate,
        name: &str,
        target: Option<u32>,
        rng: &mut R,
    ) -> Result<DailyWorkoutPlan, SessionError> {
        let exercise = self.resolve(name)?;
        Ok(Randomizer::new(&self.db, &self.settings).add_exercise(date, &exercise, target, rng)?)
    }

    /// Remove the named exercise from today's workout.
    pub fn remove_from_plan(&self, name: &str) -> Result<DailyWorkoutPlan, SessionError> {
        self.remove_from_plan_for(Self::today(), name)
    }

    pub fn remove_from_plan_for(
        &self,
        date: NaiveDate,
        name: &str,
    ) -> Result<DailyWorkoutPlan, SessionError> {
        let exercise = self.resolve(name)?;
        Ok(Randomizer::new(&self.db, &self.settings).remove_exercise(date, &exercise)?)
    }

    /// Active exercises that could still be added to today's workout.
    pub fn plan_candidates(&self) -> Result<Vec<Exercise>, SessionError> {
        Ok(Randomizer::new(&self.db, &self.settings).candidates(Self::today())?)
    }

    /// Resolve a plan's exercises and pair each with what was logged on the
    /// plan's day. Exercises that no longer exist are skipped.
    pub fn plan_progress(&self, plan: &DailyWorkoutPlan) -> Result<Vec<PlanLine>, SessionError> {
        let aggregator = Aggregator::new(&self.db);
        let mut lines = Vec::with_capacity(plan.len());

        for planned in &plan.entries {
            let Some(exercise) = self.db.get_exercise(planned.exercise_id)? else {
                tracing::warn!(id = planned.exercise_id.0, "Planned exercise no longer exists");
                continue;
            };
            lines.push(PlanLine {
                logged: aggregator.daily_total(exercise.id, plan.date)?,
                target_count: planned.target_count,
                exercise,
            });
        }

        Ok(lines)
    }

    // ========== Exercises ==========

    pub fn add_exercise(&self, exercise: &NewExercise) -> Result<Exercise, SessionError> {
        let id = self.db.add_exercise(exercise)?;
        self.db
            .get_exercise(id)?
            .ok_or_else(|| DatabaseError::NotFound(format!("Exercise {}", id)).into())
    }

    pub fn list_exercises(&self, include_inactive: bool) -> Result<Vec<Exercise>, SessionError> {
        Ok(self.db.list_exercises(include_inactive)?)
    }

    pub fn set_rep_range(
        &self,
        name: &str,
        range: Option<RepRange>,
    ) -> Result<Exercise, SessionError> {
        let exercise = self.resolve(name)?;
        self.db.set_rep_range(exercise.id, range)?;
        self.reload(&exercise)
    }

    pub fn set_randomizable(&self, name: &str, randomizable: bool) -> Result<Exercise, SessionError> {
        let exercise = self.resolve(name)?;
        self.db.set_randomizable(exercise.id, randomizable)?;
        self.reload(&exercise)
    }

    /// Retire the named exercise. Its history stays in the statistics.
    pub fn deactivate_exercise(&self, name: &str) -> Result<Exercise, SessionError> {
        let exercise = self.resolve(name)?;
        self.db.deactivate_exercise(exercise.id)?;
        self.reload(&exercise)
    }

    // ========== Tags ==========

    /// Create a tag; `None` picks the default colour.
    pub fn add_tag(&self, name: &str, color: Option<&str>) -> Result<Tag, SessionError> {
        self.db.add_tag(name, color)?;
        self.resolve_tag(name)
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>, SessionError> {
        Ok(self.db.list_tags()?)
    }

    pub fn set_tag_color(&self, name: &str, color: &str) -> Result<Tag, SessionError> {
        let tag = self.resolve_tag(name)?;
        self.db.set_tag_color(tag.id, color)?;
        self.resolve_tag(name)
    }

    /// Replace the named exercise's tags. Unknown tags are created.
    pub fn tag_exercise(&self, name: &str, tags: &[&str]) -> Result<Vec<Tag>, SessionError> {
        let exercise = self.resolve(name)?;
        Ok(self.db.set_exercise_tags(exercise.id, tags)?)
    }

    /// Active exercises carrying the named tag.
    pub fn exercises_by_tag(&self, tag: &str) -> Result<Vec<Exercise>, SessionError> {
        let tag = self.resolve_tag(tag)?;
        Ok(self.db.exercises_by_tag(tag.id)?)
    }

    pub fn tags_by_exercise(&self) -> Result<BTreeMap<ExerciseId, Vec<Tag>>, SessionError> {
        Ok(self.db.tags_by_exercise()?)
    }

    fn reload(&self, exercise: &Exercise) -> Result<Exercise, SessionError> {
        self.db
            .get_exercise(exercise.id)?
            .ok_or_else(|| DatabaseError::UnknownExercise(exercise.id.to_string()).into())
    }

    /// ISO week of today, for labelling weekly views.
    pub fn current_week(&self) -> IsoWeek {
        Self::today().iso_week()
    }
}

/// Broad category of a session failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input: bad count, empty name, future timestamp, bad range
    Validation,
    /// Unknown exercise, tag, log entry or planned exercise
    NotFound,
    /// Duplicate exercise or tag name, or an exercise planned twice
    Conflict,
    /// Nothing eligible to randomize
    EmptyPool,
    /// Database, IO or serialization failure
    Storage,
}

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Database(e) => database_kind(e),
            SessionError::Plan(PlanError::EmptyPool) => ErrorKind::EmptyPool,
            SessionError::Plan(PlanError::AlreadyPlanned(_)) => ErrorKind::Conflict,
            SessionError::Plan(PlanError::NotPlanned(_)) => ErrorKind::NotFound,
            SessionError::Plan(PlanError::InvalidTarget) => ErrorKind::Validation,
            SessionError::Plan(PlanError::Storage(e)) => database_kind(e),
            SessionError::Settings(SettingsError::UnknownKey(_))
            | SessionError::Settings(SettingsError::InvalidValue { .. }) => ErrorKind::Validation,
            SessionError::Settings(_) => ErrorKind::Storage,
        }
    }
}

fn database_kind(error: &DatabaseError) -> ErrorKind {
    match error {
        DatabaseError::InvalidCount(_) | DatabaseError::InvalidInput(_) => ErrorKind::Validation,
        DatabaseError::UnknownExercise(_)
        | DatabaseError::UnknownTag(_)
        | DatabaseError::NotFound(_) => ErrorKind::NotFound,
        DatabaseError::DuplicateName(_) | DatabaseError::DuplicateTag(_) => ErrorKind::Conflict,
        _ => ErrorKind::Storage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Session {
        let session = Session::open_in_memory(Settings::default()).expect("Failed to open session");
        session.database().seed_default_exercises().unwrap();
        session.database().seed_default_tags().unwrap();
        session
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_log_reps_reports_daily_total() {
        let session = session();

        let first = session.log_reps_at("pushups", 20, None, at(2024, 3, 4, 8)).unwrap();
        assert_eq!(first.daily_total, 20);
        assert_eq!(first.goal_state, GoalState::InProgress);

        let second = session
            .log_reps_at("Pushups", 35, Some("after lunch"), at(2024, 3, 4, 13))
            .unwrap();
        assert_eq!(second.exercise.name, "Pushups");
        assert_eq!(second.daily_total, 55);
        assert_eq!(second.goal_state, GoalState::Met);
    }

    #[test]
    fn test_error_kinds() {
        let session = session();

        let unknown = session.log_reps("Handstands", 5, None).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::NotFound);

        let invalid = session.log_reps("Squats", 0, None).unwrap_err();
        assert_eq!(invalid.kind(), ErrorKind::Validation);

        let duplicate = session.add_exercise(&NewExercise::new("PUSHUPS")).unwrap_err();
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);

        let missing = session.delete_log(LogEntryId(404)).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_empty_pool_kind() {
        let session = Session::open_in_memory(Settings::default()).unwrap();
        let err = session
            .randomize_for(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), false, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyPool);
    }

    #[test]
    fn test_plan_progress_tracks_logged_reps() {
        let session = session();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let plan = session
            .randomize_for(date, false, &mut StdRng::seed_from_u64(11))
            .unwrap();
        let first = plan.entries[0];
        let name = session
            .database()
            .get_exercise(first.exercise_id)
            .unwrap()
            .unwrap()
            .name;

        session
            .log_reps_at(&name, i64::from(first.target_count), None, at(2024, 3, 4, 9))
            .unwrap();

        let lines = session.plan_progress(&plan).unwrap();
        assert_eq!(lines.len(), plan.len());
        assert!(lines[0].is_complete());
        assert!(lines[1..].iter().all(|line| !line.is_complete()));
    }

    #[test]
    fn test_log_reps_folds_non_ascii_names() {
        let session = session();
        session.add_exercise(&NewExercise::new("Übungen")).unwrap();

        let outcome = session.log_reps_at("übungen", 12, None, at(2024, 3, 4, 8)).unwrap();
        assert_eq!(outcome.exercise.name, "Übungen");
        assert_eq!(outcome.daily_total, 12);

        let duplicate = session.add_exercise(&NewExercise::new("ÜBUNGEN")).unwrap_err();
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_tag_exercise_and_filter() {
        let session = session();

        let tags = session.tag_exercise("squats", &["Quads", "Glutes", "Back"]).unwrap();
        assert_eq!(tags.len(), 3);

        let back: Vec<_> = session
            .exercises_by_tag("back")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(back, vec!["Squats"]);

        let grip = session.add_tag("Grip", None).unwrap();
        assert_eq!(grip.color, crate::exercises::types::DEFAULT_TAG_COLOR);
        let recoloured = session.set_tag_color("grip", "#112233").unwrap();
        assert_eq!(recoloured.id, grip.id);
        assert_eq!(recoloured.color, "#112233");

        let duplicate = session.add_tag("GRIP", None).unwrap_err();
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);
        let unknown = session.exercises_by_tag("Forearms").unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::NotFound);
        let bad_colour = session.set_tag_color("Grip", "blue").unwrap_err();
        assert_eq!(bad_colour.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_plan_edits_rewrite_stored_plan() {
        let session = session();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(21);

        let drawn = session.randomize_for(date, false, &mut rng).unwrap();
        let outside = session
            .list_exercises(false)
            .unwrap()
            .into_iter()
            .find(|e| !drawn.contains(e.id))
            .unwrap();

        let added = session
            .add_to_plan_for(date, &outside.name, Some(40), &mut rng)
            .unwrap();
        assert_eq!(added.len(), drawn.len() + 1);
        assert_eq!(session.stored_plan(date).unwrap().unwrap().entries, added.entries);

        let again = session
            .add_to_plan_for(date, &outside.name, None, &mut rng)
            .unwrap_err();
        assert_eq!(again.kind(), ErrorKind::Conflict);

        let removed = session.remove_from_plan_for(date, &outside.name).unwrap();
        assert_eq!(removed.entries, drawn.entries);
        assert_eq!(session.stored_plan(date).unwrap().unwrap().entries, drawn.entries);

        let missing = session.remove_from_plan_for(date, &outside.name).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        let zero = session
            .add_to_plan_for(date, &outside.name, Some(0), &mut rng)
            .unwrap_err();
        assert_eq!(zero.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_deactivated_exercise_cannot_be_logged() {
        let session = session();
        session.deactivate_exercise("Crunches").unwrap();

        let err = session.log_reps("Crunches", 10, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(session
            .list_exercises(false)
            .unwrap()
            .iter()
            .all(|e| e.name != "Crunches"));
    }
}
