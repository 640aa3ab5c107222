//! Database operations using rusqlite.
//!
//! Every write is a single autocommitted statement (or an explicit
//! transaction), so it is durable by the time the call returns.

use crate::exercises::catalogue::{default_catalogue, default_tag_links, default_tags};
use crate::exercises::types::{
    name_key, parse_hex_color, DailyTotal, Exercise, ExerciseId, LogEntry, LogEntryId,
    NewExercise, RepRange, Tag, TagId, DEFAULT_TAG_COLOR, DEFAULT_UNIT,
};
use crate::metrics::range::DateRange;
use crate::storage::schema::{
    CURRENT_VERSION, DATE_FORMAT, MIGRATION_V1_TO_V2, NAME_KEY_INDEX, SCHEMA,
    SCHEMA_VERSION_TABLE, TIMESTAMP_FORMAT,
};
use crate::workouts::types::{DailyWorkoutPlan, PlannedExercise};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const EXERCISE_COLUMNS: &str = "id, name, description, unit, daily_goal, weekly_goal, active,
     randomizable, rep_min, rep_max, created_at";

const LOG_COLUMNS: &str = "id, exercise_id, count, logged_at, note";

const TAG_COLUMNS: &str = "id, name, color";

/// Bind parameters shared by the range queries: start day, end day, exercise filter.
macro_rules! range_params {
    ($exercise_id:expr, $range:expr) => {
        params![
            $range.start().format(DATE_FORMAT).to_string(),
            $range.end().format(DATE_FORMAT).to_string(),
            $exercise_id.map(|id: ExerciseId| id.0),
        ]
    };
}

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::IoError(e.to_string()))?;
            }
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        tracing::debug!(path = %path.display(), "Opened database");
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            self.record_version(1)?;
        }

        if from_version < 2 {
            let tx = self
                .conn
                .unchecked_transaction()
                .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

            self.conn
                .execute_batch(MIGRATION_V1_TO_V2)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            self.fill_name_keys()?;
            // Fails if two active names only differed by non-ASCII case.
            self.conn
                .execute_batch(NAME_KEY_INDEX)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            self.record_version(2)?;

            tx.commit()
                .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        }

        tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        Ok(())
    }

    fn record_version(&self, version: i32) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                [version],
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Compute `name_key` for rows created before the column existed.
    fn fill_name_keys(&self) -> Result<(), DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM exercises")
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row.map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?);
        }

        for (id, name) in &names {
            self.conn
                .execute(
                    "UPDATE exercises SET name_key = ?2 WHERE id = ?1",
                    params![id, name_key(name)],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        }

        tracing::debug!(rows = names.len(), "Filled exercise name keys");
        Ok(())
    }

    // ========== Exercise Operations ==========

    /// Insert a new exercise.
    ///
    /// Fails with [`DatabaseError::DuplicateName`] if an active exercise
    /// already uses the name, compared by [`name_key`].
    pub fn add_exercise(&self, exercise: &NewExercise) -> Result<ExerciseId, DatabaseError> {
        let name = exercise.name.trim();
        if name.is_empty() {
            return Err(DatabaseError::InvalidInput(
                "Exercise name must not be empty".to_string(),
            ));
        }

        let unit = match exercise.unit.trim() {
            "" => DEFAULT_UNIT,
            unit => unit,
        };

        if let Some(range) = exercise.rep_range {
            if !range.is_valid() {
                return Err(DatabaseError::InvalidInput(format!(
                    "Invalid rep range {}",
                    range
                )));
            }
        }

        if self.find_exercise_by_name(name)?.is_some() {
            return Err(DatabaseError::DuplicateName(name.to_string()));
        }

        self.conn
            .execute(
                "INSERT INTO exercises (name, name_key, description, unit, daily_goal,
                 weekly_goal, active, randomizable, rep_min, rep_max, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8, ?9, ?10)",
                params![
                    name,
                    name_key(name),
                    exercise.description.trim(),
                    unit,
                    exercise.daily_goal,
                    exercise.weekly_goal,
                    exercise.randomizable,
                    exercise.rep_range.map(|r| r.min),
                    exercise.rep_range.map(|r| r.max),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let id = ExerciseId(self.conn.last_insert_rowid());
        tracing::info!(exercise = name, id = id.0, "Added exercise");

        Ok(id)
    }

    /// Get an exercise by ID, active or not.
    pub fn get_exercise(&self, id: ExerciseId) -> Result<Option<Exercise>, DatabaseError> {
        let sql = format!("SELECT {} FROM exercises WHERE id = ?1", EXERCISE_COLUMNS);

        let row = self
            .conn
            .query_row(&sql, params![id.0], ExerciseRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(ExerciseRow::into_exercise).transpose()
    }

    /// Find an active exercise by name, ignoring case and surrounding whitespace.
    pub fn find_exercise_by_name(&self, name: &str) -> Result<Option<Exercise>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM exercises WHERE name_key = ?1 AND active = 1",
            EXERCISE_COLUMNS
        );

        let row = self
            .conn
            .query_row(&sql, params![name_key(name)], ExerciseRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(ExerciseRow::into_exercise).transpose()
    }

    /// List exercises ordered by name.
    pub fn list_exercises(&self, include_inactive: bool) -> Result<Vec<Exercise>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM exercises
             WHERE ?1 OR active = 1
             ORDER BY name_key, id",
            EXERCISE_COLUMNS
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![include_inactive], ExerciseRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut exercises = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            exercises.push(row.into_exercise()?);
        }

        Ok(exercises)
    }

    /// Count all exercises, including inactive ones.
    pub fn count_exercises(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }

    /// Update goal fields. `None` leaves the corresponding goal unchanged.
    ///
    /// No goal history is kept: later evaluations of past periods use the
    /// new values.
    pub fn set_goal(
        &self,
        id: ExerciseId,
        daily_goal: Option<u32>,
        weekly_goal: Option<u32>,
    ) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE exercises
                 SET daily_goal = COALESCE(?2, daily_goal),
                     weekly_goal = COALESCE(?3, weekly_goal)
                 WHERE id = ?1",
                params![id.0, daily_goal, weekly_goal],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::UnknownExercise(id.to_string()));
        }

        tracing::info!(id = id.0, ?daily_goal, ?weekly_goal, "Updated goals");
        Ok(())
    }

    /// Set or clear the per-exercise randomizer range.
    pub fn set_rep_range(
        &self,
        id: ExerciseId,
        range: Option<RepRange>,
    ) -> Result<(), DatabaseError> {
        if let Some(range) = range {
            if !range.is_valid() {
                return Err(DatabaseError::InvalidInput(format!(
                    "Invalid rep range {}",
                    range
                )));
            }
        }

        let rows_affected = self
            .conn
            .execute(
                "UPDATE exercises SET rep_min = ?2, rep_max = ?3 WHERE id = ?1",
                params![id.0, range.map(|r| r.min), range.map(|r| r.max)],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::UnknownExercise(id.to_string()));
        }

        Ok(())
    }

    /// Opt an exercise in or out of the randomizer pool.
    pub fn set_randomizable(&self, id: ExerciseId, randomizable: bool) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE exercises SET randomizable = ?2 WHERE id = ?1",
                params![id.0, randomizable],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::UnknownExercise(id.to_string()));
        }

        Ok(())
    }

    /// Soft-delete an exercise. Its log history is kept.
    pub fn deactivate_exercise(&self, id: ExerciseId) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE exercises SET active = 0 WHERE id = ?1",
                params![id.0],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::UnknownExercise(id.to_string()));
        }

        tracing::info!(id = id.0, "Deactivated exercise");
        Ok(())
    }

    /// Insert the starter catalogue, skipping names that already exist.
    ///
    /// Returns the number of exercises inserted.
    pub fn seed_default_exercises(&self) -> Result<usize, DatabaseError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        let mut inserted = 0;
        for exercise in default_catalogue() {
            if self.find_exercise_by_name(&exercise.name)?.is_none() {
                self.add_exercise(&exercise)?;
                inserted += 1;
            }
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::info!(inserted, "Seeded default exercises");
        Ok(inserted)
    }

    // ========== Tag Operations ==========

    /// Create a tag. `None` uses [`DEFAULT_TAG_COLOR`].
    pub fn add_tag(&self, name: &str, color: Option<&str>) -> Result<TagId, DatabaseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatabaseError::InvalidInput(
                "Tag name must not be empty".to_string(),
            ));
        }

        let color = checked_color(color.unwrap_or(DEFAULT_TAG_COLOR))?;

        if self.find_tag_by_name(name)?.is_some() {
            return Err(DatabaseError::DuplicateTag(name.to_string()));
        }

        self.conn
            .execute(
                "INSERT INTO tags (name, name_key, color) VALUES (?1, ?2, ?3)",
                params![name, name_key(name), color],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let id = TagId(self.conn.last_insert_rowid());
        tracing::info!(tag = name, id = id.0, "Added tag");

        Ok(id)
    }

    /// Find a tag by name, ignoring case and surrounding whitespace.
    pub fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, DatabaseError> {
        let sql = format!("SELECT {} FROM tags WHERE name_key = ?1", TAG_COLUMNS);

        self.conn
            .query_row(&sql, params![name_key(name)], tag_from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    /// All tags in creation order.
    pub fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        let sql = format!("SELECT {} FROM tags ORDER BY id", TAG_COLUMNS);
        self.collect_tags(&sql, params![])
    }

    pub fn count_tags(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }

    pub fn set_tag_color(&self, id: TagId, color: &str) -> Result<(), DatabaseError> {
        let color = checked_color(color)?;

        let rows_affected = self
            .conn
            .execute(
                "UPDATE tags SET color = ?2 WHERE id = ?1",
                params![id.0, color],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Tag {}", id)));
        }

        tracing::info!(id = id.0, color = %color, "Updated tag colour");
        Ok(())
    }

    /// Replace an exercise's tags with the named ones, creating unknown tags
    /// with the default colour. An empty list clears the tags.
    pub fn set_exercise_tags(
        &self,
        exercise_id: ExerciseId,
        names: &[&str],
    ) -> Result<Vec<Tag>, DatabaseError> {
        if self.get_exercise(exercise_id)?.is_none() {
            return Err(DatabaseError::UnknownExercise(exercise_id.to_string()));
        }

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        self.conn
            .execute(
                "DELETE FROM exercise_tags WHERE exercise_id = ?1",
                params![exercise_id.0],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        self.link_tags(exercise_id, names)?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::info!(exercise_id = exercise_id.0, tags = names.len(), "Updated exercise tags");
        self.tags_for_exercise(exercise_id)
    }

    /// Add links without touching existing ones. Runs inside the caller's
    /// transaction.
    fn link_tags(&self, exercise_id: ExerciseId, names: &[&str]) -> Result<(), DatabaseError> {
        for name in names {
            let tag_id = match self.find_tag_by_name(name)? {
                Some(tag) => tag.id,
                None => self.add_tag(name, None)?,
            };

            self.conn
                .execute(
                    "INSERT OR IGNORE INTO exercise_tags (exercise_id, tag_id) VALUES (?1, ?2)",
                    params![exercise_id.0, tag_id.0],
                )
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// Tags of one exercise in creation order.
    pub fn tags_for_exercise(&self, exercise_id: ExerciseId) -> Result<Vec<Tag>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM tags
             WHERE id IN (SELECT tag_id FROM exercise_tags WHERE exercise_id = ?1)
             ORDER BY id",
            TAG_COLUMNS
        );
        self.collect_tags(&sql, params![exercise_id.0])
    }

    /// Tags of every tagged exercise, for table views.
    pub fn tags_by_exercise(&self) -> Result<BTreeMap<ExerciseId, Vec<Tag>>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT t.id, t.name, t.color, et.exercise_id
                 FROM exercise_tags et
                 JOIN tags t ON t.id = et.tag_id
                 ORDER BY et.exercise_id, t.id",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| Ok((ExerciseId(row.get(3)?), tag_from_row(row)?)))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut map: BTreeMap<ExerciseId, Vec<Tag>> = BTreeMap::new();
        for row in rows {
            let (exercise_id, tag) = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            map.entry(exercise_id).or_default().push(tag);
        }

        Ok(map)
    }

    /// Active exercises carrying a tag, ordered by name.
    pub fn exercises_by_tag(&self, tag_id: TagId) -> Result<Vec<Exercise>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM exercises
             WHERE active = 1
               AND id IN (SELECT exercise_id FROM exercise_tags WHERE tag_id = ?1)
             ORDER BY name_key, id",
            EXERCISE_COLUMNS
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![tag_id.0], ExerciseRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut exercises = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            exercises.push(row.into_exercise()?);
        }

        Ok(exercises)
    }

    /// Insert the starter tags and tag the starter exercises that exist and
    /// have no tags yet.
    ///
    /// Returns the number of tags inserted.
    pub fn seed_default_tags(&self) -> Result<usize, DatabaseError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        let mut inserted = 0;
        for &(name, color) in default_tags() {
            if self.find_tag_by_name(name)?.is_none() {
                self.add_tag(name, Some(color))?;
                inserted += 1;
            }
        }

        for &(exercise, tags) in default_tag_links() {
            let Some(exercise) = self.find_exercise_by_name(exercise)? else {
                continue;
            };
            if self.tags_for_exercise(exercise.id)?.is_empty() {
                self.link_tags(exercise.id, tags)?;
            }
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::info!(inserted, "Seeded default tags");
        Ok(inserted)
    }

    fn collect_tags<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Tag>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params, tag_from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(tags)
    }

    // ========== Log Operations ==========

    /// Record a set of an exercise.
    ///
    /// The exercise must exist and be active, `count` must be positive, and
    /// `logged_at` must not be later than the current local time.
    pub fn record_log(
        &self,
        exercise_id: ExerciseId,
        count: i64,
        logged_at: NaiveDateTime,
        note: Option<&str>,
    ) -> Result<LogEntryId, DatabaseError> {
        if count <= 0 {
            return Err(DatabaseError::InvalidCount(count));
        }

        let active: Option<bool> = self
            .conn
            .query_row(
                "SELECT active FROM exercises WHERE id = ?1",
                params![exercise_id.0],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if active != Some(true) {
            return Err(DatabaseError::UnknownExercise(exercise_id.to_string()));
        }

        if logged_at > Local::now().naive_local() {
            return Err(DatabaseError::InvalidInput(format!(
                "Timestamp {} is in the future",
                logged_at.format(TIMESTAMP_FORMAT)
            )));
        }

        let note = note.map(str::trim).filter(|n| !n.is_empty());

        self.conn
            .execute(
                "INSERT INTO logs (exercise_id, count, logged_at, note) VALUES (?1, ?2, ?3, ?4)",
                params![
                    exercise_id.0,
                    count,
                    logged_at.format(TIMESTAMP_FORMAT).to_string(),
                    note,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let id = LogEntryId(self.conn.last_insert_rowid());
        tracing::info!(id = id.0, exercise_id = exercise_id.0, count, "Recorded log entry");

        Ok(id)
    }

    /// Get a log entry by ID.
    pub fn get_log(&self, id: LogEntryId) -> Result<Option<LogEntry>, DatabaseError> {
        let sql = format!("SELECT {} FROM logs WHERE id = ?1", LOG_COLUMNS);

        let row = self
            .conn
            .query_row(&sql, params![id.0], LogRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(LogRow::into_entry).transpose()
    }

    /// Correct the count of an existing log entry.
    pub fn correct_log(&self, id: LogEntryId, count: i64) -> Result<(), DatabaseError> {
        if count <= 0 {
            return Err(DatabaseError::InvalidCount(count));
        }

        let rows_affected = self
            .conn
            .execute(
                "UPDATE logs SET count = ?2 WHERE id = ?1",
                params![id.0, count],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Log entry {}", id)));
        }

        tracing::info!(id = id.0, count, "Corrected log entry");
        Ok(())
    }

    /// Delete a log entry.
    pub fn delete_log(&self, id: LogEntryId) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM logs WHERE id = ?1", params![id.0])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Log entry {}", id)));
        }

        tracing::info!(id = id.0, "Deleted log entry");
        Ok(())
    }

    /// Build a query over log entries in `range`, optionally for one exercise.
    ///
    /// Nothing is executed until the returned query is consumed, and every
    /// consumption runs the query afresh.
    pub fn query_logs(&self, exercise_id: Option<ExerciseId>, range: DateRange) -> LogQuery<'_> {
        LogQuery {
            conn: &self.conn,
            exercise_id,
            range,
        }
    }

    /// Sum of counts per exercise per calendar day within `range`.
    ///
    /// Days without entries are omitted. Ordered by day, then exercise.
    pub fn daily_totals(
        &self,
        exercise_id: Option<ExerciseId>,
        range: DateRange,
    ) -> Result<Vec<DailyTotal>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT exercise_id, date(logged_at) AS day, SUM(count)
                 FROM logs
                 WHERE date(logged_at) BETWEEN ?1 AND ?2
                   AND (?3 IS NULL OR exercise_id = ?3)
                 GROUP BY exercise_id, day
                 ORDER BY day, exercise_id",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(range_params!(exercise_id, range), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut totals = Vec::new();
        for row in rows {
            let (exercise_id, day, total) =
                row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            totals.push(DailyTotal {
                exercise_id: ExerciseId(exercise_id),
                date: parse_date(&day)?,
                total,
            });
        }

        Ok(totals)
    }

    /// Sum of all counts within `range`, optionally for one exercise.
    pub fn total_count(
        &self,
        exercise_id: Option<ExerciseId>,
        range: DateRange,
    ) -> Result<i64, DatabaseError> {
        self.conn
            .query_row(
                "SELECT COALESCE(SUM(count), 0)
                 FROM logs
                 WHERE date(logged_at) BETWEEN ?1 AND ?2
                   AND (?3 IS NULL OR exercise_id = ?3)",
                range_params!(exercise_id, range),
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    // ========== Workout Plan Operations ==========

    /// Load the stored plan for a day.
    pub fn get_plan(&self, date: NaiveDate) -> Result<Option<DailyWorkoutPlan>, DatabaseError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT entries_json, generated_at FROM workout_plans WHERE plan_date = ?1",
                params![date.format(DATE_FORMAT).to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let Some((entries_json, generated_at)) = row else {
            return Ok(None);
        };

        let entries: Vec<PlannedExercise> = serde_json::from_str(&entries_json)
            .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?;

        Ok(Some(DailyWorkoutPlan {
            date,
            entries,
            generated_at: parse_rfc3339(&generated_at)?,
        }))
    }

    /// Store a plan, replacing any plan already stored for its day.
    pub fn save_plan(&self, plan: &DailyWorkoutPlan) -> Result<(), DatabaseError> {
        let entries_json = serde_json::to_string(&plan.entries)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO workout_plans (plan_date, entries_json, generated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(plan_date) DO UPDATE SET
                     entries_json = excluded.entries_json,
                     generated_at = excluded.generated_at",
                params![
                    plan.date.format(DATE_FORMAT).to_string(),
                    entries_json,
                    plan.generated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        tracing::info!(date = %plan.date, exercises = plan.entries.len(), "Saved workout plan");
        Ok(())
    }
}

/// A lazy, restartable query over log entries.
///
/// Rows are streamed from SQLite in timestamp order (ties broken by id).
#[derive(Clone, Copy)]
pub struct LogQuery<'a> {
    conn: &'a Connection,
    exercise_id: Option<ExerciseId>,
    range: DateRange,
}

impl<'a> LogQuery<'a> {
    /// Run the query, feeding each entry to `f` as it is read.
    ///
    /// Stops at the first error returned by `f`.
    pub fn try_for_each<F>(&self, mut f: F) -> Result<(), DatabaseError>
    where
        F: FnMut(LogEntry) -> Result<(), DatabaseError>,
    {
        let sql = format!(
            "SELECT {} FROM logs
             WHERE date(logged_at) BETWEEN ?1 AND ?2
               AND (?3 IS NULL OR exercise_id = ?3)
             ORDER BY logged_at ASC, id ASC",
            LOG_COLUMNS
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut rows = stmt
            .query(range_params!(self.exercise_id, self.range))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        while let Some(row) = rows
            .next()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
        {
            let entry = LogRow::from_row(row)
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
                .into_entry()?;
            f(entry)?;
        }

        Ok(())
    }

    /// Run the query and collect every entry.
    pub fn collect_entries(&self) -> Result<Vec<LogEntry>, DatabaseError> {
        let mut entries = Vec::new();
        self.try_for_each(|entry| {
            entries.push(entry);
            Ok(())
        })?;
        Ok(entries)
    }
}

/// Validate a "#rrggbb" colour and normalise it to lowercase.
fn checked_color(color: &str) -> Result<String, DatabaseError> {
    let color = color.trim();
    if parse_hex_color(color).is_none() {
        return Err(DatabaseError::InvalidInput(format!(
            "Invalid colour '{}', expected #rrggbb",
            color
        )));
    }
    Ok(color.to_lowercase())
}

/// Read a tag from the first three columns of a row.
fn tag_from_row(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: TagId(row.get(0)?),
        name: row.get(1)?,
        color: row.get(2)?,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DatabaseError::DeserializationError(format!("date '{}': {}", value, e)))
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("timestamp '{}': {}", value, e)))
}

/// Internal struct for reading exercise rows.
struct ExerciseRow {
    id: i64,
    name: String,
    description: String,
    unit: String,
    daily_goal: u32,
    weekly_goal: u32,
    active: bool,
    randomizable: bool,
    rep_min: Option<u32>,
    rep_max: Option<u32>,
    created_at: String,
}

impl ExerciseRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            unit: row.get(3)?,
            daily_goal: row.get(4)?,
            weekly_goal: row.get(5)?,
            active: row.get(6)?,
            randomizable: row.get(7)?,
            rep_min: row.get(8)?,
            rep_max: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    fn into_exercise(self) -> Result<Exercise, DatabaseError> {
        let rep_range = match (self.rep_min, self.rep_max) {
            (Some(min), Some(max)) => Some(
                RepRange::new(min, max)
                    .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(Exercise {
            id: ExerciseId(self.id),
            name: self.name,
            description: self.description,
            unit: self.unit,
            daily_goal: self.daily_goal,
            weekly_goal: self.weekly_goal,
            active: self.active,
            randomizable: self.randomizable,
            rep_range,
            created_at: parse_rfc3339(&self.created_at)?,
        })
    }
}

/// Internal struct for reading log rows.
struct LogRow {
    id: i64,
    exercise_id: i64,
    count: i64,
    logged_at: String,
    note: Option<String>,
}

impl LogRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            exercise_id: row.get(1)?,
            count: row.get(2)?,
            logged_at: row.get(3)?,
            note: row.get(4)?,
        })
    }

    fn into_entry(self) -> Result<LogEntry, DatabaseError> {
        let logged_at = NaiveDateTime::parse_from_str(&self.logged_at, TIMESTAMP_FORMAT)
            .map_err(|e| {
                DatabaseError::DeserializationError(format!("timestamp '{}': {}", self.logged_at, e))
            })?;

        Ok(LogEntry {
            id: LogEntryId(self.id),
            exercise_id: ExerciseId(self.exercise_id),
            count: self.count,
            logged_at,
            note: self.note,
        })
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("An exercise named '{0}' already exists")]
    DuplicateName(String),

    #[error("A tag named '{0}' already exists")]
    DuplicateTag(String),

    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    #[error("Count must be a positive number, got {0}")]
    InvalidCount(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
