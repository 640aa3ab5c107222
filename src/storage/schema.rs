//! Database schema definitions for heraclis.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Exercises table
CREATE TABLE IF NOT EXISTS exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    unit TEXT NOT NULL DEFAULT 'reps',
    daily_goal INTEGER NOT NULL DEFAULT 0 CHECK (daily_goal >= 0),
    weekly_goal INTEGER NOT NULL DEFAULT 0 CHECK (weekly_goal >= 0),
    active INTEGER NOT NULL DEFAULT 1,
    randomizable INTEGER NOT NULL DEFAULT 0,
    rep_min INTEGER,
    rep_max INTEGER,
    created_at TEXT NOT NULL,
    CHECK ((rep_min IS NULL AND rep_max IS NULL)
        OR (rep_min >= 1 AND rep_max >= rep_min))
);

-- Replaced by idx_exercises_active_name_key in v2.
CREATE UNIQUE INDEX IF NOT EXISTS idx_exercises_active_name
    ON exercises(name COLLATE NOCASE) WHERE active = 1;

-- Logged sets table
CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE RESTRICT,
    count INTEGER NOT NULL CHECK (count > 0),
    logged_at TEXT NOT NULL,
    note TEXT
);

CREATE INDEX IF NOT EXISTS idx_logs_logged_at ON logs(logged_at);
CREATE INDEX IF NOT EXISTS idx_logs_exercise_logged_at ON logs(exercise_id, logged_at);

-- Daily workout plans, one row per calendar day
CREATE TABLE IF NOT EXISTS workout_plans (
    plan_date TEXT PRIMARY KEY,
    entries_json TEXT NOT NULL,
    generated_at TEXT NOT NULL
);
"#;

/// Schema version table for migrations.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// SQL for migration from v1 to v2 (folded name keys, muscle-group tags).
///
/// `name_key` is filled in from Rust after this runs, because SQLite's
/// `lower()` and `NOCASE` only fold ASCII.
pub const MIGRATION_V1_TO_V2: &str = r#"
ALTER TABLE exercises ADD COLUMN name_key TEXT NOT NULL DEFAULT '';

DROP INDEX IF EXISTS idx_exercises_active_name;

-- Muscle-group tags with a display colour
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL UNIQUE,
    color TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS exercise_tags (
    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (exercise_id, tag_id)
);

CREATE INDEX IF NOT EXISTS idx_exercise_tags_tag ON exercise_tags(tag_id);
"#;

/// Created once every `name_key` is filled in.
///
/// Names are unique among active exercises only, so a deactivated exercise
/// does not block re-creating the same name.
pub const NAME_KEY_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_exercises_active_name_key
    ON exercises(name_key) WHERE active = 1;
"#;

/// Storage format for log timestamps (local wall-clock, second precision).
///
/// Lexicographic order of this format matches chronological order, and
/// SQLite's `date()` understands it.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage format for calendar days.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
