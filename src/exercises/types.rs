//! Exercise and log entry type definitions.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit used when an exercise does not specify one.
pub const DEFAULT_UNIT: &str = "reps";

/// Colour given to tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "#3498db";

/// Lookup key for exercise and tag names: trimmed and Unicode-lowercased.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Row identifier of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub i64);

impl std::fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row identifier of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntryId(pub i64);

impl std::fmt::Display for LogEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row identifier of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub i64);

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive range for randomized target counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
    pub min: u32,
    pub max: u32,
}

impl RepRange {
    /// Create a range, rejecting empty or zero-based bounds.
    pub fn new(min: u32, max: u32) -> Result<Self, &'static str> {
        if min == 0 {
            return Err("Rep range minimum must be at least 1");
        }
        if min > max {
            return Err("Rep range minimum must not exceed the maximum");
        }
        Ok(Self { min, max })
    }

    /// Whether a count lies inside the range (inclusive).
    pub fn contains(&self, count: u32) -> bool {
        (self.min..=self.max).contains(&count)
    }

    /// Whether the bounds satisfy the range invariants.
    pub fn is_valid(&self) -> bool {
        self.min >= 1 && self.min <= self.max
    }
}

impl Default for RepRange {
    fn default() -> Self {
        Self { min: 10, max: 30 }
    }
}

impl std::fmt::Display for RepRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// A trackable exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Row identifier
    pub id: ExerciseId,
    /// Display name, unique case-insensitively among active exercises
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Unit of a single count ("reps", "seconds", ...)
    pub unit: String,
    /// Daily target, 0 when no goal is set
    pub daily_goal: u32,
    /// Weekly (ISO week) target, 0 when no goal is set
    pub weekly_goal: u32,
    /// Inactive exercises are kept for history but hidden from new activity
    pub active: bool,
    /// Explicitly opted into the randomizer pool
    pub randomizable: bool,
    /// Per-exercise range for randomized targets
    pub rep_range: Option<RepRange>,
    /// When the exercise was created
    pub created_at: DateTime<Utc>,
}

/// A muscle group an exercise works, shown in its colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    /// Display name, unique case-insensitively
    pub name: String,
    /// Hex colour such as "#e74c3c"
    pub color: String,
}

impl Tag {
    /// The colour as RGB components.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.color)
    }
}

/// Parse a "#rrggbb" colour.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Fields needed to create an exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub daily_goal: u32,
    pub weekly_goal: u32,
    pub randomizable: bool,
    pub rep_range: Option<RepRange>,
}

impl NewExercise {
    /// Start a new exercise with default unit and no goals.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: DEFAULT_UNIT.to_string(),
            daily_goal: 0,
            weekly_goal: 0,
            randomizable: false,
            rep_range: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_goals(mut self, daily: u32, weekly: u32) -> Self {
        self.daily_goal = daily;
        self.weekly_goal = weekly;
        self
    }

    pub fn with_rep_range(mut self, range: RepRange) -> Self {
        self.rep_range = Some(range);
        self
    }

    pub fn randomizable(mut self, randomizable: bool) -> Self {
        self.randomizable = randomizable;
        self
    }
}

/// One recorded set of an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,
    pub exercise_id: ExerciseId,
    /// Number of units performed, always positive
    pub count: i64,
    /// Local wall-clock time of the set
    pub logged_at: NaiveDateTime,
    pub note: Option<String>,
}

impl LogEntry {
    /// Local calendar day the entry belongs to.
    pub fn date(&self) -> NaiveDate {
        self.logged_at.date()
    }
}

/// Sum of counts for one exercise on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub exercise_id: ExerciseId,
    pub date: NaiveDate,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rep_range_validation() {
        assert!(RepRange::new(5, 15).is_ok());
        assert!(RepRange::new(12, 12).is_ok());
        assert!(RepRange::new(0, 10).is_err());
        assert!(RepRange::new(20, 10).is_err());
    }

    #[test]
    fn test_rep_range_contains_is_inclusive() {
        let range = RepRange::new(10, 20).unwrap();
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
        assert_eq!(range.to_string(), "10-20");
    }

    #[test]
    fn test_name_key_folds_unicode_case() {
        assert_eq!(name_key("  Übungen "), "übungen");
        assert_eq!(name_key("ÜBUNGEN"), name_key("übungen"));
        assert_eq!(name_key("Squat & Lunge"), "squat & lunge");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#e74c3c"), Some((0xe7, 0x4c, 0x3c)));
        assert_eq!(parse_hex_color("#DECE4E"), Some((0xde, 0xce, 0x4e)));
        assert_eq!(parse_hex_color("e74c3c"), None);
        assert_eq!(parse_hex_color("#e74c3"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_new_exercise_defaults() {
        let exercise = NewExercise::new("Pushups");
        assert_eq!(exercise.unit, "reps");
        assert_eq!(exercise.daily_goal, 0);
        assert_eq!(exercise.weekly_goal, 0);
        assert!(!exercise.randomizable);
        assert!(exercise.rep_range.is_none());
    }

    #[test]
    fn test_log_entry_date_uses_local_day() {
        let entry = LogEntry {
            id: LogEntryId(1),
            exercise_id: ExerciseId(1),
            count: 10,
            logged_at: NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
            note: None,
        };
        assert_eq!(entry.date(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }
}
