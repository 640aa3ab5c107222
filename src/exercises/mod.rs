//! Exercise catalogue and logged sets.
//!
//! Exercises are the trackable activities (pushups, planks, ...). Each one
//! carries its own daily/weekly goal and randomizer settings; log entries
//! record individual sets against an exercise. Tags name the muscle groups
//! an exercise works.

pub mod catalogue;
pub mod types;

pub use catalogue::{default_catalogue, default_tag_links, default_tags};
pub use types::{
    name_key, DailyTotal, Exercise, ExerciseId, LogEntry, LogEntryId, NewExercise, RepRange,
    Tag, TagId, DEFAULT_TAG_COLOR, DEFAULT_UNIT,
};
