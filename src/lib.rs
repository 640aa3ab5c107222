//! heraclis - Bodyweight Rep Logger
//!
//! A personal command-line tool for logging bodyweight exercise repetitions,
//! tracking progress against daily and weekly goals, and rolling a
//! randomized daily workout. All data lives in one local SQLite file.

pub mod cli;
pub mod exercises;
pub mod goals;
pub mod metrics;
pub mod session;
pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use exercises::types::{
    Exercise, ExerciseId, LogEntry, LogEntryId, NewExercise, RepRange, Tag, TagId,
};
pub use metrics::range::DateRange;
pub use session::{ErrorKind, LogOutcome, Session, SessionError};
pub use storage::config::Settings;
pub use storage::database::{Database, DatabaseError};
