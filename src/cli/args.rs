//! Command-line argument parsing.

use crate::exercises::types::RepRange;
use crate::metrics::range::MAX_RANGE_DAYS;
use crate::storage::config::parse_rep_range;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// heraclis - log bodyweight reps, track goals and roll a random daily workout
#[derive(Parser, Debug)]
#[command(name = "heraclis")]
#[command(version)]
#[command(about = "Log bodyweight reps, track goals and roll a random daily workout", long_about = None)]
pub struct Args {
    /// Settings file (platform config directory by default)
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Database file, overriding the settings
    #[arg(long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Verbosity: -v for info logging, -vv for debug
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand; today's dashboard when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Args {
    /// Default log filter for the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a set, e.g. `heraclis add pushups 20`
    Add {
        /// Exercise name (case-insensitive)
        exercise: String,
        /// Number of reps (or the exercise's unit)
        #[arg(allow_negative_numbers = true)]
        count: i64,
        /// Optional note stored with the set
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Show statistics for recent days
    Stats {
        /// Number of days ending today
        #[arg(
            short,
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RANGE_DAYS))
        )]
        days: u32,
    },

    /// Show goal progress
    Goals {
        /// Weekly goals instead of today's
        #[arg(short, long)]
        week: bool,
    },

    /// Show today's random workout, drawing one if needed
    Random {
        /// Draw a new workout even if one exists for today
        #[arg(short, long)]
        force: bool,
    },

    /// Edit today's workout
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Manage exercises
    #[command(subcommand)]
    Exercise(ExerciseCommand),

    /// Manage muscle-group tags
    #[command(subcommand)]
    Tag(TagCommand),

    /// Manage goals
    #[command(subcommand)]
    Goal(GoalCommand),

    /// Review and correct logged sets
    #[command(subcommand)]
    Log(LogCommand),

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
pub enum ExerciseCommand {
    /// Create an exercise
    Add {
        name: String,
        /// Unit of a single count
        #[arg(short, long, default_value = "reps")]
        unit: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Daily goal (0 for none)
        #[arg(long, default_value_t = 0)]
        daily: u32,
        /// Weekly goal (0 for none)
        #[arg(long, default_value_t = 0)]
        weekly: u32,
        /// Randomizer target range, e.g. 10-20
        #[arg(long, value_parser = parse_rep_range)]
        range: Option<RepRange>,
        /// Include in the random workout pool
        #[arg(long)]
        random: bool,
    },

    /// List exercises
    List {
        /// Include deactivated exercises
        #[arg(short, long)]
        all: bool,
        /// Only active exercises with this tag
        #[arg(short, long, conflicts_with = "all")]
        tag: Option<String>,
    },

    /// Replace an exercise's muscle-group tags (none clears them)
    Tag {
        name: String,
        /// Tag names; unknown tags are created
        tags: Vec<String>,
    },

    /// Deactivate an exercise, keeping its history
    Deactivate { name: String },

    /// Set or clear an exercise's randomizer range
    Range {
        name: String,
        /// Range such as 10-20; omit to use the default range
        #[arg(value_parser = parse_rep_range)]
        range: Option<RepRange>,
    },

    /// Add an exercise to the random workout pool, or remove it
    Pool {
        name: String,
        #[arg(long)]
        remove: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Add an exercise to today's workout
    Add {
        exercise: String,
        /// Target count; drawn from the exercise's range when omitted
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        target: Option<u32>,
    },

    /// Remove an exercise from today's workout
    Remove { exercise: String },

    /// List exercises not yet in today's workout
    Available,
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// List tags and their colours
    List,

    /// Create a tag
    Add {
        name: String,
        /// Colour as #rrggbb
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Change a tag's colour
    Color {
        name: String,
        /// Colour as #rrggbb
        color: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    /// Change daily and/or weekly goals (0 clears a goal)
    Set {
        exercise: String,
        #[arg(long)]
        daily: Option<u32>,
        #[arg(long)]
        weekly: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogCommand {
    /// List logged sets
    List {
        /// Number of days ending today
        #[arg(
            short,
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RANGE_DAYS))
        )]
        days: u32,
        /// Only this exercise
        #[arg(short, long)]
        exercise: Option<String>,
    },

    /// Correct the count of a set
    Edit {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },

    /// Delete a set
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the effective settings
    Show,

    /// Change a setting and save it
    Set { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_parses_negative_count() {
        let args = Args::try_parse_from(["heraclis", "add", "pushups", "-5"]).unwrap();
        match args.command {
            Some(Commands::Add { exercise, count, note }) => {
                assert_eq!(exercise, "pushups");
                assert_eq!(count, -5);
                assert!(note.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand_means_dashboard() {
        let args = Args::try_parse_from(["heraclis"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_verbosity_counts() {
        let args = Args::try_parse_from(["heraclis", "-vv", "stats"]).unwrap();
        assert_eq!(args.log_level(), "debug");
        assert!(matches!(args.command, Some(Commands::Stats { days: 7 })));
    }

    #[test]
    fn test_exercise_range_parses() {
        let args =
            Args::try_parse_from(["heraclis", "exercise", "range", "Planks", "2-4"]).unwrap();
        match args.command {
            Some(Commands::Exercise(ExerciseCommand::Range { name, range })) => {
                assert_eq!(name, "Planks");
                assert_eq!(range, Some(RepRange { min: 2, max: 4 }));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Args::try_parse_from(["heraclis", "exercise", "range", "Planks", "4-2"]).is_err());
    }

    #[test]
    fn test_days_are_bounded() {
        for days in ["0", "3661", "4294967295"] {
            assert!(Args::try_parse_from(["heraclis", "stats", "--days", days]).is_err());
            assert!(Args::try_parse_from(["heraclis", "log", "list", "--days", days]).is_err());
        }

        let args = Args::try_parse_from(["heraclis", "stats", "--days", "3660"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Stats { days: 3660 })));
    }

    #[test]
    fn test_exercise_tag_takes_many_tags() {
        let args =
            Args::try_parse_from(["heraclis", "exercise", "tag", "Squats", "Quads", "Back"])
                .unwrap();
        match args.command {
            Some(Commands::Exercise(ExerciseCommand::Tag { name, tags })) => {
                assert_eq!(name, "Squats");
                assert_eq!(tags, vec!["Quads", "Back"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let args = Args::try_parse_from(["heraclis", "exercise", "tag", "Squats"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Exercise(ExerciseCommand::Tag { ref tags, .. })) if tags.is_empty()
        ));
    }

    #[test]
    fn test_plan_add_rejects_zero_target() {
        let args =
            Args::try_parse_from(["heraclis", "plan", "add", "Planks", "--target", "3"]).unwrap();
        match args.command {
            Some(Commands::Plan(PlanCommand::Add { exercise, target })) => {
                assert_eq!(exercise, "Planks");
                assert_eq!(target, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(
            Args::try_parse_from(["heraclis", "plan", "add", "Planks", "--target", "0"]).is_err()
        );
    }
}
