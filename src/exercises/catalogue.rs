//! Starter exercises inserted into a fresh database.

use super::types::NewExercise;

const UPPER_BODY: &str = "Upper body strength exercise";
const LOWER_BODY: &str = "Lower body strength exercise";
const CORE: &str = "Core strength exercise";

/// (name, description, unit, daily goal, weekly goal)
const DEFAULTS: &[(&str, &str, &str, u32, u32)] = &[
    ("Pushups", UPPER_BODY, "reps", 50, 300),
    ("Squats", LOWER_BODY, "reps", 50, 200),
    ("Lunges", LOWER_BODY, "reps", 60, 140),
    ("Squat & Lunge", LOWER_BODY, "reps", 20, 140),
    ("Planks", CORE, "sets", 3, 15),
    ("Dead Bugs", CORE, "reps", 60, 180),
    ("Glute Bridges", LOWER_BODY, "reps", 30, 200),
    ("Crunches", CORE, "reps", 50, 300),
];

/// Muscle-group tags and their colours.
const TAGS: &[(&str, &str)] = &[
    ("Chest", "#e74c3c"),
    ("Front Delts", "#f39c12"),
    ("Triceps", "#dece4e"),
    ("Core", "#2ecc71"),
    ("Glutes", "#1abc9c"),
    ("Quads", "#68d9cd"),
    ("Hamstrings", "#16a085"),
    ("Calves", "#27ae60"),
    ("Back", "#2980b9"),
    ("Biceps", "#8e44ad"),
];

/// Tags of each starter exercise.
const TAG_LINKS: &[(&str, &[&str])] = &[
    ("Pushups", &["Chest", "Front Delts", "Triceps"]),
    ("Squats", &["Quads", "Glutes"]),
    ("Lunges", &["Quads", "Glutes"]),
    ("Squat & Lunge", &["Quads", "Glutes"]),
    ("Planks", &["Core"]),
    ("Dead Bugs", &["Core"]),
    ("Glute Bridges", &["Glutes", "Hamstrings"]),
    ("Crunches", &["Core"]),
];

/// The starter catalogue with its default goals.
pub fn default_catalogue() -> Vec<NewExercise> {
    DEFAULTS
        .iter()
        .map(|&(name, description, unit, daily, weekly)| {
            NewExercise::new(name)
                .with_description(description)
                .with_unit(unit)
                .with_goals(daily, weekly)
        })
        .collect()
}

/// Starter tags as (name, colour).
pub fn default_tags() -> &'static [(&'static str, &'static str)] {
    TAGS
}

/// Starter exercise names with the names of their tags.
pub fn default_tag_links() -> &'static [(&'static str, &'static [&'static str])] {
    TAG_LINKS
}
