//! End-to-end tests running the `heraclis` binary.

use std::path::Path;
use std::process::{Command, Output};

fn heraclis(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_heraclis"))
        .arg("--settings")
        .arg(dir.join("settings.json"))
        .arg("--database")
        .arg(dir.join("heraclis.db"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run heraclis")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_add_reports_running_total() {
    let dir = tempfile::tempdir().unwrap();

    let first = heraclis(dir.path(), &["add", "pushups", "20"]);
    assert!(first.status.success(), "{}", stderr(&first));

    let second = heraclis(dir.path(), &["add", "Pushups", "35", "--note", "evening"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("55 / 50"));
}

#[test]
fn test_errors_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();

    let unknown = heraclis(dir.path(), &["add", "handstands", "5"]);
    assert_eq!(unknown.status.code(), Some(1));
    assert!(stderr(&unknown).contains("Unknown exercise"));

    let negative = heraclis(dir.path(), &["add", "squats", "-5"]);
    assert_eq!(negative.status.code(), Some(1));
    assert!(stderr(&negative).contains("positive"));

    let duplicate = heraclis(dir.path(), &["exercise", "add", "SQUATS"]);
    assert_eq!(duplicate.status.code(), Some(1));
    assert!(stderr(&duplicate).contains("already exists"));
}

#[test]
fn test_random_is_stable_until_forced() {
    let dir = tempfile::tempdir().unwrap();

    let first = heraclis(dir.path(), &["random"]);
    let second = heraclis(dir.path(), &["random"]);
    assert!(first.status.success());
    assert_eq!(stdout(&first), stdout(&second));

    let forced = heraclis(dir.path(), &["random", "--force"]);
    assert!(forced.status.success());
}

#[test]
fn test_settings_set_and_show() {
    let dir = tempfile::tempdir().unwrap();

    let set = heraclis(dir.path(), &["settings", "set", "default_workout_size", "2"]);
    assert!(set.status.success(), "{}", stderr(&set));
    assert!(dir.path().join("settings.json").exists());

    let show = heraclis(dir.path(), &["settings", "show"]);
    assert!(stdout(&show).contains("default_workout_size = 2"));

    let bad = heraclis(dir.path(), &["settings", "set", "default_rep_range", "9-1"]);
    assert_eq!(bad.status.code(), Some(1));
}

#[test]
fn test_dashboard_and_stats_run() {
    let dir = tempfile::tempdir().unwrap();
    heraclis(dir.path(), &["add", "squats", "12"]);

    let dashboard = heraclis(dir.path(), &[]);
    assert!(dashboard.status.success(), "{}", stderr(&dashboard));
    assert!(stdout(&dashboard).contains("Today's goals"));

    let stats = heraclis(dir.path(), &["stats", "--days", "3"]);
    assert!(stats.status.success());
    assert!(stdout(&stats).contains("Squats"));
}

#[test]
fn test_days_out_of_range_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();

    let stats = heraclis(dir.path(), &["stats", "--days", "4294967295"]);
    assert_eq!(stats.status.code(), Some(2));
    assert!(stats.stdout.is_empty());

    let logs = heraclis(dir.path(), &["log", "list", "--days", "0"]);
    assert_eq!(logs.status.code(), Some(2));
}

#[test]
fn test_non_ascii_names_fold_case() {
    let dir = tempfile::tempdir().unwrap();

    let add = heraclis(dir.path(), &["exercise", "add", "Übungen"]);
    assert!(add.status.success(), "{}", stderr(&add));

    let log = heraclis(dir.path(), &["add", "übungen", "5"]);
    assert!(log.status.success(), "{}", stderr(&log));
    assert!(stdout(&log).contains("Übungen"));

    let duplicate = heraclis(dir.path(), &["exercise", "add", "ÜBUNGEN"]);
    assert_eq!(duplicate.status.code(), Some(1));
}

#[test]
fn test_exercise_tags() {
    let dir = tempfile::tempdir().unwrap();

    let tag = heraclis(dir.path(), &["exercise", "tag", "squats", "Quads", "Back"]);
    assert!(tag.status.success(), "{}", stderr(&tag));
    assert!(stdout(&tag).contains("Quads, Back"));

    let back = heraclis(dir.path(), &["exercise", "list", "--tag", "back"]);
    assert!(back.status.success());
    assert!(stdout(&back).contains("Squats"));
    assert!(!stdout(&back).contains("Pushups"));

    let list = heraclis(dir.path(), &["exercise", "list"]);
    assert!(stdout(&list).contains("Chest, Front Delts, Triceps"));

    let colour = heraclis(dir.path(), &["tag", "color", "back", "#000000"]);
    assert!(colour.status.success(), "{}", stderr(&colour));
    let tags = heraclis(dir.path(), &["tag", "list"]);
    assert!(stdout(&tags).contains("#000000"));

    let bad = heraclis(dir.path(), &["tag", "add", "Neck", "--color", "teal"]);
    assert_eq!(bad.status.code(), Some(1));
}

#[test]
fn test_plan_add_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    heraclis(dir.path(), &["exercise", "add", "Burpees", "--random"]);
    heraclis(dir.path(), &["random"]);

    let add = heraclis(dir.path(), &["plan", "add", "pushups", "--target", "15"]);
    assert!(add.status.success(), "{}", stderr(&add));
    assert!(stdout(&add).contains("Pushups"));
    assert!(stdout(&add).contains("Burpees"));

    let again = heraclis(dir.path(), &["plan", "add", "Pushups"]);
    assert_eq!(again.status.code(), Some(1));
    assert!(stderr(&again).contains("already in the workout"));

    let available = heraclis(dir.path(), &["plan", "available"]);
    assert!(!stdout(&available).contains("Pushups"));

    let remove = heraclis(dir.path(), &["plan", "remove", "pushups"]);
    assert!(remove.status.success());
    let shown = heraclis(dir.path(), &["random"]);
    assert!(!stdout(&shown).contains("Pushups"));

    let missing = heraclis(dir.path(), &["plan", "remove", "pushups"]);
    assert_eq!(missing.status.code(), Some(1));
    assert!(stderr(&missing).contains("not in the workout"));
}
