//! Terminal rendering for command results.

use crate::exercises::types::{Exercise, ExerciseId, Tag};
use crate::goals::evaluator::GoalMap;
use crate::goals::types::{GoalProgress, GoalState};
use crate::metrics::types::{MonthlyTotal, PeriodChange, ProgressOverview, StatsReport};
use crate::session::{LogLine, LogOutcome};
use crate::storage::config::Settings;
use crate::workouts::types::PlanLine;
use chrono::NaiveDate;
use colored::*;
use std::collections::BTreeMap;
use std::path::Path;

const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const BAR_WIDTH: usize = 20;

/// One block character per value, scaled to the largest value.
pub fn sparkline(values: &[i64]) -> String {
    let max = values.iter().copied().max().unwrap_or(0);
    if max <= 0 {
        return SPARK_CHARS[0].to_string().repeat(values.len());
    }

    values
        .iter()
        .map(|&v| {
            let idx = (v.max(0) as f64 / max as f64 * (SPARK_CHARS.len() - 1) as f64).round();
            SPARK_CHARS[idx as usize]
        })
        .collect()
}

/// Fixed-width text progress bar.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Signed change such as "+20 (+50.0%)".
pub fn format_change(change: &PeriodChange) -> String {
    format!("{:+} ({:+.1}%)", change.diff, change.pct)
}

/// Tag names joined by commas, each in its own colour.
pub fn format_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| match tag.rgb() {
            Some((r, g, b)) => tag.name.truecolor(r, g, b).to_string(),
            None => tag.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn tags_of(tags: &BTreeMap<ExerciseId, Vec<Tag>>, id: ExerciseId) -> String {
    tags.get(&id).map(|t| format_tags(t)).unwrap_or_default()
}

fn state_label(state: GoalState) -> ColoredString {
    match state {
        GoalState::Met => "✓ met".green().bold(),
        GoalState::InProgress => "… in progress".yellow(),
        GoalState::NoGoal => "no goal".dimmed(),
    }
}

fn header(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}", "=".repeat(title.chars().count().max(40)).cyan());
}

pub fn print_log_outcome(outcome: &LogOutcome) {
    println!(
        "{} Logged set #{} of {}",
        "✓".green().bold(),
        outcome.entry_id,
        outcome.exercise.name.bold()
    );

    let goal = outcome.exercise.daily_goal;
    if goal > 0 {
        println!(
            "  Today: {} / {} {}  {}",
            outcome.daily_total,
            goal,
            outcome.exercise.unit,
            state_label(outcome.goal_state)
        );
    } else {
        println!("  Today: {} {}", outcome.daily_total, outcome.exercise.unit);
    }
}

pub fn print_stats(report: &StatsReport, series: &[(NaiveDate, i64)]) {
    header(&format!("Statistics for {}", report.range));

    println!(
        "{:<20} {:>8} {:>6} {:>10}",
        "Exercise".bold(),
        "Total".bold(),
        "Days".bold(),
        "Avg/day".bold()
    );
    for row in &report.rows {
        let line = format!(
            "{:<20} {:>8} {:>6} {:>10}",
            row.exercise.name,
            row.total_count,
            row.days_active,
            row.average_display()
        );
        if row.is_idle() {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }

    println!();
    println!(
        "Total: {}  Active days: {} / {}",
        report.grand_total().to_string().bold(),
        report.active_days,
        report.range.num_days()
    );

    let top = report.top_exercises(3);
    if !top.is_empty() {
        let names: Vec<String> = top
            .iter()
            .map(|row| format!("{} ({})", row.exercise.name, row.total_count))
            .collect();
        println!("Top: {}", names.join(", "));
    }

    if !series.is_empty() {
        let values: Vec<i64> = series.iter().map(|(_, total)| *total).collect();
        println!("Daily: {}", sparkline(&values).green());
    }
}

pub fn print_progress(overview: &ProgressOverview, months: &[MonthlyTotal]) {
    let colour = |change: &PeriodChange| {
        let text = format_change(change);
        if change.is_improvement() {
            text.green()
        } else if change.diff < 0 {
            text.red()
        } else {
            text.normal()
        }
    };

    println!(
        "Last 7 days: {} vs {}  {}",
        overview.week.current,
        overview.week.previous,
        colour(&overview.week)
    );
    println!(
        "This month:  {} vs {}  {}",
        overview.month.current,
        overview.month.previous,
        colour(&overview.month)
    );

    if !months.is_empty() {
        let parts: Vec<String> = months
            .iter()
            .map(|m| format!("{} {}", m.label(), m.total))
            .collect();
        println!("{}", parts.join(" | ").dimmed());
    }
}

fn sorted_goals(goals: &GoalMap) -> Vec<&GoalProgress> {
    let mut rows: Vec<&GoalProgress> = goals.values().collect();
    rows.sort_by(|a, b| {
        a.exercise
            .name
            .to_lowercase()
            .cmp(&b.exercise.name.to_lowercase())
    });
    rows
}

pub fn print_goals(title: &str, goals: &GoalMap) {
    header(title);

    if goals.is_empty() {
        println!("{}", "No goals set. Use `heraclis goal set` to add one.".dimmed());
        return;
    }

    for progress in sorted_goals(goals) {
        println!(
            "{:<20} {} {:>5} / {:<5} {}",
            progress.exercise.name,
            progress_bar(progress.percent(), BAR_WIDTH),
            progress.total,
            progress.target,
            state_label(progress.state)
        );
    }

    let met = goals.values().filter(|g| g.state.is_met()).count();
    println!("\n{} of {} goals met", met, goals.len());
}

pub fn print_plan(date: NaiveDate, lines: &[PlanLine], tags: &BTreeMap<ExerciseId, Vec<Tag>>) {
    header(&format!("Workout for {}", date));

    if lines.is_empty() {
        println!("{}", "No exercises planned. Use `heraclis plan add` to add one.".dimmed());
        return;
    }

    for (i, line) in lines.iter().enumerate() {
        let mark = if line.is_complete() {
            "✓".green().bold()
        } else {
            "·".normal()
        };
        println!(
            "{} {}. {:<20} {:>4} {:<8} (logged {:>3})  {}",
            mark,
            i + 1,
            line.exercise.name,
            line.target_count,
            line.exercise.unit,
            line.logged,
            tags_of(tags, line.exercise.id)
        );
    }
}

pub fn print_exercises(exercises: &[Exercise], tags: &BTreeMap<ExerciseId, Vec<Tag>>) {
    if exercises.is_empty() {
        println!("{}", "No exercises.".dimmed());
        return;
    }

    println!(
        "{:<4} {:<20} {:<8} {:>6} {:>7} {:<8} {:<4} {}",
        "ID".bold(),
        "Name".bold(),
        "Unit".bold(),
        "Daily".bold(),
        "Weekly".bold(),
        "Range".bold(),
        "Pool".bold(),
        "Muscles".bold()
    );

    for exercise in exercises {
        let range = exercise
            .rep_range
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let line = format!(
            "{:<4} {:<20} {:<8} {:>6} {:>7} {:<8} {:<4}",
            exercise.id,
            exercise.name,
            exercise.unit,
            exercise.daily_goal,
            exercise.weekly_goal,
            range,
            if exercise.randomizable { "yes" } else { "" }
        );
        let muscles = tags_of(tags, exercise.id);
        if exercise.active {
            println!("{} {}", line, muscles);
        } else {
            println!("{} {} {}", line.dimmed(), muscles, "(inactive)".dimmed());
        }
    }
}

pub fn print_tags(tags: &[Tag]) {
    if tags.is_empty() {
        println!("{}", "No tags. Use `heraclis tag add` to create one.".dimmed());
        return;
    }

    println!("{:<4} {:<16} {}", "ID".bold(), "Name".bold(), "Colour".bold());
    for tag in tags {
        let swatch = match tag.rgb() {
            Some((r, g, b)) => "●".truecolor(r, g, b),
            None => "●".normal(),
        };
        println!("{:<4} {:<16} {} {}", tag.id, tag.name, swatch, tag.color);
    }
}

pub fn print_logs(lines: &[LogLine]) {
    if lines.is_empty() {
        println!("{}", "Nothing logged.".dimmed());
        return;
    }

    for line in lines {
        let note = line
            .entry
            .note
            .as_deref()
            .map(|n| format!("  {}", n.italic()))
            .unwrap_or_default();
        println!(
            "{:>5}  {}  {:<20} {:>5} {}{}",
            line.entry.id.to_string().dimmed(),
            line.entry.logged_at.format("%Y-%m-%d %H:%M"),
            line.exercise_name,
            line.entry.count,
            line.unit,
            note
        );
    }
}

pub fn print_settings(settings: &Settings, path: &Path) {
    println!("{} {}", "Settings file:".bold(), path.display());
    println!("  default_workout_size = {}", settings.default_workout_size);
    println!("  default_rep_range    = {}", settings.default_rep_range);
    println!(
        "  timer_sound_path     = {}",
        settings
            .timer_sound_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!(
        "  database_path        = {}",
        settings.database_path().display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparkline_scales_to_max() {
        assert_eq!(sparkline(&[0, 7, 14]), "▁▅█");
        assert_eq!(sparkline(&[0, 0, 0]), "▁▁▁");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn test_progress_bar_width() {
        assert_eq!(progress_bar(0.0, 4), "░░░░");
        assert_eq!(progress_bar(50.0, 4), "██░░");
        assert_eq!(progress_bar(250.0, 4), "████");
    }

    #[test]
    fn test_format_tags_joins_names() {
        colored::control::set_override(false);
        let tags = vec![
            Tag {
                id: crate::exercises::types::TagId(1),
                name: "Chest".to_string(),
                color: "#e74c3c".to_string(),
            },
            Tag {
                id: crate::exercises::types::TagId(2),
                name: "Triceps".to_string(),
                color: "#dece4e".to_string(),
            },
        ];
        assert_eq!(format_tags(&tags), "Chest, Triceps");
        assert_eq!(format_tags(&[]), "");
    }

    #[test]
    fn test_format_change_is_signed() {
        assert_eq!(format_change(&PeriodChange::between(60, 40)), "+20 (+50.0%)");
        assert_eq!(format_change(&PeriodChange::between(30, 40)), "-10 (-25.0%)");
    }
}
