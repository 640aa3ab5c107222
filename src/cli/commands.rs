//! Subcommand dispatch.

use crate::cli::args::{
    Commands, ExerciseCommand, GoalCommand, LogCommand, PlanCommand, SettingsCommand, TagCommand,
};
use crate::cli::display;
use crate::exercises::types::{LogEntryId, NewExercise};
use crate::session::{Session, SessionError};
use crate::storage::config::{save_settings, Settings};
use crate::workouts::types::DailyWorkoutPlan;
use colored::*;
use std::path::Path;

/// Days shown in the dashboard sparkline.
const DASHBOARD_DAYS: u32 = 7;

/// Months listed under the progress overview.
const OVERVIEW_MONTHS: u32 = 3;

/// Run a settings command. Needs no database.
pub fn run_settings(
    command: &SettingsCommand,
    mut settings: Settings,
    path: &Path,
) -> Result<(), SessionError> {
    match command {
        SettingsCommand::Show => display::print_settings(&settings, path),
        SettingsCommand::Set { key, value } => {
            settings.set(key, value)?;
            save_settings(path, &settings)?;
            println!("{} {} updated", "✓".green().bold(), key);
        }
    }
    Ok(())
}

/// Run a command against an open session. `None` prints the dashboard.
pub fn run(
    session: &Session,
    command: Option<&Commands>,
    settings_path: &Path,
) -> Result<(), SessionError> {
    match command {
        None => dashboard(session),
        Some(Commands::Add {
            exercise,
            count,
            note,
        }) => {
            let outcome = session.log_reps(exercise, *count, note.as_deref())?;
            display::print_log_outcome(&outcome);
            Ok(())
        }
        Some(Commands::Stats { days }) => {
            let range = session.last_days_range(*days);
            let report = session.get_stats(range)?;
            let series = session.daily_series(*days)?;
            display::print_stats(&report, &series);
            Ok(())
        }
        Some(Commands::Goals { week }) => {
            if *week {
                let goals = session.get_goals_this_week()?;
                let week = session.current_week();
                display::print_goals(
                    &format!("Weekly goals (week {} of {})", week.week(), week.year()),
                    &goals,
                );
            } else {
                display::print_goals("Today's goals", &session.get_goals_today()?);
            }
            Ok(())
        }
        Some(Commands::Random { force }) => {
            let plan = session.randomize_today(*force)?;
            show_plan(session, &plan)
        }
        Some(Commands::Plan(command)) => plan(session, command),
        Some(Commands::Exercise(command)) => exercise(session, command),
        Some(Commands::Tag(command)) => tag(session, command),
        Some(Commands::Goal(GoalCommand::Set {
            exercise,
            daily,
            weekly,
        })) => {
            let updated = session.set_goal(exercise, *daily, *weekly)?;
            println!(
                "{} {}: daily {}, weekly {}",
                "✓".green().bold(),
                updated.name,
                updated.daily_goal,
                updated.weekly_goal
            );
            Ok(())
        }
        Some(Commands::Log(command)) => log(session, command),
        Some(Commands::Settings(command)) => {
            run_settings(command, session.settings().clone(), settings_path)
        }
    }
}

fn exercise(session: &Session, command: &ExerciseCommand) -> Result<(), SessionError> {
    match command {
        ExerciseCommand::Add {
            name,
            unit,
            description,
            daily,
            weekly,
            range,
            random,
        } => {
            let mut new = NewExercise::new(name.as_str())
                .with_unit(unit.as_str())
                .with_description(description.as_str())
                .with_goals(*daily, *weekly)
                .randomizable(*random);
            if let Some(range) = range {
                new = new.with_rep_range(*range);
            }
            let created = session.add_exercise(&new)?;
            println!("{} Added {} (#{})", "✓".green().bold(), created.name, created.id);
        }
        ExerciseCommand::List { all, tag } => {
            let exercises = match tag {
                Some(tag) => session.exercises_by_tag(tag)?,
                None => session.list_exercises(*all)?,
            };
            display::print_exercises(&exercises, &session.tags_by_exercise()?);
        }
        ExerciseCommand::Tag { name, tags } => {
            let names: Vec<&str> = tags.iter().map(String::as_str).collect();
            let tags = session.tag_exercise(name, &names)?;
            if tags.is_empty() {
                println!("{} Cleared the tags of {}", "✓".green().bold(), name);
            } else {
                println!("{} {}: {}", "✓".green().bold(), name, display::format_tags(&tags));
            }
        }
        ExerciseCommand::Deactivate { name } => {
            let retired = session.deactivate_exercise(name)?;
            println!("{} Deactivated {}", "✓".green().bold(), retired.name);
        }
        ExerciseCommand::Range { name, range } => {
            let updated = session.set_rep_range(name, *range)?;
            let shown = updated
                .rep_range
                .map(|r| r.to_string())
                .unwrap_or_else(|| format!("default ({})", session.settings().default_rep_range));
            println!("{} {} range: {}", "✓".green().bold(), updated.name, shown);
        }
        ExerciseCommand::Pool { name, remove } => {
            let updated = session.set_randomizable(name, !*remove)?;
            let verb = if updated.randomizable { "added to" } else { "removed from" };
            println!("{} {} {} the workout pool", "✓".green().bold(), updated.name, verb);
        }
    }
    Ok(())
}

fn plan(session: &Session, command: &PlanCommand) -> Result<(), SessionError> {
    match command {
        PlanCommand::Add { exercise, target } => {
            let plan = session.add_to_plan(exercise, *target)?;
            println!("{} Added {} to today's workout", "✓".green().bold(), exercise);
            show_plan(session, &plan)?;
        }
        PlanCommand::Remove { exercise } => {
            let plan = session.remove_from_plan(exercise)?;
            println!("{} Removed {} from today's workout", "✓".green().bold(), exercise);
            show_plan(session, &plan)?;
        }
        PlanCommand::Available => {
            display::print_exercises(&session.plan_candidates()?, &session.tags_by_exercise()?);
        }
    }
    Ok(())
}

fn tag(session: &Session, command: &TagCommand) -> Result<(), SessionError> {
    match command {
        TagCommand::List => display::print_tags(&session.list_tags()?),
        TagCommand::Add { name, color } => {
            let tag = session.add_tag(name, color.as_deref())?;
            println!("{} Added tag {} ({})", "✓".green().bold(), tag.name, tag.color);
        }
        TagCommand::Color { name, color } => {
            let tag = session.set_tag_color(name, color)?;
            println!("{} {} is now {}", "✓".green().bold(), tag.name, tag.color);
        }
    }
    Ok(())
}

fn show_plan(session: &Session, plan: &DailyWorkoutPlan) -> Result<(), SessionError> {
    display::print_plan(
        plan.date,
        &session.plan_progress(plan)?,
        &session.tags_by_exercise()?,
    );
    Ok(())
}

fn log(session: &Session, command: &LogCommand) -> Result<(), SessionError> {
    match command {
        LogCommand::List { days, exercise } => {
            let range = session.last_days_range(*days);
            display::print_logs(&session.logs_in(exercise.as_deref(), range)?);
        }
        LogCommand::Edit { id, count } => {
            session.correct_log(LogEntryId(*id), *count)?;
            println!("{} Set #{} now {}", "✓".green().bold(), id, count);
        }
        LogCommand::Delete { id } => {
            session.delete_log(LogEntryId(*id))?;
            println!("{} Deleted set #{}", "✓".green().bold(), id);
        }
    }
    Ok(())
}

/// Today's goals, the stored workout and recent progress.
fn dashboard(session: &Session) -> Result<(), SessionError> {
    display::print_goals("Today's goals", &session.get_goals_today()?);

    let today = session.last_days_range(1).end();
    match session.stored_plan(today)? {
        Some(plan) => show_plan(session, &plan)?,
        None => println!(
            "\n{}",
            "No workout drawn yet today. Run `heraclis random` for one.".dimmed()
        ),
    }

    println!();
    let series = session.daily_series(DASHBOARD_DAYS)?;
    let values: Vec<i64> = series.iter().map(|(_, total)| *total).collect();
    println!("Last {} days: {}", DASHBOARD_DAYS, display::sparkline(&values).green());
    display::print_progress(
        &session.progress_overview()?,
        &session.monthly_totals(OVERVIEW_MONTHS)?,
    );

    Ok(())
}
