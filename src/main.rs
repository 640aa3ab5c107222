//! heraclis - Bodyweight Rep Logger
//!
//! Main entry point for the command-line tool.

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use heraclis::cli::{commands, Args, Commands};
use heraclis::session::Session;
use heraclis::storage::config::{get_settings_path, load_settings};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level())))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting heraclis v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let settings_path = args.settings.clone().unwrap_or_else(get_settings_path);
    let mut settings = load_settings(&settings_path);

    // Settings commands work even when the configured database cannot be opened
    if let Some(Commands::Settings(command)) = &args.command {
        commands::run_settings(command, settings, &settings_path)?;
        return Ok(());
    }

    if let Some(path) = &args.database {
        settings.database_path = Some(path.clone());
    }

    let database_path = settings.database_path();
    let session = Session::open(settings)
        .with_context(|| format!("Could not open database {}", database_path.display()))?;

    commands::run(&session, args.command.as_ref(), &settings_path)?;
    Ok(())
}
