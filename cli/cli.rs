mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::PathBuf;
use std::process;

use cli_args::{Cli, Commands, ProjectConfigOpts};
use srcpack_core::{AppError, Config};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);
    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(_))
        | Some(AppError::TomlParse(_))
        | Some(AppError::TomlSerialize(_))
        | Some(AppError::UnknownBundle(_)) => 1,
        Some(AppError::Io(_))
        | Some(AppError::FileRead { .. })
        | Some(AppError::FileWrite { .. })
        | Some(AppError::DirCreation { .. })
        | Some(AppError::PromptFile { .. })
        | Some(AppError::WalkDir(_))
        | Some(AppError::Ignore(_))
        | Some(AppError::Glob(_)) => 2,
        Some(AppError::InvalidArgument(_)) => 5,
        Some(AppError::JsonSerialize(_)) => 6,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(Commands::Generate(args)) => {
            log::debug!("Executing 'generate' command...");
            commands::generate::handle_generate_command(args, quiet)?;
        }
        Some(Commands::Quick(args)) => {
            log::debug!("Executing 'quick' command...");
            commands::quick::handle_quick_command(args, quiet)?;
        }
        Some(Commands::Debug(args)) => {
            log::debug!("Executing 'debug' command...");
            commands::debug::handle_debug_command(args)?;
        }
        Some(Commands::Metrics(args)) => {
            log::debug!("Executing 'metrics' command...");
            commands::metrics::handle_metrics_command(args)?;
        }
        Some(Commands::Completion(args)) => {
            log::debug!("Executing 'completion' command...");
            commands::completion::handle_completion_command(&args, quiet)?;
        }
    }
    Ok(())
}

/// Loads the config for a command and returns it with the bundle working
/// directory (the directory holding the config file).
pub fn load_config_for_command(project_opts: &ProjectConfigOpts) -> Result<(Config, PathBuf)> {
    let start = Config::determine_project_root(project_opts.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", start.display());

    let config_path = Config::resolve_config_path(&start, project_opts.config.as_deref())
        .context("Failed to resolve configuration path")?;
    let config = Config::load_from_path(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let work_dir = config_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| start.clone());
    let work_dir = work_dir.canonicalize().unwrap_or(work_dir);
    log::debug!("Bundle working directory: {}", work_dir.display());
    Ok((config, work_dir))
}
