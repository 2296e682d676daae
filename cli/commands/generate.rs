use crate::cli_args::GenerateArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use colored::Colorize;
use log;
use rayon::prelude::*;
use srcpack_core::{self as core, AppError, BundleOptions, BundleResult, PatternSpec};
use std::path::{Path, PathBuf};

/// One bundle's outcome, kept in config order for reporting.
#[derive(Debug)]
pub struct BundleReport {
    pub name: String,
    pub outfile: PathBuf,
    pub outcome: Result<BundleResult, AppError>,
}

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let (config, work_dir) = load_config_for_command(&args.project_config)?;
    let selected = config
        .selected_bundles(&args.bundles)
        .context("Failed to select bundles")?;
    log::info!(
        "Generating {} bundle(s) in {}",
        selected.len(),
        work_dir.display()
    );

    let mut reports: Vec<BundleReport> = selected
        .par_iter()
        .map(|(name, spec)| BundleReport {
            name: name.to_string(),
            outfile: config.resolve_outfile(name, spec, &work_dir),
            outcome: build_bundle(name, spec, &work_dir, args.no_index),
        })
        .collect();

    if !args.dry_run {
        for report in reports.iter_mut() {
            emit_bundle(report, args.stdout)?;
        }
    }

    if !quiet && !args.stdout {
        output::print_generate_summary(&reports, args.dry_run);
    }

    fail_on_errors(reports)
}

fn build_bundle(
    name: &str,
    spec: &PatternSpec,
    work_dir: &Path,
    no_index: bool,
) -> Result<BundleResult, AppError> {
    let mut options = BundleOptions::from_spec(spec, work_dir)?;
    if no_index {
        options.include_index = false;
    }
    core::bundle_with_options(name, spec, work_dir, &options)
}

/// Writes or prints a successful bundle. A write failure turns the report into a failure.
fn emit_bundle(report: &mut BundleReport, to_stdout: bool) -> Result<()> {
    let Ok(result) = &report.outcome else {
        return Ok(());
    };
    if to_stdout {
        return output::write_to_stdout(&result.content);
    }
    log::debug!(
        "Writing bundle '{}' to {}",
        report.name,
        report.outfile.display()
    );
    if let Err(e) = output::write_to_file(&report.outfile, &result.content) {
        report.outcome = Err(e);
    }
    Ok(())
}

fn fail_on_errors(reports: Vec<BundleReport>) -> Result<()> {
    let total = reports.len();
    let mut failures: Vec<(String, AppError)> = reports
        .into_iter()
        .filter_map(|report| report.outcome.err().map(|e| (report.name, e)))
        .collect();
    if failures.is_empty() {
        return Ok(());
    }
    for (name, e) in failures.iter().skip(1) {
        eprintln!("{} bundle '{}': {}", "Error:".red().bold(), name, e);
    }
    let failed = failures.len();
    let (name, first) = failures.remove(0);
    Err(anyhow::Error::new(first).context(format!(
        "Bundle '{}' failed ({} of {} bundles failed)",
        name, failed, total
    )))
}
