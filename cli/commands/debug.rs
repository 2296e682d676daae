use crate::cli_args::DebugArgs;
use crate::load_config_for_command;
use crate::output::print_data_or_text;
use anyhow::{Context, Result};
use colored::*;
use log;
use serde::Serialize;
use srcpack_core::{self as core, Config, PatternSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct DebugInfo<'a> {
    working_dir: &'a Path,
    effective_config: &'a Config,
    bundles: Vec<BundleDebug>,
}

#[derive(Debug, Serialize)]
struct BundleDebug {
    name: String,
    outfile: PathBuf,
    include_index: bool,
    patterns: PatternSet,
    files: Vec<String>,
}

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let (config, work_dir) = load_config_for_command(&args.project_config)?;

    let mut bundles = Vec::new();
    for (name, spec) in config
        .selected_bundles(&args.bundles)
        .context("Failed to select bundles")?
    {
        log::debug!("Debug: resolving bundle '{}'", name);
        let files = core::resolve_patterns(spec, &work_dir)
            .with_context(|| format!("Failed to resolve files for bundle '{}'", name))?;
        bundles.push(BundleDebug {
            name: name.to_string(),
            outfile: config.resolve_outfile(name, spec, &work_dir),
            include_index: spec.include_index(),
            patterns: PatternSet::from_spec(spec),
            files,
        });
    }

    let debug_data = DebugInfo {
        working_dir: &work_dir,
        effective_config: &config,
        bundles,
    };
    let text = render_debug_text(&debug_data)?;
    print_data_or_text(&debug_data, text, &args.format_output)
}

fn render_debug_text(info: &DebugInfo) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "{}",
        "--- Effective Configuration ---".green().bold().underline()
    )?;
    writeln!(out, "{} {}", "Working dir:".green(), info.working_dir.display())?;
    let config_toml = toml::to_string_pretty(info.effective_config)
        .context("Failed to serialize effective config to TOML")?;
    writeln!(out, "{}", config_toml)?;

    for bundle in &info.bundles {
        writeln!(
            out,
            "{}",
            format!("--- Bundle: {} ---", bundle.name)
                .green()
                .bold()
                .underline()
        )?;
        writeln!(out, "{:<10} {}", "Outfile:".green(), bundle.outfile.display())?;
        writeln!(out, "{:<10} {}", "Index:".green(), bundle.include_index)?;
        write_pattern_line(&mut out, "Include:", bundle.patterns.include.iter())?;
        write_pattern_line(&mut out, "Exclude:", bundle.patterns.exclude.iter())?;
        write_pattern_line(&mut out, "Force:", bundle.patterns.force.iter())?;
        writeln!(out, "{} ({})", "Files:".green(), bundle.files.len())?;
        if bundle.files.is_empty() {
            writeln!(out, "{}", "(None)".dimmed())?;
        }
        for file in &bundle.files {
            writeln!(out, "- {}", file.cyan())?;
        }
        writeln!(out)?;
    }
    Ok(out)
}

fn write_pattern_line<'a>(
    out: &mut String,
    label: &str,
    patterns: impl Iterator<Item = &'a String>,
) -> Result<()> {
    let joined = patterns.map(String::as_str).collect::<Vec<_>>().join(", ");
    let shown = if joined.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        joined
    };
    writeln!(out, "{:<10} {}", label.green(), shown)?;
    Ok(())
}
