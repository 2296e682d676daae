use crate::cli_args::QuickArgs;
use crate::output::write_to_stdout;
use anyhow::{Context, Result};
use colored::*;
use log;
use srcpack_core::{self as core, BundleOptions, Config, PatternSet};

pub fn handle_quick_command(args: QuickArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let patterns = PatternSet::from_patterns(&args.patterns);
    log::debug!("Quick patterns normalized: {:?}", patterns);

    let paths = core::resolve_pattern_set(&patterns, &project_root)
        .with_context(|| format!("Failed to resolve patterns {:?}", args.patterns))?;
    if paths.is_empty() && !quiet {
        eprintln!(
            "{} No files matched {}",
            "⚠️".yellow(),
            args.patterns.join(" ").cyan()
        );
    }

    let options = BundleOptions {
        include_index: !args.no_index,
        prompt: core::resolve_prompt(args.prompt.as_deref(), &project_root)
            .context("Failed to load prompt")?,
    };
    let result = core::create_bundle(&paths, &project_root, &options)
        .context("Failed to assemble quick bundle")?;
    log::info!(
        "Quick bundle: {} files, {} lines",
        result.file_count(),
        result.total_lines()
    );
    write_to_stdout(&result.content)
}
