use crate::cli_args::MetricsArgs;
use crate::load_config_for_command;
use crate::output::{print_data_or_text, print_metrics_tables, readable_size};
use anyhow::{Context, Result};
use log;
use rayon::prelude::*;
use serde::Serialize;
use srcpack_core::{self as core, BundleResult, FileEntry};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetrics {
    pub name: String,
    pub file_count: usize,
    pub total_lines: usize,
    pub bytes: usize,
    pub size_readable: String,
    pub files: Vec<FileEntry>,
}

impl BundleMetrics {
    fn from_result(name: &str, result: BundleResult) -> Self {
        let bytes = result.content.len();
        Self {
            name: name.to_string(),
            file_count: result.file_count(),
            total_lines: result.total_lines(),
            bytes,
            size_readable: readable_size(bytes),
            files: result.index,
        }
    }
}

pub fn handle_metrics_command(args: MetricsArgs) -> Result<()> {
    let (config, work_dir) = load_config_for_command(&args.project_config)?;
    let selected = config
        .selected_bundles(&args.bundles)
        .context("Failed to select bundles")?;

    log::debug!("Measuring {} bundle(s)...", selected.len());
    let metrics = selected
        .par_iter()
        .map(|(name, spec)| {
            core::bundle_one(name, spec, &work_dir)
                .map(|result| BundleMetrics::from_result(name, result))
                .with_context(|| format!("Failed to assemble bundle '{}'", name))
        })
        .collect::<Result<Vec<_>>>()?;

    if args.format_output.format.as_deref() == Some("json") {
        print_data_or_text(&metrics, String::new(), &args.format_output)
    } else {
        print_metrics_tables(&metrics);
        Ok(())
    }
}
