//! Bundle rendering: file blocks, index header, prompt framing, and the
//! line-number offsets that keep the index consistent with the content.

use crate::config::resolve_prompt;
use crate::context::{self, FileEntry, LoadedFile, count_lines};
use crate::error::Result;
use crate::gather;
use crate::output_formats::{
    self, INDEX_OVERHEAD_LINES, PROMPT_OVERHEAD_LINES, format_index_block, format_separator,
};
use crate::patterns::PatternSpec;
use log;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    pub include_index: bool,
    pub prompt: Option<String>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            include_index: true,
            prompt: None,
        }
    }
}

/// The rendered artifact and the index describing where each file landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleResult {
    pub content: String,
    pub index: Vec<FileEntry>,
}

impl BundleResult {
    pub fn file_count(&self) -> usize {
        self.index.len()
    }

    pub fn total_lines(&self) -> usize {
        self.index.iter().map(|entry| entry.lines).sum()
    }
}

/// Reads `file_paths` (relative to `root`, already sorted) and renders them.
pub fn create_bundle(
    file_paths: &[String],
    root: &Path,
    options: &BundleOptions,
) -> Result<BundleResult> {
    let files = context::load_files(file_paths, root)?;
    Ok(render_bundle(&files, options))
}

impl BundleOptions {
    /// Options declared on the bundle itself, with a file prompt already read.
    pub fn from_spec(spec: &PatternSpec, root: &Path) -> Result<Self> {
        Ok(Self {
            include_index: spec.include_index(),
            prompt: resolve_prompt(spec.prompt(), root)?,
        })
    }
}

/// Resolves, loads, and renders one configured bundle.
pub fn bundle_one(name: &str, spec: &PatternSpec, root: &Path) -> Result<BundleResult> {
    let options = BundleOptions::from_spec(spec, root)?;
    bundle_with_options(name, spec, root, &options)
}

pub fn bundle_with_options(
    name: &str,
    spec: &PatternSpec,
    root: &Path,
    options: &BundleOptions,
) -> Result<BundleResult> {
    log::debug!("Bundling '{}' from {}", name, root.display());
    let paths = gather::resolve_patterns(spec, root)?;
    let result = create_bundle(&paths, root, options)?;
    log::info!(
        "Bundle '{}': {} files, {} lines",
        name,
        result.file_count(),
        result.total_lines()
    );
    Ok(result)
}

pub fn render_bundle(files: &[LoadedFile], options: &BundleOptions) -> BundleResult {
    let prompt = output_formats::normalize_prompt(options.prompt.as_deref());
    let prompt_lines = prompt.map_or(0, |p| count_lines(p) + PROMPT_OVERHEAD_LINES);

    let body = files
        .iter()
        .enumerate()
        .map(|(i, file)| format!("{}\n{}", format_separator(i + 1, &file.path), file.content))
        .collect::<Vec<_>>()
        .join("\n");

    let (index, rest) = if options.include_index {
        let header_lines = files.len() + INDEX_OVERHEAD_LINES + prompt_lines;
        let index = shift_all(context::assign_line_ranges(files), header_lines);
        let index_block = format_index_block(&index);
        let rest = if files.is_empty() {
            index_block
        } else {
            format!("{}\n\n{}", index_block, body)
        };
        (index, rest)
    } else {
        (
            shift_all(context::assign_line_ranges(files), prompt_lines),
            body,
        )
    };

    let content = match prompt {
        Some(prompt) => output_formats::frame_prompt(prompt, &rest),
        None => rest,
    };
    BundleResult { content, index }
}

fn shift_all(entries: Vec<FileEntry>, offset: usize) -> Vec<FileEntry> {
    entries
        .into_iter()
        .map(|entry| entry.shifted(offset))
        .collect()
}
