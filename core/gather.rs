use crate::error::{AppError, Result};
use crate::patterns::{PatternSet, PatternSpec};
use crate::rules::IgnoreRules;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Number of leading bytes inspected for a null byte.
pub const BINARY_SNIFF_LEN: u64 = 8192;

/// Version-control metadata directory, never walked by either pass.
pub const VCS_DIR: &str = ".git";

/// Expands a bundle's patterns into sorted, unique paths relative to `root`.
pub fn resolve_patterns(spec: &PatternSpec, root: &Path) -> Result<Vec<String>> {
    resolve_pattern_set(&PatternSet::from_spec(spec), root)
}

pub fn resolve_pattern_set(patterns: &PatternSet, root: &Path) -> Result<Vec<String>> {
    if patterns.is_empty() {
        log::debug!("No include or force patterns, nothing to resolve.");
        return Ok(Vec::new());
    }

    let rules = IgnoreRules::load(root)?;
    let exclude_set = build_glob_set(patterns.exclude.iter())?;
    let mut resolved = BTreeSet::<String>::new();

    if !patterns.include.is_empty() {
        let include_set = build_glob_set(patterns.include.iter())?;
        let prune_set = build_glob_set(rules.prune_globs().iter())?;
        log::debug!(
            "Expanding {} include patterns (pruning {} dirs)",
            patterns.include.len(),
            rules.prune_dirs().len()
        );
        for rel in expand_globs(root, &include_set, &prune_set)? {
            if exclude_set.is_match(&rel) {
                log::trace!("Excluded by pattern: {}", rel);
                continue;
            }
            if rules.is_ignored(Path::new(&rel), false) {
                log::trace!("Ignored by rules: {}", rel);
                continue;
            }
            if is_binary_file(&root.join(&rel))? {
                log::trace!("Skipping binary file: {}", rel);
                continue;
            }
            resolved.insert(rel);
        }
    }

    if !patterns.force.is_empty() {
        let force_set = build_glob_set(patterns.force.iter())?;
        log::debug!("Expanding {} force patterns", patterns.force.len());
        for rel in expand_globs(root, &force_set, &GlobSet::empty())? {
            if exclude_set.is_match(&rel) {
                log::trace!("Force match excluded by pattern: {}", rel);
                continue;
            }
            if is_binary_file(&root.join(&rel))? {
                log::trace!("Skipping binary force match: {}", rel);
                continue;
            }
            resolved.insert(rel);
        }
    }

    log::debug!("Resolved {} files in {}", resolved.len(), root.display());
    Ok(resolved.into_iter().collect())
}

/// Walks `root` for regular files (dotfiles included) whose relative path
/// matches `matcher`, never descending into [`VCS_DIR`] or directories
/// matched by `prune`. Symlinks are not followed and symlinked files are
/// left out.
fn expand_globs(root: &Path, matcher: &GlobSet, prune: &GlobSet) -> Result<Vec<String>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            if entry.file_name() == VCS_DIR {
                log::trace!("Skipping VCS directory: {}", entry.path().display());
                return false;
            }
            match pathdiff::diff_paths(entry.path(), root) {
                Some(rel) if prune.is_match(to_posix(&rel)) => {
                    log::trace!("Pruning directory: {}", rel.display());
                    false
                }
                _ => true,
            }
        });

    let mut matches = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.path_is_symlink() {
            log::debug!("Skipping symlink: {}", entry.path().display());
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(relative_path) = pathdiff::diff_paths(entry.path(), root) else {
            log::warn!("Could not get relative path for: {}", entry.path().display());
            continue;
        };
        let rel = to_posix(&relative_path);
        if matcher.is_match(&rel) {
            log::trace!("Matched file: {}", rel);
            matches.push(rel);
        }
    }
    Ok(matches)
}

/// Forward-slash form of a relative path, the display and sort key for bundles.
pub fn to_posix(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Non-empty and holding a null byte within the first [`BINARY_SNIFF_LEN`] bytes.
pub fn is_binary_file(path: &Path) -> Result<bool> {
    let file = File::open(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut head = Vec::with_capacity(BINARY_SNIFF_LEN as usize);
    file.take(BINARY_SNIFF_LEN)
        .read_to_end(&mut head)
        .map_err(|e| AppError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(head.contains(&0))
}

fn build_glob_set<'a, I>(patterns: I) -> Result<GlobSet>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut builder = GlobSetBuilder::new();
    for pattern_str in patterns {
        let mut processed_pattern = pattern_str.trim().to_string();
        if let Some(stripped) = processed_pattern.strip_prefix("./") {
            processed_pattern = stripped.to_string();
        }
        if processed_pattern.ends_with('/') && processed_pattern.len() > 1 {
            processed_pattern.push_str("**");
        }
        let glob = GlobBuilder::new(&processed_pattern)
            .literal_separator(true)
            .empty_alternates(true)
            .build()
            .map_err(|e| {
                log::error!("Invalid glob pattern \"{}\": {}", pattern_str, e);
                AppError::Glob(format!(
                    "Invalid glob pattern \"{}\" (processed as \"{}\"): {}",
                    pattern_str, processed_pattern, e
                ))
            })?;
        log::trace!(
            "Adding glob pattern: {} (processed as {})",
            pattern_str,
            processed_pattern
        );
        builder.add(glob);
    }
    builder.build().map_err(|e| {
        log::error!("Error building glob set: {}", e);
        AppError::Glob(e.to_string())
    })
}
