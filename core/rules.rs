//! Ignore-rule evaluation for a bundle's working directory.

use crate::error::{AppError, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log;
use std::fs;
use std::path::Path;

pub const IGNORE_FILENAME: &str = ".gitignore";

/// Parsed ignore rules plus the directory names that may be skipped during traversal.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    matcher: Gitignore,
    prune_dirs: Vec<String>,
    has_negation: bool,
}

impl IgnoreRules {
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            prune_dirs: Vec::new(),
            has_negation: false,
        }
    }

    /// Reads `.gitignore` from `root`; a missing file yields an empty rule set.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(IGNORE_FILENAME);
        if !path.is_file() {
            log::debug!("No {} found in {}", IGNORE_FILENAME, root.display());
            return Ok(Self::empty());
        }
        let text = fs::read_to_string(&path).map_err(|e| AppError::FileRead {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("Loading ignore rules from {}", path.display());
        Self::from_text(root, &text)
    }

    pub fn from_text(root: &Path, text: &str) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        let mut has_negation = false;
        let mut simple_dirs = Vec::new();

        for line in text.lines() {
            builder.add_line(None, line)?;
            let trimmed = line.trim_end();
            if trimmed.trim_start().is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.trim_start().starts_with('!') {
                has_negation = true;
                continue;
            }
            if let Some(name) = simple_dir_name(trimmed) {
                simple_dirs.push(name.to_string());
            }
        }

        let matcher = builder.build()?;
        let prune_dirs = if has_negation {
            log::debug!("Negation rule present, traversal pruning disabled");
            Vec::new()
        } else {
            simple_dirs
        };
        log::trace!(
            "Ignore rules: {} globs, prune dirs {:?}",
            matcher.num_ignores(),
            prune_dirs
        );

        Ok(Self {
            matcher,
            prune_dirs,
            has_negation,
        })
    }

    /// `rel` is relative to the working directory. Parent directories are
    /// checked first: a file under an ignored directory stays ignored even
    /// when a later negation names the file itself.
    pub fn is_ignored(&self, rel: &Path, is_dir: bool) -> bool {
        let parent_ignored = rel
            .ancestors()
            .skip(1)
            .filter(|parent| !parent.as_os_str().is_empty())
            .any(|parent| self.matcher.matched(parent, true).is_ignore());
        parent_ignored || self.matcher.matched(rel, is_dir).is_ignore()
    }

    pub fn has_negation(&self) -> bool {
        self.has_negation
    }

    pub fn prune_dirs(&self) -> &[String] {
        &self.prune_dirs
    }

    /// Globs matching any directory whose name is a prunable rule.
    pub fn prune_globs(&self) -> Vec<String> {
        self.prune_dirs
            .iter()
            .flat_map(|name| [name.clone(), format!("**/{}", name)])
            .collect()
    }
}

/// Returns the bare name for rules like `node_modules` or `target/`.
/// Anything anchored, nested, escaped, or wildcarded is left to the full evaluator.
fn simple_dir_name(rule: &str) -> Option<&str> {
    let name = rule.strip_suffix('/').unwrap_or(rule);
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    if name.contains(['/', '*', '?', '[', ']', '{', '}', '\\']) {
        return None;
    }
    if name != name.trim() {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn rules(text: &str) -> IgnoreRules {
        IgnoreRules::from_text(&PathBuf::from("/work"), text).unwrap()
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let r = rules("# build output\n\n*.log\n");
        assert!(r.is_ignored(Path::new("debug.log"), false));
        assert!(r.is_ignored(Path::new("nested/trace.log"), false));
        assert!(!r.is_ignored(Path::new("# build output"), false));
    }

    #[test]
    fn directory_rules_ignore_descendants() {
        let r = rules("dist/\n");
        assert!(r.is_ignored(Path::new("dist/app.js"), false));
        assert!(r.is_ignored(Path::new("pkg/dist/app.js"), false));
        assert!(!r.is_ignored(Path::new("dist"), false));
    }

    #[test]
    fn later_negation_reincludes() {
        let r = rules("build/**\n!build/keep.txt\n");
        assert!(r.has_negation());
        assert!(r.is_ignored(Path::new("build/drop.txt"), false));
        assert!(!r.is_ignored(Path::new("build/keep.txt"), false));
    }

    #[test]
    fn negation_cannot_escape_ignored_directory() {
        let r = rules("build/\n!build/keep.txt\n");
        assert!(r.is_ignored(Path::new("build/keep.txt"), false));
        assert!(r.is_ignored(Path::new("build/nested/keep.txt"), false));
        assert!(!r.is_ignored(Path::new("src/keep.txt"), false));
    }

    #[test]
    fn prune_dirs_only_from_simple_rules() {
        let r = rules("node_modules\ntarget/\n/anchored\nsrc/gen\n*.tmp\nfoo?\n");
        assert_eq!(r.prune_dirs(), &["node_modules".to_string(), "target".to_string()]);
        assert_eq!(
            r.prune_globs(),
            vec!["node_modules", "**/node_modules", "target", "**/target"]
        );
    }

    #[test]
    fn any_negation_disables_pruning() {
        let r = rules("node_modules\n!node_modules/keep.js\n");
        assert!(r.prune_dirs().is_empty());
        assert!(r.prune_globs().is_empty());
    }

    #[test]
    fn missing_file_is_empty_rule_set() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let r = IgnoreRules::load(temp.path())?;
        assert!(!r.is_ignored(Path::new("anything.txt"), false));
        assert!(r.prune_dirs().is_empty());
        Ok(())
    }
}
