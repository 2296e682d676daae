//! Bundle pattern specifications and their normalized form.
//!
//! A bundle is declared as a single pattern, a list of patterns, or a table
//! carrying `include` plus rendering options. [`PatternSet::from_spec`] turns
//! any of those into one canonical shape; later stages never look at the
//! original variant again.

use indexmap::IndexSet;
use log;
use serde::{Deserialize, Serialize};

pub const EXCLUDE_PREFIX: char = '!';
pub const FORCE_PREFIX: char = '+';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Single(String),
    List(Vec<String>),
    Detailed(DetailedSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedSpec {
    pub include: PatternList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outfile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternList {
    One(String),
    Many(Vec<String>),
}

impl PatternList {
    pub fn as_slice(&self) -> &[String] {
        match self {
            PatternList::One(pattern) => std::slice::from_ref(pattern),
            PatternList::Many(patterns) => patterns,
        }
    }
}

impl PatternSpec {
    /// Raw pattern strings in declaration order, prefixes intact.
    pub fn raw_patterns(&self) -> &[String] {
        match self {
            PatternSpec::Single(pattern) => std::slice::from_ref(pattern),
            PatternSpec::List(patterns) => patterns,
            PatternSpec::Detailed(detailed) => detailed.include.as_slice(),
        }
    }

    pub fn include_index(&self) -> bool {
        match self {
            PatternSpec::Detailed(detailed) => detailed.index.unwrap_or(true),
            _ => true,
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            PatternSpec::Detailed(detailed) => detailed.prompt.as_deref(),
            _ => None,
        }
    }

    pub fn outfile(&self) -> Option<&str> {
        match self {
            PatternSpec::Detailed(detailed) => detailed.outfile.as_deref(),
            _ => None,
        }
    }
}

impl From<&str> for PatternSpec {
    fn from(pattern: &str) -> Self {
        PatternSpec::Single(pattern.to_string())
    }
}

impl From<Vec<String>> for PatternSpec {
    fn from(patterns: Vec<String>) -> Self {
        PatternSpec::List(patterns)
    }
}

/// Patterns classified by their leading character.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PatternSet {
    pub include: IndexSet<String>,
    pub exclude: IndexSet<String>,
    pub force: IndexSet<String>,
}

impl PatternSet {
    pub fn from_spec(spec: &PatternSpec) -> Self {
        Self::from_patterns(spec.raw_patterns())
    }

    /// Only the first character is inspected, so `!+a` excludes the literal `+a`.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut set = PatternSet::default();
        for raw in patterns {
            let raw = raw.as_ref();
            if let Some(stripped) = raw.strip_prefix(EXCLUDE_PREFIX) {
                set.exclude.insert(stripped.to_string());
            } else if let Some(stripped) = raw.strip_prefix(FORCE_PREFIX) {
                set.force.insert(stripped.to_string());
            } else {
                set.include.insert(raw.to_string());
            }
        }
        log::trace!(
            "Normalized patterns: {} include, {} exclude, {} force",
            set.include.len(),
            set.exclude.len(),
            set.force.len()
        );
        set
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.force.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(set: &IndexSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn classifies_by_first_character() {
        let set = PatternSet::from_patterns(&["src/**/*.rs", "!**/*.snap", "+dist/app.js", "README.md"]);
        assert_eq!(collect(&set.include), vec!["src/**/*.rs", "README.md"]);
        assert_eq!(collect(&set.exclude), vec!["**/*.snap"]);
        assert_eq!(collect(&set.force), vec!["dist/app.js"]);
    }

    #[test]
    fn combined_prefixes_are_not_interpreted() {
        let set = PatternSet::from_patterns(&["!+generated/**", "+!weird"]);
        assert_eq!(collect(&set.exclude), vec!["+generated/**"]);
        assert_eq!(collect(&set.force), vec!["!weird"]);
        assert!(set.include.is_empty());
    }

    #[test]
    fn keeps_first_occurrence_order() {
        let set = PatternSet::from_patterns(&["b/**", "a/**", "b/**"]);
        assert_eq!(collect(&set.include), vec!["b/**", "a/**"]);
    }

    #[derive(Deserialize)]
    struct Holder {
        v: PatternSpec,
    }

    fn parse(toml_text: &str) -> PatternSpec {
        toml::from_str::<Holder>(toml_text).unwrap().v
    }

    #[test]
    fn all_spec_shapes_normalize_the_same() {
        let single = parse("v = \"src/**\"");
        let list = parse("v = [\"src/**\"]");
        let detailed = parse("v = { include = \"src/**\" }");

        assert!(matches!(single, PatternSpec::Single(_)));
        assert!(matches!(list, PatternSpec::List(_)));
        assert!(matches!(detailed, PatternSpec::Detailed(_)));
        let expected = PatternSet::from_spec(&single);
        assert_eq!(PatternSet::from_spec(&list), expected);
        assert_eq!(PatternSet::from_spec(&detailed), expected);
    }

    #[test]
    fn detailed_spec_exposes_options() {
        let spec = PatternSpec::Detailed(DetailedSpec {
            include: PatternList::Many(vec!["docs/**".into()]),
            outfile: Some("out/docs.txt".into()),
            index: Some(false),
            prompt: Some("Review this.".into()),
        });
        assert!(!spec.include_index());
        assert_eq!(spec.prompt(), Some("Review this."));
        assert_eq!(spec.outfile(), Some("out/docs.txt"));
        assert!(PatternSpec::from("x").include_index());
    }

    #[test]
    fn empty_when_no_include_or_force() {
        assert!(PatternSet::from_patterns(&["!a"]).is_empty());
        assert!(!PatternSet::from_patterns(&["+a"]).is_empty());
    }
}
