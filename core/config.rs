use crate::error::{AppError, Result};
use crate::patterns::PatternSpec;
use indexmap::IndexMap;
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "srcpack.toml";
pub const DEFAULT_OUT_DIR: &str = ".srcpack";
pub const OUTFILE_EXTENSION: &str = "txt";

const PROMPT_PATH_PREFIXES: [&str; 4] = ["./", "../", "/", "~/"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default)]
    pub bundles: IndexMap<String, PatternSpec>,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            bundles: IndexMap::new(),
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    /// An explicit path wins; otherwise the nearest `srcpack.toml` at or above `start`.
    pub fn resolve_config_path(start: &Path, cli_config_file: Option<&Path>) -> Result<PathBuf> {
        if let Some(explicit) = cli_config_file {
            let path = expand_path(&explicit.to_string_lossy(), start);
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Specified config file not found at path: {}",
                    path.display()
                )));
            }
            log::debug!("Using specified config file path: {}", path.display());
            return Ok(path);
        }

        for dir in start.ancestors() {
            let candidate = dir.join(DEFAULT_CONFIG_FILENAME);
            if candidate.is_file() {
                log::debug!("Found config file: {}", candidate.display());
                return Ok(candidate);
            }
            log::trace!("No config in {}", dir.display());
        }
        Err(AppError::Config(format!(
            "No {} found in {} or any parent directory",
            DEFAULT_CONFIG_FILENAME,
            start.display()
        )))
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_content).map_err(|e| {
            AppError::TomlParse(format!("{}. Check TOML syntax and structure.", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bundles.is_empty() {
            return Err(AppError::Config(
                "No bundles defined. Add at least one entry under [bundles].".to_string(),
            ));
        }
        for name in self.bundles.keys() {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(AppError::Config(format!(
                    "Invalid bundle name \"{}\": names must be non-empty and contain no path separators",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn bundle(&self, name: &str) -> Result<&PatternSpec> {
        self.bundles
            .get(name)
            .ok_or_else(|| self.unknown_bundle(name))
    }

    fn unknown_bundle(&self, name: &str) -> AppError {
        AppError::UnknownBundle(format!(
            "\"{}\" (available: {})",
            name,
            self.bundle_names().join(", ")
        ))
    }

    pub fn bundle_names(&self) -> Vec<&str> {
        self.bundles.keys().map(String::as_str).collect()
    }

    /// All bundles in declaration order when `names` is empty, otherwise the named ones.
    pub fn selected_bundles(&self, names: &[String]) -> Result<Vec<(&str, &PatternSpec)>> {
        if names.is_empty() {
            return Ok(self
                .bundles
                .iter()
                .map(|(name, spec)| (name.as_str(), spec))
                .collect());
        }
        names
            .iter()
            .map(|name| {
                self.bundles
                    .get_key_value(name.as_str())
                    .map(|(key, spec)| (key.as_str(), spec))
                    .ok_or_else(|| self.unknown_bundle(name))
            })
            .collect()
    }

    /// The bundle's `outfile`, or `<out_dir>/<name>.txt`, anchored at `root`.
    pub fn resolve_outfile(&self, name: &str, spec: &PatternSpec, root: &Path) -> PathBuf {
        match spec.outfile() {
            Some(outfile) => expand_path(outfile, root),
            None => {
                let out_dir = expand_path(&self.out_dir.to_string_lossy(), root);
                out_dir.join(format!("{}.{}", name, OUTFILE_EXTENSION))
            }
        }
    }
}

/// Tilde-expands `raw` and anchors relative results at `base`.
pub fn expand_path(raw: &str, base: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Values starting with `./`, `../`, `/` or `~/` name a prompt file; anything
/// else is the prompt text itself.
pub fn resolve_prompt(value: Option<&str>, root: &Path) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if !PROMPT_PATH_PREFIXES
        .iter()
        .any(|prefix| value.starts_with(prefix))
    {
        return Ok(Some(value.to_string()));
    }
    let path = expand_path(value, root);
    log::debug!("Reading prompt from {}", path.display());
    fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| AppError::PromptFile { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
out_dir = "build/bundles"

[bundles]
web = "apps/web/**/*"
api = ["apps/api/**/*.ts", "!**/*.test.ts"]

[bundles.docs]
include = ["docs/**/*.md", "+vendor/notes.md"]
outfile = "out/docs.txt"
index = false
prompt = "Summarize."
"#;

    #[test]
    fn parses_all_bundle_shapes_in_order() -> Result<()> {
        let config = Config::from_toml_str(SAMPLE)?;
        assert_eq!(config.bundle_names(), vec!["web", "api", "docs"]);
        assert!(matches!(config.bundle("web")?, PatternSpec::Single(_)));
        assert!(matches!(config.bundle("api")?, PatternSpec::List(_)));
        let docs = config.bundle("docs")?;
        assert!(!docs.include_index());
        assert_eq!(docs.prompt(), Some("Summarize."));
        Ok(())
    }

    #[test]
    fn rejects_empty_and_unknown_fields() {
        assert!(matches!(
            Config::from_toml_str("out_dir = \"x\""),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[bundles]\nweb = \"*\"\n[extra]\nkey = 1"),
            Err(AppError::TomlParse(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[bundles.web]\ninclude = \"*\"\nbogus = true"),
            Err(AppError::TomlParse(_))
        ));
    }

    #[test]
    fn selects_bundles_by_name() -> Result<()> {
        let config = Config::from_toml_str(SAMPLE)?;
        let all = config.selected_bundles(&[])?;
        assert_eq!(all.len(), 3);
        let picked = config.selected_bundles(&["docs".to_string(), "web".to_string()])?;
        assert_eq!(picked[0].0, "docs");
        assert_eq!(picked[1].0, "web");
        let err = config.selected_bundles(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, AppError::UnknownBundle(_)));
        Ok(())
    }

    #[test]
    fn outfile_defaults_and_overrides() -> Result<()> {
        let config = Config::from_toml_str(SAMPLE)?;
        let root = Path::new("/repo");
        assert_eq!(
            config.resolve_outfile("web", config.bundle("web")?, root),
            PathBuf::from("/repo/build/bundles/web.txt")
        );
        assert_eq!(
            config.resolve_outfile("docs", config.bundle("docs")?, root),
            PathBuf::from("/repo/out/docs.txt")
        );
        Ok(())
    }

    #[test]
    fn finds_config_in_ancestor() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::write(root.join(DEFAULT_CONFIG_FILENAME), "[bundles]\nall = \"**/*\"\n")?;
        let nested = root.join("a/b");
        fs::create_dir_all(&nested)?;

        let found = Config::resolve_config_path(&nested, None)?;
        assert_eq!(found, root.join(DEFAULT_CONFIG_FILENAME));

        let missing = Config::resolve_config_path(&nested, Some(Path::new("nope.toml")));
        assert!(matches!(missing, Err(AppError::Config(_))));
        Ok(())
    }

    #[test]
    fn prompt_inline_or_from_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("prompts"))?;
        fs::write(root.join("prompts/review.md"), "Review carefully.\n")?;

        assert_eq!(resolve_prompt(None, root)?, None);
        assert_eq!(
            resolve_prompt(Some("Explain the code."), root)?,
            Some("Explain the code.".to_string())
        );
        assert_eq!(
            resolve_prompt(Some("./prompts/review.md"), root)?,
            Some("Review carefully.\n".to_string())
        );
        let err = resolve_prompt(Some("./prompts/missing.md"), root).unwrap_err();
        assert!(matches!(err, AppError::PromptFile { .. }));
        Ok(())
    }
}
