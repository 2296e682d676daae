use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Directory to start config discovery from (default: $PROJECT_ROOT or current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        help = "Path to the config file (default: nearest srcpack.toml).",
        value_name = "CONFIG_FILE",
        help_heading = "Project Setup"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatOutputOpts {
    #[arg(short = 'f', long, help = "Set the output format [default: text].", value_name = "FORMAT", value_parser = ["text", "json"], help_heading = "Output Formatting")]
    pub format: Option<String>,

    #[arg(
        long,
        help = "Emit compact JSON instead of pretty-printed.",
        help_heading = "Output Formatting"
    )]
    pub compact: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble project files into numbered, indexed text bundles.",
    long_about = "srcpack resolves glob patterns against a project tree (honoring .gitignore), \nconcatenates the matching text files with separators, and prefixes an index \nthat points at the exact line range of every file.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  srcpack generate\n  srcpack generate web docs --dry-run\n  srcpack quick 'src/**/*.rs' '!**/tests/**'\n  srcpack metrics web -f json",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Build configured bundles and write them to their outfiles."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "q",
        about = "Bundle ad-hoc patterns to stdout without a config file."
    )]
    Quick(QuickArgs),

    #[command(
        visible_alias = "d",
        about = "Show the effective config, normalized patterns and resolved files."
    )]
    Debug(DebugArgs),

    #[command(
        visible_alias = "m",
        about = "Show per-file line counts and line ranges of bundles."
    )]
    Metrics(MetricsArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(value_name = "BUNDLE", help = "Bundles to build (default: all, in config order).")]
    pub bundles: Vec<String>,

    #[arg(
        long,
        help = "Print bundle content to standard output instead of writing outfiles.",
        help_heading = "Output Control"
    )]
    pub stdout: bool,

    #[arg(
        long,
        help = "Assemble bundles and report them without writing anything.",
        help_heading = "Output Control",
        conflicts_with = "stdout"
    )]
    pub dry_run: bool,

    #[arg(
        long,
        help = "Omit the index header from every bundle.",
        help_heading = "Output Control"
    )]
    pub no_index: bool,
}

#[derive(Args, Debug, Clone)]
pub struct QuickArgs {
    #[arg(
        long,
        help = "Directory the patterns are resolved against (default: $PROJECT_ROOT or current dir).",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        required = true,
        value_name = "PATTERN",
        help = "Glob patterns; prefix '!' to exclude, '+' to force-include (e.g. 'src/**/*.rs' '!**/*.test.rs')"
    )]
    pub patterns: Vec<String>,

    #[arg(long, help = "Omit the index header.")]
    pub no_index: bool,

    #[arg(
        long,
        value_name = "TEXT",
        help = "Prompt placed before the bundle; values starting with ./ ../ / or ~/ are read from that file."
    )]
    pub prompt: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(value_name = "BUNDLE", help = "Bundles to inspect (default: all).")]
    pub bundles: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(value_name = "BUNDLE", help = "Bundles to measure (default: all).")]
    pub bundles: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        value_parser = ["fish", "bash", "zsh"],
        help = "Shell to generate completions for [default: fish]"
    )]
    pub shell: Option<String>,
    #[arg(
        long,
        help = "Save completion script to the default location (prompts before overwriting)."
    )]
    pub save: bool,
}
