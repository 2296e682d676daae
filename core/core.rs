pub mod bundle;
pub mod config;
pub mod context;
pub mod error;
pub mod gather;
pub mod output_formats;
pub mod patterns;
pub mod rules;

pub use bundle::{
    BundleOptions, BundleResult, bundle_one, bundle_with_options, create_bundle, render_bundle,
};
pub use config::{Config, resolve_prompt};
pub use context::{FileEntry, LoadedFile, count_lines};
pub use error::{AppError, Result};
pub use gather::{resolve_pattern_set, resolve_patterns};
pub use patterns::{PatternSet, PatternSpec};
pub use rules::IgnoreRules;
