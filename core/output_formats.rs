//! Text layout of a rendered bundle: index block, file separators, prompt framing.

use crate::context::FileEntry;
use crate::error::{AppError, Result};
use serde::Serialize;

pub const EMPTY_INDEX: &str = "# Index\n# (empty)";
pub const PROMPT_DIVIDER: &str = "\n\n---\n\n";
/// Lines added around a prompt by [`PROMPT_DIVIDER`]: blank, `---`, blank.
pub const PROMPT_OVERHEAD_LINES: usize = 3;
/// Index title line plus the blank line before the first separator.
pub const INDEX_OVERHEAD_LINES: usize = 2;

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// `#==> [<i>] <path> <==`, with `position` 1-based.
pub fn format_separator(position: usize, path: &str) -> String {
    format!("#==> [{}] {} <==", position, path)
}

pub fn format_index_entry(position: usize, entry: &FileEntry) -> String {
    format!(
        "# [{}]  {}  L{}-L{} ({})",
        position,
        entry.path,
        entry.start_line,
        entry.end_line,
        plural(entry.lines, "line")
    )
}

/// Index title and one line per entry, without the trailing blank line.
pub fn format_index_block(entries: &[FileEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_INDEX.to_string();
    }
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(format!("# Index ({})", plural(entries.len(), "file")));
    lines.extend(
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format_index_entry(i + 1, entry)),
    );
    lines.join("\n")
}

/// Trimmed prompt text, or `None` when it is empty or whitespace-only.
pub fn normalize_prompt(prompt: Option<&str>) -> Option<&str> {
    prompt.map(str::trim).filter(|p| !p.is_empty())
}

pub fn frame_prompt(prompt: &str, rest: &str) -> String {
    format!("{}{}{}", prompt, PROMPT_DIVIDER, rest)
}

pub fn serialize_to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, AppError> {
    if pretty {
        serde_json::to_string_pretty(value).map_err(AppError::JsonSerialize)
    } else {
        serde_json::to_string(value).map_err(AppError::JsonSerialize)
    }
}
