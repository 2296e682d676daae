use crate::error::{AppError, Result};
use log;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A resolved file read into memory, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub path: String,
    /// File text with at most one trailing `\n` removed.
    pub content: String,
    pub lines: usize,
    pub size: usize,
}

impl LoadedFile {
    pub fn from_text(path: impl Into<String>, text: String) -> Self {
        let lines = count_lines(&text);
        let size = text.len();
        let content = match text.strip_suffix('\n') {
            Some(stripped) => stripped.to_string(),
            None => text,
        };
        Self {
            path: path.into(),
            content,
            lines,
            size,
        }
    }
}

/// One bundled file and the 1-indexed, inclusive lines its content occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub path: String,
    pub lines: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl FileEntry {
    pub fn shifted(mut self, offset: usize) -> Self {
        self.start_line += offset;
        self.end_line += offset;
        self
    }
}

/// `0` for empty text, otherwise newlines plus one for an unterminated last line.
pub fn count_lines(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    let newlines = text.bytes().filter(|b| *b == b'\n').count();
    if text.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

pub fn load_file(root: &Path, rel: &str) -> Result<LoadedFile> {
    let path = root.join(rel);
    let bytes = fs::read(&path).map_err(|e| AppError::FileRead {
        path: path.clone(),
        source: e,
    })?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("Decoding non-UTF-8 file lossily: {}", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(LoadedFile::from_text(rel, text))
}

/// Reads every path in parallel; output order matches `paths`.
/// The first failure aborts the whole load.
pub fn load_files(paths: &[String], root: &Path) -> Result<Vec<LoadedFile>> {
    log::debug!("Reading {} files from {}", paths.len(), root.display());
    paths
        .par_iter()
        .map(|rel| load_file(root, rel))
        .collect::<Result<Vec<_>>>()
}

/// Line ranges assuming no header: file `i`'s separator sits on the line
/// after file `i-1` ends, and its content starts one line below that.
pub fn assign_line_ranges(files: &[LoadedFile]) -> Vec<FileEntry> {
    files
        .iter()
        .scan(1usize, |current_line, file| {
            let start_line = *current_line + 1;
            let end_line = start_line + file.lines.saturating_sub(1);
            *current_line = end_line + 1;
            Some(FileEntry {
                path: file.path.clone(),
                lines: file.lines,
                start_line,
                end_line,
            })
        })
        .collect()
}
