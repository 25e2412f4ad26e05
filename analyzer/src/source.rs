//! Turning an editor buffer or a file on disk into numbered lines.
//!
//! Every stage works on the same view of the input: the whole buffer is
//! trimmed, split on `\n`, and each line is trimmed again. Blank lines in
//! the middle of a buffer are kept, and numbering counts the blank lines
//! trimmed off the top, so report entries stay aligned with the lines the
//! user sees.

use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// One line of input, trimmed, with its 1-based position in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

pub type SourceLines = Vec<SourceLine>;

/// Trims the buffer the way the editor hands it over.
///
/// Returns `None` when nothing but whitespace is left, which every stage
/// reports with its "nothing to analyze" sentinel.
pub fn normalize(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Splits already trimmed text, numbering its first line `first`.
pub fn lines(text: &str, first: usize) -> SourceLines {
    text.split('\n')
        .enumerate()
        .map(|(index, line)| SourceLine {
            number: first + index,
            text: line.trim().to_string(),
        })
        .collect()
}

/// The lines every stage classifies, or `None` for a blank buffer.
pub fn numbered(source: &str) -> Option<SourceLines> {
    let text = normalize(source)?;
    let leading = &source[..source.len() - source.trim_start().len()];
    Some(lines(text, leading.matches('\n').count() + 1))
}

/// Reads a source file, converting `\r\n` and lone `\r` line endings to `\n`.
pub fn load(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| LoadError::NotUtf8 {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(text.replace("\r\n", "\n").replace('\r', "\n"))
}
