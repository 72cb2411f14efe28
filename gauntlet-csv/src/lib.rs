// CSV line de-duplication helpers.
//
// Deliberately simple collaborator: a pure de-duplication pass over ordered
// lines plus thin file wrappers. Sequential, single-pass, no concurrency.
// Callers are expected to log wrapper errors and degrade (empty input,
// skipped write) rather than abort.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Errors from the file wrappers.
#[derive(Error, Debug)]
pub enum CsvError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
}

/// Removes duplicate lines while preserving the header row and the
/// first-occurrence order of everything after it.
pub fn deduplicate(lines: Vec<String>) -> Vec<String> {
    let mut lines = lines.into_iter();
    let Some(header) = lines.next() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut result = vec![header];
    for line in lines {
        if seen.insert(line.clone()) {
            result.push(line);
        }
    }
    result
}

/// Reads a CSV file into trimmed lines, dropping empty and comma-only
/// rows.
pub fn read_lines(path: &Path) -> Result<Vec<String>, CsvError> {
    let content = fs::read_to_string(path).map_err(|source| CsvError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !is_blank_row(line))
        .map(str::to_string)
        .collect())
}

// An empty line is all-whitespace, so this covers both filters.
fn is_blank_row(line: &str) -> bool {
    line.chars().all(|c| c == ',' || c.is_whitespace())
}

/// Writes lines to `path`, one per line with a trailing newline.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<(), CsvError> {
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content).map_err(|source| CsvError::Write {
        path: path.display().to_string(),
        source,
    })
}
