//! Minimal unified-diff summarisation.
//!
//! Not a diff AST: a file section is reduced to its file name, the added
//! and removed line text, and the last hunk header seen.

use serde::Serialize;

const FILE_HEADER: &str = "diff --git ";

/// Why a diff section could not be summarised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffFormatError {
    /// The text does not start with a `diff --git` header.
    #[error("diff does not start with a `diff --git` header")]
    MissingHeader,
    /// The header is present but names no `a/` and `b/` paths.
    #[error("malformed diff header `{header}`")]
    MalformedHeader {
        /// Offending header line.
        header: String,
    },
}

/// Summary of one file section of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Path on the `b/` side of the header.
    pub file_name: String,
    /// Added lines without their `+` marker, newline separated.
    pub added_content: String,
    /// Removed lines without their `-` marker, newline separated.
    pub removed_content: String,
    /// Last `@@` hunk header seen, if any.
    pub last_hunk_header: Option<String>,
}

/// Summarise a single-file diff section.
///
/// `---`/`+++` lines are treated as file headers only before the first hunk;
/// inside a hunk they are ordinary removed or added content.
///
/// # Errors
/// Returns [`DiffFormatError`] when the header is absent or malformed.
pub fn parse_diff(text: &str) -> Result<DiffSummary, DiffFormatError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(DiffFormatError::MissingHeader)?;
    let file_name = file_name_from_header(header)?;

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut last_hunk_header = None;
    for line in lines {
        if line.starts_with("@@") {
            last_hunk_header = Some(line.to_owned());
            continue;
        }
        if last_hunk_header.is_none() && (line.starts_with("+++") || line.starts_with("---")) {
            continue;
        }
        if let Some(content) = line.strip_prefix('+') {
            added.push(content);
        } else if let Some(content) = line.strip_prefix('-') {
            removed.push(content);
        }
    }

    Ok(DiffSummary {
        file_name,
        added_content: added.join("\n"),
        removed_content: removed.join("\n"),
        last_hunk_header,
    })
}

fn file_name_from_header(header: &str) -> Result<String, DiffFormatError> {
    let paths = header
        .strip_prefix(FILE_HEADER)
        .ok_or(DiffFormatError::MissingHeader)?;
    let malformed = || DiffFormatError::MalformedHeader {
        header: header.to_owned(),
    };
    let after_a = paths.strip_prefix("a/").ok_or_else(malformed)?;
    let (_, file_name) = after_a.rsplit_once(" b/").ok_or_else(malformed)?;
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(malformed());
    }
    Ok(file_name.to_owned())
}

/// Split a multi-file diff into per-file sections.
///
/// Text before the first header is returned as its own section so the caller
/// sees it fail [`parse_diff`] rather than having it silently dropped.
#[must_use]
pub fn split_diff_files(text: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = text
        .match_indices(FILE_HEADER)
        .map(|(index, _)| index)
        .filter(|&index| index == 0 || text.get(..index).is_some_and(|before| before.ends_with('\n')))
        .collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    let mut sections = Vec::with_capacity(starts.len());
    let ends = starts.iter().skip(1).copied().chain(std::iter::once(text.len()));
    for (start, end) in starts.iter().copied().zip(ends) {
        if let Some(section) = text.get(start..end) {
            if !section.trim().is_empty() {
                sections.push(section);
            }
        }
    }
    sections
}
