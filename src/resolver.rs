//! Selects which rule file governs a mock directory.
//!
//! Every lookup re-reads the directory: the user override and the set of
//! rule files on disk can both change between requests.

use crate::constants::{
    DEFAULT_PARSER_FILE, DEFAULT_SCRIPT_PARSER_FILE, PARSER_FILE_PREFIX, SCRIPT_PARSER_EXTENSION,
    YAML_PARSER_EXTENSION,
};
use crate::error::MockError;
use serde::Serialize;
use std::path::Path;

/// Rule files available to a mock, plus which one is in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserFileSet {
    /// File actually used for evaluation.
    pub current: String,
    /// File the user asked for, kept even when it did not resolve.
    pub user: String,
    /// Every candidate rule file in the directory, sorted by name.
    pub parsers: Vec<String>,
}

/// Resolve the active rule file for a mock directory.
///
/// The requested file wins whenever it exists on disk, even if it does not
/// follow the candidate naming convention. Otherwise the fallback priority
/// is `parser-default.rhai`, then `parser-default.yml`, then the
/// lexicographically smallest candidate.
pub async fn resolve(directory: &Path, requested: &str) -> Result<ParserFileSet, MockError> {
    let parsers = candidate_files(directory).await?;
    if parsers.is_empty() {
        return Err(MockError::ParserNotFound(directory.to_path_buf()));
    }

    let current = if file_exists(&directory.join(requested)).await {
        requested.to_string()
    } else {
        highest_priority(&parsers).to_string()
    };

    Ok(ParserFileSet {
        current,
        user: requested.to_string(),
        parsers,
    })
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Non-recursive listing of rule file candidates: plain files named
/// `parser-*` with a recognized extension.
async fn candidate_files(directory: &Path) -> Result<Vec<String>, MockError> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(directory).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_candidate(&name) {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

fn is_candidate(name: &str) -> bool {
    if !name.starts_with(PARSER_FILE_PREFIX) {
        return false;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ext.eq_ignore_ascii_case(SCRIPT_PARSER_EXTENSION)
                || ext.eq_ignore_ascii_case(YAML_PARSER_EXTENSION)
        })
}

fn highest_priority(parsers: &[String]) -> &str {
    for preferred in [DEFAULT_SCRIPT_PARSER_FILE, DEFAULT_PARSER_FILE] {
        if parsers.iter().any(|f| f == preferred) {
            return preferred;
        }
    }
    // `parsers` is sorted and non-empty here.
    &parsers[0]
}
