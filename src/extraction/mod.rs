//! Fact extraction module
//!
//! Uses regex pattern families to harvest structured facts from
//! semi-structured text:
//! - Schema facts from migration SQL (tables, indexes, functions, triggers)
//! - Features, planned tables and component references from planning documents
//!
//! Extraction is best-effort. Nothing here parses the grammar it scans.

pub mod documents;
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use walkdir::WalkDir;

use crate::error::{AuditError, Result};

pub use documents::{analyze_document, extract_components, extract_features, phase_for};
pub use schema::{
    analyze_migration, extract_functions, extract_indexes, extract_tables, extract_triggers,
};

/// Compile a file-name glob
pub(crate) fn file_glob(pattern: &str) -> Result<GlobMatcher> {
    Ok(Glob::new(pattern)?.compile_matcher())
}

/// List files directly inside `dir` whose name matches `pattern`, sorted by name
pub fn list_matching(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = file_glob(pattern)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| AuditError::io(dir, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Read a text input; failure is fatal for the run
pub(crate) fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| AuditError::io(path, e))
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Truncate to at most `max` characters
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
