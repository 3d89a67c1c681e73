//! Classification rules
//!
//! Each rule looks at one feature and the upstream fact sets and either
//! fires with a status or passes. Rules never read raw input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Feature, InventoryFile, Status, StatusResult, Table};

pub const GAP_TABLE_EXISTS: &str = "Database table exists.";
pub const GAP_TABLE_NO_COLUMNS: &str = "Table exists but has no columns defined in migrations.";
pub const GAP_FILES_FOUND: &str = "Related files found in codebase.";
pub const GAP_NO_UI_COMPONENT: &str = "Logic exists, but no UI component found.";
pub const GAP_NO_MIGRATION: &str = "Logic exists, but no database migration found.";
pub const GAP_NOT_FOUND: &str = "Feature not found in codebase or database.";
pub const GAP_MODIFIED: &str =
    "Original plan was to create, but implementation involved modification.";

/// Extensions removed from search terms before comparing against paths
const KNOWN_EXTENSIONS: &[&str] = &[".tsx", ".ts", ".sql"];

/// Terms this short are too generic to match on
const MIN_TERM_CHARS: usize = 3;

const MAX_EVIDENCE_FILES: usize = 3;

static FILE_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w+\.tsx|\w+\.ts|\w+\.sql\b").unwrap());

/// The facts a rule may consult
#[derive(Debug, Clone, Copy)]
pub struct RuleFacts<'a> {
    /// Aggregated tables, first-seen order
    pub tables: &'a [Table],
    /// Reconcilable inventory files, location order
    pub files: &'a [InventoryFile],
}

/// One step of the classification cascade
pub trait Rule {
    fn name(&self) -> &'static str;

    /// Return a classification if the rule fires
    fn evaluate(&self, feature: &Feature, facts: &RuleFacts<'_>) -> Option<StatusResult>;
}

/// A known table is named in the feature text
pub struct TableMatch;

impl Rule for TableMatch {
    fn name(&self) -> &'static str {
        "table_match"
    }

    fn evaluate(&self, feature: &Feature, facts: &RuleFacts<'_>) -> Option<StatusResult> {
        let title = feature.title.to_lowercase();
        let description = feature.description.to_lowercase();

        let table = facts.tables.iter().find(|t| {
            let name = t.name.to_lowercase();
            title.contains(&name) || description.contains(&name)
        })?;

        let evidence = format!("Table: {}", table.name);
        if table.columns.is_empty() {
            Some(StatusResult::new(
                Status::PartiallyComplete,
                GAP_TABLE_NO_COLUMNS,
                evidence,
            ))
        } else {
            Some(StatusResult::new(Status::Complete, GAP_TABLE_EXISTS, evidence))
        }
    }
}

/// Inventory paths contain words of the feature
pub struct FileMatch;

/// Search terms for file matching: file-name tokens of the description
/// followed by the title words, lower-cased, extensions removed.
pub fn search_terms(title: &str, description: &str) -> Vec<String> {
    FILE_TOKEN_REGEX
        .find_iter(description)
        .map(|m| m.as_str())
        .chain(title.split_whitespace())
        .filter(|term| term.chars().count() > MIN_TERM_CHARS)
        .map(|term| {
            KNOWN_EXTENSIONS
                .iter()
                .fold(term.to_lowercase(), |acc, ext| acc.replace(ext, ""))
        })
        .collect()
}

impl Rule for FileMatch {
    fn name(&self) -> &'static str {
        "file_match"
    }

    fn evaluate(&self, feature: &Feature, facts: &RuleFacts<'_>) -> Option<StatusResult> {
        let terms = search_terms(&feature.title, &feature.description);

        let found: Vec<&str> = facts
            .files
            .iter()
            .map(|f| f.path.as_str())
            .filter(|path| {
                let path = path.to_lowercase();
                terms.iter().any(|term| path.contains(term.as_str()))
            })
            .collect();

        if found.is_empty() {
            return None;
        }

        let evidence = format!(
            "Files: {}",
            found
                .iter()
                .take(MAX_EVIDENCE_FILES)
                .copied()
                .collect::<Vec<_>>()
                .join(", ")
        );

        let title = feature.title.to_lowercase();
        let gap = if title.contains("create")
            && title.contains("component")
            && !found.iter().any(|f| f.contains(".tsx"))
        {
            Some(GAP_NO_UI_COMPONENT)
        } else if title.contains("database") && !found.iter().any(|f| f.contains(".sql")) {
            Some(GAP_NO_MIGRATION)
        } else {
            None
        };

        Some(match gap {
            Some(gap) => StatusResult::new(Status::PartiallyComplete, gap, evidence),
            None => StatusResult::new(Status::Complete, GAP_FILES_FOUND, evidence),
        })
    }
}

/// Fallback when nothing else fired
pub struct NotFound;

impl Rule for NotFound {
    fn name(&self) -> &'static str {
        "not_found"
    }

    fn evaluate(&self, _feature: &Feature, _facts: &RuleFacts<'_>) -> Option<StatusResult> {
        Some(not_started())
    }
}

pub(crate) fn not_started() -> StatusResult {
    StatusResult::new(Status::NotStarted, GAP_NOT_FOUND, "")
}

/// Reclassify a Complete result as Modified when the title talks about
/// changing existing work. The rule that produced Complete is not consulted.
pub fn apply_modified_override(title: &str, result: StatusResult) -> StatusResult {
    let title = title.to_lowercase();
    let changes_existing = title.contains("refactor") || title.contains("update");
    if result.status == Status::Complete && changes_existing {
        StatusResult {
            status: Status::Modified,
            gap: GAP_MODIFIED.to_string(),
            evidence: result.evidence,
        }
    } else {
        result
    }
}
