//! Feature and component extraction from planning documents

use std::collections::BTreeSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{info, warn};

use crate::error::{AuditError, Result};
use crate::types::{DocumentFacts, Feature, PlannedColumn, PlannedTable, SpecificationFacts};

use super::schema::TABLE_REGEX;
use super::{file_name, list_matching, read_input, truncate_chars};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Phase used when a document name carries no phase number
pub const DEFAULT_PHASE: &str = "Master";

static PHASE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"phase(\d+)").unwrap());

static CODE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```\w*\n(.*?)```").unwrap());

static COMPONENT_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\w+\.tsx)",
        r"(\w+\.ts)",
        r"<(\w+)\s",
        r"import\s+\{?\s*(\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// One family of feature markers.
///
/// `head` matches the marker up to and including the first character of the
/// body (the last capture group). The feature then runs until the next
/// `terminator` or the end of the text.
struct FeaturePattern {
    head: Regex,
    terminator: &'static str,
    /// Whether the title is a label captured inside the head
    labelled: bool,
}

impl FeaturePattern {
    fn new(head: &str, terminator: &'static str, labelled: bool) -> Self {
        Self {
            head: Regex::new(head).unwrap(),
            terminator,
            labelled,
        }
    }

    /// Yield (title, matched span) pairs, non-overlapping, left to right
    fn spans<'t>(&self, text: &'t str) -> Vec<(&'t str, &'t str)> {
        let mut spans = Vec::new();
        let mut pos = 0;

        while pos <= text.len() {
            let Some(cap) = self.head.captures_at(text, pos) else {
                break;
            };
            let (Some(whole), Some(body)) = (cap.get(0), last_group(&cap)) else {
                break;
            };

            let end = text[body.end()..]
                .find(self.terminator)
                .map(|i| body.end() + i)
                .unwrap_or(text.len());

            let title = if self.labelled {
                cap.get(1).map(|m| m.as_str()).unwrap_or_default()
            } else {
                &text[body.start()..end]
            };
            spans.push((title, &text[whole.start()..end]));
            pos = end;
        }

        spans
    }
}

fn last_group<'t>(cap: &Captures<'t>) -> Option<regex::Match<'t>> {
    cap.get(cap.len() - 1)
}

static FEATURE_PATTERNS: Lazy<Vec<FeaturePattern>> = Lazy::new(|| {
    vec![
        // ### Step 1.2: Title
        FeaturePattern::new(r"(?s)###\s+Step\s+[\d.]+:\s+(.)", "###", false),
        // ### Title
        FeaturePattern::new(r"(?s)###\s+(.)", "###", false),
        // **Feature:** Title
        FeaturePattern::new(r"(?s)\*\*Feature:\*\*\s+(.)", "**", false),
        // - **Label**: body
        FeaturePattern::new(r"(?s)-\s+\*\*(.+?)\*\*:?\s+(.)", "\n-", true),
    ]
});

/// Derive the phase from a document name (`phase2` -> `Phase 2`)
pub fn phase_for(name: &str) -> String {
    PHASE_REGEX
        .captures(&name.to_lowercase())
        .map(|cap| format!("Phase {}", &cap[1]))
        .unwrap_or_else(|| DEFAULT_PHASE.to_string())
}

/// Harvest features with every pattern family.
///
/// Families overlap on purpose: a step header is also a generic header, so
/// it yields two features. Nothing is merged.
pub fn extract_features(text: &str, phase: &str) -> Vec<Feature> {
    let mut features = Vec::new();

    for pattern in FEATURE_PATTERNS.iter() {
        for (title, span) in pattern.spans(text) {
            let code_blocks_count = CODE_BLOCK_REGEX.find_iter(span).count();
            features.push(Feature {
                phase: phase.to_string(),
                title: truncate_chars(title.trim(), MAX_TITLE_CHARS),
                description: truncate_chars(span, MAX_DESCRIPTION_CHARS),
                has_code: code_blocks_count > 0,
                code_blocks_count,
            });
        }
    }

    features
}

/// Distinct component-like tokens, sorted
pub fn extract_components(text: &str) -> Vec<String> {
    let mut components = BTreeSet::new();
    for regex in COMPONENT_REGEXES.iter() {
        for cap in regex.captures_iter(text) {
            components.insert(cap[1].to_string());
        }
    }
    components.into_iter().collect()
}

/// `CREATE TABLE` blocks quoted in a planning document
pub fn extract_planned_tables(text: &str) -> Vec<PlannedTable> {
    TABLE_REGEX
        .captures_iter(text)
        .map(|cap| {
            let columns = cap[2]
                .split('\n')
                .filter_map(|line| {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with("--") || line.starts_with("CONSTRAINT") {
                        return None;
                    }
                    let mut parts = line.split_whitespace();
                    let name = parts.next()?;
                    let column_type = parts.next()?;
                    Some(PlannedColumn {
                        name: name.trim_matches(',').to_string(),
                        column_type: column_type.trim_matches(',').to_string(),
                        definition: line.to_string(),
                    })
                })
                .collect();

            PlannedTable {
                name: cap[1].to_string(),
                columns,
                full_definition: cap[0].to_string(),
            }
        })
        .collect()
}

/// Extract every fact from one planning document
pub fn analyze_document(file: &str, text: &str) -> DocumentFacts {
    let phase = phase_for(file);
    DocumentFacts {
        file: file.to_string(),
        line_count: text.split('\n').count(),
        tables: extract_planned_tables(text),
        features: extract_features(text, &phase),
        components: extract_components(text),
        phase,
    }
}

/// Read and analyze every planning document in `dir` matching `pattern`
pub fn analyze_documents(dir: &Path, pattern: &str) -> Result<SpecificationFacts> {
    if !dir.is_dir() {
        return Err(AuditError::missing("planning document directory", dir));
    }

    let paths = list_matching(dir, pattern)?;
    if paths.is_empty() {
        warn!("No planning documents matching {} in {}", pattern, dir.display());
    }

    let mut documents = Vec::new();
    for path in paths {
        let name = file_name(&path);
        info!("Analyzing {}...", name);
        let text = read_input(&path)?;
        documents.push(analyze_document(&name, &text));
    }

    let facts = SpecificationFacts::from_documents(documents);
    info!(
        "Specifications: {} documents, {} features, {} components",
        facts.summary.total_documents, facts.summary.total_features, facts.summary.total_components
    );
    Ok(facts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_for_document_names() {
        assert_eq!(phase_for("b2b-phase2-catalog.txt"), "Phase 2");
        assert_eq!(phase_for("B2B-PHASE0.txt"), "Phase 0");
        assert_eq!(phase_for("b2b-master-plan.txt"), "Master");
    }

    #[test]
    fn test_step_header_yields_step_and_generic_features() {
        let text = "### Step 1.1: Build Login Page\nCreate login.tsx\n### Step 1.2: Add Cart\nMore";
        let features = extract_features(text, "Phase 1");

        let titles: Vec<&str> = features.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Build Login Page\nCreate login.tsx",
                "Add Cart\nMore",
                "Step 1.1: Build Login Page\nCreate login.tsx",
                "Step 1.2: Add Cart\nMore",
            ]
        );
        assert!(features.iter().all(|f| f.phase == "Phase 1"));
        assert_eq!(
            features[0].description,
            "### Step 1.1: Build Login Page\nCreate login.tsx\n"
        );
    }

    #[test]
    fn test_feature_marker_runs_to_next_bold() {
        let text = "**Feature:** Bulk ordering for accounts **Priority:** high";
        let features = extract_features(text, "Master");
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].title, "Bulk ordering for accounts");
        assert_eq!(features[0].description, "**Feature:** Bulk ordering for accounts ");
    }

    #[test]
    fn test_bold_bullet_uses_label_as_title() {
        let text = "- **Invoices**: PDF generation\n- **Reorder** one click";
        let features = extract_features(text, "Phase 3");
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].title, "Invoices");
        assert_eq!(features[0].description, "- **Invoices**: PDF generation");
        assert_eq!(features[1].title, "Reorder");
        assert_eq!(features[1].description, "- **Reorder** one click");
    }

    #[test]
    fn test_code_blocks_counted_in_span() {
        let text = "### Schema\n```sql\nCREATE TABLE a (id INT);\n```\nand\n```\nmore\n```\n### Next\nnone";
        let features = extract_features(text, "Master");
        assert_eq!(features.len(), 2);
        assert!(features[0].has_code);
        assert_eq!(features[0].code_blocks_count, 2);
        assert!(!features[1].has_code);
        assert_eq!(features[1].code_blocks_count, 0);
    }

    #[test]
    fn test_title_and_description_truncated() {
        let long = "x".repeat(700);
        let text = format!("### {}", long);
        let features = extract_features(&text, "Master");
        assert_eq!(features[0].title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(features[0].description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_no_markers_no_features() {
        assert!(extract_features("plain prose with no markers", "Master").is_empty());
    }

    #[test]
    fn test_extract_components_sorted_and_deduplicated() {
        let text = "Edit Header.tsx and Header.tsx.\n<ProductCard price={1} />\nimport { useCart } from './cart'\nimport React from 'react'\nuse utils.ts";
        let components = extract_components(text);
        assert_eq!(
            components,
            vec![
                "Header.ts",
                "Header.tsx",
                "ProductCard",
                "React",
                "useCart",
                "utils.ts"
            ]
        );
    }

    #[test]
    fn test_planned_tables_keep_definitions() {
        let text = "Schema:\nCREATE TABLE carts (\n  id UUID PRIMARY KEY,\n  -- owner\n  CONSTRAINT x UNIQUE (id)\n);";
        let tables = extract_planned_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "carts");
        assert_eq!(tables[0].columns.len(), 1);
        assert_eq!(tables[0].columns[0].definition, "id UUID PRIMARY KEY,");
        assert!(tables[0].full_definition.starts_with("CREATE TABLE carts"));
    }

    #[test]
    fn test_analyze_document_counts_lines() {
        let doc = analyze_document("b2b-phase1.txt", "a\nb\nc\n");
        assert_eq!(doc.phase, "Phase 1");
        assert_eq!(doc.line_count, 4);
    }
}
