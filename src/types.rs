//! Core type definitions for buildaudit
//!
//! Defines the fact sets produced by each extractor and consumed by the
//! reconciler:
//! - Schema facts: tables, columns, indexes, functions, triggers
//! - Specification facts: phase-tagged features and component references
//! - Inventory facts: categorized implementation files and convention counts
//! - Status results: one classification per feature

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// =========================================================================
// Schema facts
// =========================================================================

/// A column recovered from a `CREATE TABLE` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_not_null: bool,
    pub has_default: bool,
    pub is_unique: bool,
}

/// A table definition found in migration text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub column_count: usize,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            column_count: columns.len(),
            columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    pub table: String,
}

/// Everything extracted from a single migration unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationFacts {
    pub file: String,
    pub tables: Vec<Table>,
    pub indexes: Vec<Index>,
    pub functions: Vec<String>,
    pub triggers: Vec<Trigger>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub total_migrations: usize,
    pub total_tables: usize,
    pub total_indexes: usize,
    pub total_functions: usize,
    pub total_triggers: usize,
}

/// Aggregated schema view across all migration units
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFacts {
    pub migrations: Vec<MigrationFacts>,
    pub summary: SchemaSummary,
    /// Unique by name, in first-seen order
    pub tables: Vec<Table>,
    pub table_names: Vec<String>,
    pub indexes: Vec<Index>,
    pub functions: BTreeSet<String>,
    pub triggers: Vec<Trigger>,
}

// =========================================================================
// Specification facts
// =========================================================================

/// A planned feature harvested from a planning document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub phase: String,
    pub title: String,
    pub description: String,
    pub has_code: bool,
    pub code_blocks_count: usize,
}

/// A column of a table quoted in a planning document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub definition: String,
}

/// A `CREATE TABLE` block quoted in a planning document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTable {
    pub name: String,
    pub columns: Vec<PlannedColumn>,
    pub full_definition: String,
}

/// Everything extracted from a single planning document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFacts {
    pub file: String,
    pub phase: String,
    pub line_count: usize,
    pub tables: Vec<PlannedTable>,
    pub features: Vec<Feature>,
    pub components: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationSummary {
    pub total_documents: usize,
    pub total_tables: usize,
    pub total_features: usize,
    pub total_components: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecificationFacts {
    pub documents: Vec<DocumentFacts>,
    pub summary: SpecificationSummary,
}

impl SpecificationFacts {
    pub fn from_documents(documents: Vec<DocumentFacts>) -> Self {
        let summary = SpecificationSummary {
            total_documents: documents.len(),
            total_tables: documents.iter().map(|d| d.tables.len()).sum(),
            total_features: documents.iter().map(|d| d.features.len()).sum(),
            total_components: documents.iter().map(|d| d.components.len()).sum(),
        };
        Self { documents, summary }
    }

    /// All features across documents, in document order
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.documents.iter().flat_map(|d| d.features.iter())
    }
}

// =========================================================================
// Inventory facts
// =========================================================================

/// An implementation file found at one of the known source-tree locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFile {
    /// Path relative to the location root
    pub path: String,
    pub app: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInventory {
    pub migrations: Vec<String>,
    pub seed_files: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryFacts {
    /// Full recursive listing used for reconciliation
    pub files: Vec<InventoryFile>,
    pub database: DatabaseInventory,
    /// Narrow filename-convention counts
    pub counts: BTreeMap<String, usize>,
    pub summary: BTreeMap<String, usize>,
}

impl InventoryFacts {
    pub fn files_in(&self, app: &str, category: &str) -> impl Iterator<Item = &InventoryFile> {
        let app = app.to_string();
        let category = category.to_string();
        self.files
            .iter()
            .filter(move |f| f.app == app && f.category == category)
    }
}

// =========================================================================
// Reconciliation
// =========================================================================

/// Implementation status of a planned feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    NotStarted,
    PartiallyComplete,
    Complete,
    Modified,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotStarted => "not_started",
            Status::PartiallyComplete => "partially_complete",
            Status::Complete => "complete",
            Status::Modified => "modified",
        }
    }

    /// Label used in the rendered report
    pub fn label(&self) -> &'static str {
        match self {
            Status::NotStarted => "❌ Not Started",
            Status::PartiallyComplete => "🔄 Partially Complete",
            Status::Complete => "✅ Complete",
            Status::Modified => "🔀 Modified",
        }
    }

    /// Whether the status counts toward phase completion
    pub fn counts_as_done(&self) -> bool {
        matches!(self, Status::Complete | Status::Modified)
    }

    /// Whether the status belongs in the remaining-work list
    pub fn is_remaining(&self) -> bool {
        matches!(self, Status::NotStarted | Status::PartiallyComplete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    pub status: Status,
    pub gap: String,
    pub evidence: String,
}

impl StatusResult {
    pub fn new(status: Status, gap: impl Into<String>, evidence: impl Into<String>) -> Self {
        Self {
            status,
            gap: gap.into(),
            evidence: evidence.into(),
        }
    }
}

/// A feature together with its reconciled status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStatus {
    pub phase: String,
    pub title: String,
    pub result: StatusResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStats {
    pub total: usize,
    pub complete: usize,
}

impl PhaseStats {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.complete as f64 / self.total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_done_and_remaining_are_disjoint() {
        for status in [
            Status::NotStarted,
            Status::PartiallyComplete,
            Status::Complete,
            Status::Modified,
        ] {
            assert_ne!(status.counts_as_done(), status.is_remaining());
        }
    }

    #[test]
    fn test_phase_stats_percentage() {
        let stats = PhaseStats {
            total: 4,
            complete: 1,
        };
        assert_eq!(stats.percentage(), 25.0);
        assert_eq!(PhaseStats::default().percentage(), 0.0);
    }

    #[test]
    fn test_column_type_serializes_as_type() {
        let column = Column {
            name: "id".to_string(),
            column_type: "uuid".to_string(),
            is_primary_key: true,
            is_foreign_key: false,
            is_not_null: false,
            has_default: false,
            is_unique: false,
        };
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "uuid");
    }
}
