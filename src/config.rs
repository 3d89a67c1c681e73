//! Audit configuration
//!
//! The phase buckets, the source-tree locations and the filename-convention
//! counts are plain data so they can be extended from a JSON config file
//! without touching the extractors.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// Configuration for an audit run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Name used in the report header
    pub project_name: String,
    /// Project root; every other path is relative to it
    pub root: PathBuf,
    /// Where artifacts are written (defaults to the root)
    pub output_dir: Option<PathBuf>,
    pub database: DatabaseLayout,
    pub documents: DocumentSource,
    pub locations: Vec<SourceLocation>,
    pub counts: Vec<CountRule>,
    /// Ordered phase buckets used for aggregation
    pub phases: Vec<String>,
    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseLayout {
    pub migrations_dir: PathBuf,
    pub migration_pattern: String,
    /// Seed files are looked up at the project root
    pub seed_pattern: String,
}

impl Default for DatabaseLayout {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("supabase/migrations"),
            migration_pattern: "*.sql".to_string(),
            seed_pattern: "*seed*.sql".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSource {
    pub dir: PathBuf,
    pub pattern: String,
}

impl Default for DocumentSource {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            pattern: "b2b-*.txt".to_string(),
        }
    }
}

/// A known source-tree location whose files make up the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub app: String,
    pub category: String,
    pub root: PathBuf,
    /// File-name glob
    pub pattern: String,
    #[serde(default = "default_true")]
    pub recursive: bool,
}

impl SourceLocation {
    pub fn new(app: &str, category: &str, root: &str, pattern: &str, recursive: bool) -> Self {
        Self {
            app: app.to_string(),
            category: category.to_string(),
            root: PathBuf::from(root),
            pattern: pattern.to_string(),
            recursive,
        }
    }
}

/// A named scalar count derived from an exact naming convention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRule {
    pub name: String,
    pub under: PathBuf,
    pub target: CountTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CountTarget {
    /// Files whose name matches a glob
    Files { pattern: String, recursive: bool },
    /// Immediate subdirectories
    Dirs,
}

impl CountRule {
    pub fn files(name: &str, under: &str, pattern: &str, recursive: bool) -> Self {
        Self {
            name: name.to_string(),
            under: PathBuf::from(under),
            target: CountTarget::Files {
                pattern: pattern.to_string(),
                recursive,
            },
        }
    }

    pub fn dirs(name: &str, under: &str) -> Self {
        Self {
            name: name.to_string(),
            under: PathBuf::from(under),
            target: CountTarget::Dirs,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            project_name: "B2B+ Project".to_string(),
            root: PathBuf::from("."),
            output_dir: None,
            database: DatabaseLayout::default(),
            documents: DocumentSource::default(),
            locations: vec![
                SourceLocation::new("web", "pages", "apps/web/app", "*.tsx", true),
                SourceLocation::new("web", "components", "apps/web/components", "*.tsx", true),
                SourceLocation::new("web", "api_routes", "apps/web/app/api", "*.ts", true),
                SourceLocation::new("web", "hooks", "apps/web/hooks", "*.ts", false),
                SourceLocation::new("web", "lib", "apps/web/lib", "*.ts", true),
                SourceLocation::new("mobile", "lib", "apps/mobile/lib", "*.ts", false),
                SourceLocation::new("mobile", "screens", "apps/mobile/app", "*.tsx", true),
                SourceLocation::new("mobile", "contexts", "apps/mobile/contexts", "*.tsx", false),
                SourceLocation::new("shared", "files", "packages/shared/src", "*.ts*", true),
                SourceLocation::new("ui", "files", "packages/ui/src", "*.ts*", true),
                SourceLocation::new("supabase", "files", "packages/supabase/src", "*.ts*", true),
            ],
            counts: vec![
                CountRule::files("total_pages", "apps/web/app", "page.tsx", true),
                CountRule::files("total_components", "apps/web/components", "*.tsx", true),
                CountRule::files("total_api_routes", "apps/web/app/api", "route.ts", true),
                CountRule::files("total_hooks", "apps/web/hooks", "*.ts", false),
                CountRule::files("total_migrations", "supabase/migrations", "*.sql", false),
                CountRule::dirs("total_packages", "packages"),
                CountRule::files("total_tests", "", "*.test.ts*", true),
            ],
            phases: ["Phase 0", "Phase 1", "Phase 2", "Phase 3", "Phase 4", "Master"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            exclude_dirs: vec!["node_modules".to_string(), ".git".to_string()],
        }
    }
}

impl AuditConfig {
    /// Default configuration rooted at `root`
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Load a JSON config file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuditError::missing("config file", path));
        }
        let raw = fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
        serde_json::from_str(&raw)
            .map_err(|e| AuditError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn migrations_dir(&self) -> PathBuf {
        self.root.join(&self.database.migrations_dir)
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.root.join(&self.documents.dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| self.root.clone())
    }
}
