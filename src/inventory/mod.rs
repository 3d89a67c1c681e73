//! Source-tree inventory
//!
//! The project root is walked once into a [`SourceTree`]. Two projections are
//! derived from it and must stay separate:
//! - [`inventory_files`]: every file at the known locations, used for matching
//! - [`convention_counts`]: narrow counts of exact naming conventions

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use crate::config::{AuditConfig, CountRule, CountTarget, DatabaseLayout, SourceLocation};
use crate::error::{AuditError, Result};
use crate::extraction::file_glob;
use crate::types::{DatabaseInventory, InventoryFacts, InventoryFile};

/// Root-relative listing of a project tree
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl SourceTree {
    /// Walk `root`, skipping directories whose name is in `exclude_dirs`
    pub fn walk(root: &Path, exclude_dirs: &[String]) -> Result<Self> {
        if !root.is_dir() {
            return Err(AuditError::missing("source tree", root));
        }

        let excluded = exclude_dirs.to_vec();
        let mut walker = WalkBuilder::new(root);
        walker
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map_or(false, |t| t.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && excluded
                        .iter()
                        .any(|d| entry.file_name().to_string_lossy() == d.as_str()))
            });

        let mut files = Vec::new();
        let mut dirs = Vec::new();

        for entry in walker.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!("Error walking directory: {}", err);
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }

            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            match entry.file_type() {
                Some(t) if t.is_dir() => dirs.push(rel.to_path_buf()),
                Some(t) if t.is_file() => files.push(rel.to_path_buf()),
                _ => {}
            }
        }

        debug!("Walked {} files, {} directories", files.len(), dirs.len());
        Ok(Self::from_paths(files, dirs))
    }

    /// Build a tree from root-relative paths
    pub fn from_paths(mut files: Vec<PathBuf>, mut dirs: Vec<PathBuf>) -> Self {
        files.sort();
        dirs.sort();
        Self { files, dirs }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Files under `base` as base-relative paths
    fn files_under<'a>(
        &'a self,
        base: &'a Path,
        recursive: bool,
    ) -> impl Iterator<Item = &'a Path> + 'a {
        children(&self.files, base, recursive)
    }

    fn dirs_under<'a>(&'a self, base: &'a Path) -> impl Iterator<Item = &'a Path> + 'a {
        children(&self.dirs, base, false)
    }
}

fn children<'a>(
    paths: &'a [PathBuf],
    base: &'a Path,
    recursive: bool,
) -> impl Iterator<Item = &'a Path> + 'a {
    paths.iter().filter_map(move |p| {
        let rel = p.strip_prefix(base).ok()?;
        if rel.as_os_str().is_empty() || (!recursive && rel.components().count() != 1) {
            return None;
        }
        Some(rel)
    })
}

fn slash_path(path: &Path) -> String {
    path.iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Every file at the configured locations, in location order.
///
/// A location that does not exist simply contributes nothing.
pub fn inventory_files(
    tree: &SourceTree,
    locations: &[SourceLocation],
) -> Result<Vec<InventoryFile>> {
    let mut files = Vec::new();

    for location in locations {
        let matcher = file_glob(&location.pattern)?;
        let before = files.len();

        for rel in tree.files_under(&location.root, location.recursive) {
            if rel.file_name().map_or(false, |n| matcher.is_match(n)) {
                files.push(InventoryFile {
                    path: slash_path(rel),
                    app: location.app.clone(),
                    category: location.category.clone(),
                });
            }
        }

        debug!(
            "{}/{}: {} files under {}",
            location.app,
            location.category,
            files.len() - before,
            location.root.display()
        );
    }

    Ok(files)
}

/// Scalar counts of exact naming conventions
pub fn convention_counts(
    tree: &SourceTree,
    rules: &[CountRule],
) -> Result<BTreeMap<String, usize>> {
    let mut counts = BTreeMap::new();

    for rule in rules {
        let count = match &rule.target {
            CountTarget::Files { pattern, recursive } => {
                let matcher = file_glob(pattern)?;
                tree.files_under(&rule.under, *recursive)
                    .filter(|rel| rel.file_name().map_or(false, |n| matcher.is_match(n)))
                    .count()
            }
            CountTarget::Dirs => tree.dirs_under(&rule.under).count(),
        };
        counts.insert(rule.name.clone(), count);
    }

    Ok(counts)
}

/// Migration and seed files; these never take part in feature matching
pub fn database_inventory(tree: &SourceTree, layout: &DatabaseLayout) -> Result<DatabaseInventory> {
    let migration_glob = file_glob(&layout.migration_pattern)?;
    let seed_glob = file_glob(&layout.seed_pattern)?;

    let migrations = tree
        .files_under(&layout.migrations_dir, false)
        .filter(|rel| migration_glob.is_match(rel))
        .map(name_of)
        .collect();

    let seed_files = tree
        .files_under(Path::new(""), false)
        .filter(|rel| seed_glob.is_match(rel))
        .map(name_of)
        .collect();

    Ok(DatabaseInventory {
        migrations,
        seed_files,
    })
}

/// Walk the project once and derive every inventory projection
pub fn build_inventory(config: &AuditConfig) -> Result<InventoryFacts> {
    info!("Analyzing current implementation at {}", config.root.display());
    let tree = SourceTree::walk(&config.root, &config.exclude_dirs)?;

    let files = inventory_files(&tree, &config.locations)?;
    let database = database_inventory(&tree, &config.database)?;
    let counts = convention_counts(&tree, &config.counts)?;

    let mut summary = BTreeMap::new();
    for location in &config.locations {
        summary
            .entry(format!("{}_{}", location.app, location.category))
            .or_insert(0);
    }
    for file in &files {
        *summary
            .entry(format!("{}_{}", file.app, file.category))
            .or_insert(0) += 1;
    }
    summary.insert("database_migrations".to_string(), database.migrations.len());

    info!(
        "Inventory: {} files, {} migrations, {} seed files",
        files.len(),
        database.migrations.len(),
        database.seed_files.len()
    );

    Ok(InventoryFacts {
        files,
        database,
        counts,
        summary,
    })
}
