//! Artifact paths and (de)serialization

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AuditConfig;
use crate::error::AuditError;

pub const SCHEMA_ARTIFACT: &str = "database_analysis.json";
pub const INVENTORY_ARTIFACT: &str = "implementation_analysis.json";
pub const SPECIFICATIONS_ARTIFACT: &str = "extracted_specifications.json";
pub const REPORT_ARTIFACT: &str = "PROGRESS_REPORT.md";

/// Environment variable naming the project root when no path is given
pub const ROOT_ENV: &str = "BUILDAUDIT_ROOT";

/// Get the path of a named artifact
pub fn artifact_path(config: &AuditConfig, name: &str) -> PathBuf {
    config.output_dir().join(name)
}

/// Ensure the output directory exists
pub fn ensure_output_directory(config: &AuditConfig) -> Result<()> {
    let dir = config.output_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Could not create output directory {}", dir.display()))?;
    Ok(())
}

/// Write a fact set as pretty JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(AuditError::from)?;
    write_text(path, &json)
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| AuditError::io(path, e))?;
    Ok(())
}

/// Read a fact set saved by an earlier command
pub fn read_json<T: DeserializeOwned>(path: &Path, what: &'static str) -> Result<T> {
    if !path.exists() {
        return Err(AuditError::missing(what, path).into());
    }
    let raw = fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
    let value = serde_json::from_str(&raw)
        .map_err(AuditError::from)
        .with_context(|| format!("Could not parse {}", path.display()))?;
    Ok(value)
}

/// Canonicalize and validate a path
pub fn canonicalize_path(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|_| AuditError::missing("project root", path))
        .context("Invalid path")
}

/// Build the run configuration.
///
/// The config file (if any) supplies defaults; an explicit path argument
/// wins over `BUILDAUDIT_ROOT`, which wins over the file's root.
pub fn resolve_config(path: Option<&str>, config_file: Option<&str>) -> Result<AuditConfig> {
    let mut config = match config_file {
        Some(file) => AuditConfig::load(Path::new(file))?,
        None => AuditConfig::default(),
    };

    if let Some(path) = path {
        config.root = PathBuf::from(path);
    } else if let Ok(root) = env::var(ROOT_ENV) {
        config.root = PathBuf::from(root);
    }

    config.root = canonicalize_path(&config.root)?;
    if let Some(dir) = config.output_dir.take() {
        config.output_dir = Some(config.root.join(dir));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SCHEMA_ARTIFACT);
        let err = read_json::<crate::types::SchemaFacts>(&path, "schema facts").unwrap_err();
        let audit = err.downcast_ref::<AuditError>().unwrap();
        assert!(matches!(audit, AuditError::MissingInput { what: "schema facts", .. }));
    }

    #[test]
    fn test_artifact_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let config = AuditConfig::for_root(dir.path());
        let path = artifact_path(&config, SPECIFICATIONS_ARTIFACT);

        let specs =
            crate::extraction::documents::analyze_document("b2b-phase1.txt", "### Cart\nbody");
        let facts = crate::types::SpecificationFacts::from_documents(vec![specs]);
        write_json(&path, &facts).unwrap();

        let loaded: crate::types::SpecificationFacts = read_json(&path, "specifications").unwrap();
        assert_eq!(loaded.summary, facts.summary);
        assert_eq!(loaded.documents[0].features, facts.documents[0].features);
    }

    #[test]
    fn test_resolve_config_explicit_path_and_output_dir() {
        let dir = tempdir().unwrap();
        let config_file = dir.path().join("audit.json");
        fs::write(&config_file, r#"{"output_dir": "reports", "project_name": "Acme"}"#).unwrap();

        let config = resolve_config(
            Some(dir.path().to_str().unwrap()),
            Some(config_file.to_str().unwrap()),
        )
        .unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.root, root);
        assert_eq!(config.output_dir(), root.join("reports"));
        assert_eq!(config.project_name, "Acme");
    }
}
