//! Error types for buildaudit

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an audit run
#[derive(Error, Debug)]
pub enum AuditError {
    /// A required directory or artifact is absent
    #[error("Missing {what}: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    /// An input exists but cannot be read or an output cannot be written
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuditError {
    pub fn missing(what: &'static str, path: impl Into<PathBuf>) -> Self {
        AuditError::MissingInput {
            what,
            path: path.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<globset::Error> for AuditError {
    fn from(err: globset::Error) -> Self {
        AuditError::Config(err.to_string())
    }
}

/// Result type alias for buildaudit
pub type Result<T> = std::result::Result<T, AuditError>;
