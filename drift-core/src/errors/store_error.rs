//! Storage errors.

use std::path::PathBuf;

use super::error_code::{self, DriftErrorCode};

/// Errors raised by the durable stores under `.drift/`.
///
/// Store errors are fatal: the engine refuses to scan against a store it
/// cannot trust.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {message}")]
    Sqlite { message: String },

    #[error("store is corrupt at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("migration to version {version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("io error on store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown pattern id: {id}")]
    UnknownPattern { id: String },

    #[error("invalid lifecycle transition for pattern {id}: {message}")]
    InvalidTransition { id: String, message: String },
}

impl DriftErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Corrupt { .. } => error_code::STORE_CORRUPT,
            _ => error_code::STORE_ERROR,
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Corrupt { .. } => Some(
                "delete the .drift/ directory and rescan, or restore it from a backup",
            ),
            Self::MigrationFailed { .. } => {
                Some("the store was written by an incompatible Drift version")
            }
            _ => None,
        }
    }
}
