//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, DriftErrorCode};

/// Errors raised by the file walker and hasher.
///
/// Only `RootNotFound` and `Cancelled` are fatal to a scan; everything else
/// is recorded per-file and the scan continues.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan root does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("io error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("scan cancelled")]
    Cancelled,
}

impl DriftErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            _ => error_code::SCAN_ERROR,
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RootNotFound { .. } => {
                Some("check the project root path passed to the scanner")
            }
            Self::PermissionDenied { .. } => {
                Some("the scanning process lacks read access to this path")
            }
            _ => None,
        }
    }
}
