//! Top-level pipeline errors.

use super::config_error::ConfigError;
use super::error_code::{self, DriftErrorCode};
use super::scan_error::ScanError;
use super::store_error::StoreError;

/// Errors that can escape a whole scan or gate run. Everything else is
/// degraded to per-file diagnostics before it reaches this level.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DriftErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Scan(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Scan(e) => e.hint(),
            Self::Store(e) => e.hint(),
            Self::Config(e) => e.hint(),
        }
    }
}

impl PipelineError {
    /// Process exit code for embedding surfaces: configuration and store
    /// integrity problems are `2`, operational scan failures `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Store(_) => 2,
            Self::Scan(_) => 1,
        }
    }
}
