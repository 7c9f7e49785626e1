//! Configuration errors.

use super::error_code::{self, DriftErrorCode};

/// Errors raised while loading or validating configuration, policies and
/// rule files. Surfaced immediately to the caller; maps to exit code 2.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("unknown policy id: {id}")]
    UnknownPolicy { id: String },

    #[error("malformed rule file {path}: {message}")]
    MalformedRule { path: String, message: String },
}

impl DriftErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownPolicy { .. } => {
                Some("built-in policies are: default, strict, lenient")
            }
            Self::MalformedRule { .. } => {
                Some("custom rules live in .drift/rules/*.yaml")
            }
            _ => None,
        }
    }
}
