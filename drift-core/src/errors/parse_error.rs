//! Parser errors.

use std::path::PathBuf;

use super::error_code::{self, DriftErrorCode};

/// Errors raised by the parser layer.
///
/// Syntax errors inside a file are NOT parse errors; they downgrade to
/// diagnostics on the parse result. These variants cover failures to parse
/// at all.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no grammar available for language: {language}")]
    GrammarUnavailable { language: String },

    #[error("parser failure on {path}: {message}")]
    ParserFailure { path: PathBuf, message: String },

    #[error("cannot classify language of {path}")]
    UnknownLanguage { path: PathBuf },

    #[error("file is not valid utf-8: {path}")]
    InvalidUtf8 { path: PathBuf },
}

impl DriftErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownLanguage { .. } => error_code::UNSUPPORTED_LANGUAGE,
            _ => error_code::PARSE_ERROR,
        }
    }
}
