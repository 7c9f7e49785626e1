//! Contract subsystem errors.

use super::error_code::{self, DriftErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("contract extraction failed on {file}: {message}")]
    Extraction { file: String, message: String },

    #[error("unknown contract id: {id}")]
    UnknownContract { id: String },
}

impl DriftErrorCode for ContractError {
    fn error_code(&self) -> &'static str {
        error_code::CONTRACT_ERROR
    }
}
