//! Constraint subsystem errors.

use super::error_code::{self, DriftErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    #[error("constraint synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("unknown constraint id: {id}")]
    UnknownConstraint { id: String },
}

impl DriftErrorCode for ConstraintError {
    fn error_code(&self) -> &'static str {
        error_code::CONSTRAINT_ERROR
    }
}
