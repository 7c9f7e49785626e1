//! Quality-gate errors.

use super::error_code::{self, DriftErrorCode};

/// An uncaught failure inside a gate. The orchestrator converts this into
/// an `errored` gate status; the run fails only if the gate is blocking.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("gate {gate} failed: {message}")]
    Evaluation { gate: String, message: String },

    #[error("gate {gate} timed out after {elapsed_ms}ms (limit {limit_ms}ms)")]
    Timeout {
        gate: String,
        elapsed_ms: u64,
        limit_ms: u64,
    },

    #[error("gate {gate} requires missing context: {missing}")]
    MissingContext { gate: String, missing: String },
}

impl DriftErrorCode for GateError {
    fn error_code(&self) -> &'static str {
        error_code::GATE_ERROR
    }
}
