//! Detector errors.

use super::error_code::{self, DriftErrorCode};

/// Errors raised by a detector on a single file.
///
/// Caught per `(detector, file)`; the engine records the failure and moves
/// on. A detector failing repeatedly is reported unhealthy.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("detector {detector} failed on {file}: {message}")]
    DetectorFailed {
        detector: String,
        file: String,
        message: String,
    },

    #[error("detector {detector} panicked on {file}")]
    DetectorPanicked { detector: String, file: String },

    #[error("unknown detector id: {id}")]
    UnknownDetector { id: String },
}

impl DriftErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        error_code::DETECTION_ERROR
    }
}
