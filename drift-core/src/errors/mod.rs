//! Error taxonomy for Drift.
//!
//! One `thiserror` enum per subsystem. Recoverable errors never escape a
//! per-file or per-detector context; only configuration and store-integrity
//! errors surface to the caller.

pub mod config_error;
pub mod constraint_error;
pub mod contract_error;
pub mod detection_error;
pub mod error_code;
pub mod gate_error;
pub mod parse_error;
pub mod pipeline_error;
pub mod scan_error;
pub mod store_error;

pub use config_error::ConfigError;
pub use constraint_error::ConstraintError;
pub use contract_error::ContractError;
pub use detection_error::DetectionError;
pub use error_code::DriftErrorCode;
pub use gate_error::GateError;
pub use parse_error::ParseError;
pub use pipeline_error::PipelineError;
pub use scan_error::ScanError;
pub use store_error::StoreError;
