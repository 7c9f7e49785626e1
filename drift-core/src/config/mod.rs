//! Configuration system.
//! TOML-based, layered resolution: environment > project `drift.toml` > defaults.

pub mod drift_config;
pub mod gate_config;
pub mod scan_config;

pub use drift_config::DriftConfig;
pub use gate_config::GateConfig;
pub use scan_config::ScanConfig;
