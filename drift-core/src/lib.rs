//! # drift-core
//!
//! Foundation crate for the Drift analysis engine. Defines the shared
//! types, error taxonomy, configuration, event callbacks, cancellation and
//! tracing setup. Every other crate in the workspace depends on this.

pub mod cancellation;
pub mod config;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod types;

pub use cancellation::CancellationToken;
pub use config::DriftConfig;
pub use errors::DriftErrorCode;
pub use events::{NoopEvents, ScanEventHandler};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::identifiers::{PatternId, ShortHash};
pub use types::pattern::{
    Confidence, ConfidenceLevel, Pattern, PatternCategory, PatternLocation, PatternOutlier,
    PatternStatus, Severity,
};
