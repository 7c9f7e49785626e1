//! Policies — named bundles of gate configuration and aggregation rules.

pub mod loader;
pub mod types;

pub use loader::{load_policy, resolve_policy};
pub use types::{AggregationMode, BaselineRef, GateSettings, Policy};
