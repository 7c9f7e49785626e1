//! Quality-gate configuration.

use serde::{Deserialize, Serialize};

/// Engine-level gate settings; per-gate thresholds live in the policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Policy id to use when the caller does not name one.
    pub default_policy: String,
    /// Treat `warned` runs as failures.
    pub fail_on_warning: bool,
    /// Per-gate execution budget in seconds; a gate over budget is errored.
    pub gate_timeout_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            default_policy: "default".to_string(),
            fail_on_warning: false,
            gate_timeout_secs: 60,
        }
    }
}
