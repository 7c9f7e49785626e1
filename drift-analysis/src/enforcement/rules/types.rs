//! Custom rule shape.

use drift_core::types::pattern::Severity;
use serde::{Deserialize, Serialize};

/// A user-authored regex rule, inline in a policy or loaded from
/// `.drift/rules/*.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRule {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    /// Regex applied line-by-line.
    pub pattern: String,
    /// Restrict to paths ending with this suffix (e.g. `.ts`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_suffix: Option<String>,
    pub message: String,
}

/// A rule file: a named list of rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub name: String,
    pub rules: Vec<CustomRule>,
}
