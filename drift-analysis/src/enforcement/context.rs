//! Shared gate context.
//!
//! Built once per run; expensive inputs are `Option` and loaded only when
//! some enabled gate needs them.

use std::collections::BTreeMap;

use drift_core::types::constraint::Constraint;
use drift_core::types::pattern::Pattern;
use drift_storage::snapshots::HealthSnapshot;

use crate::detectors::traits::Violation;
use crate::enforcement::rules::CustomRule;
use crate::graph::call_graph::CallGraph;
use crate::provider::types::DataAccessMatch;

/// Everything gates may read. Gates never mutate the context.
#[derive(Default)]
pub struct GateContext {
    /// Files under check (relative paths). Empty means "no change set".
    pub changed_files: Vec<String>,
    /// Committed pattern snapshot.
    pub patterns: Vec<Pattern>,
    /// Active + invalidated constraints.
    pub constraints: Vec<Constraint>,
    /// Loaded when the impact or security gate is enabled.
    pub call_graph: Option<CallGraph>,
    /// Loaded when the regression gate is enabled and a baseline exists.
    pub baseline: Option<HealthSnapshot>,
    /// Inline + file-loaded custom rules.
    pub custom_rules: Vec<CustomRule>,
    /// Contents of the changed files, for custom rules.
    pub file_contents: BTreeMap<String, String>,
    /// Data-access matches found in the changed files.
    pub data_access: Vec<DataAccessMatch>,
    /// Detector violations from the current scan of the changed files.
    pub detector_violations: Vec<Violation>,
}

impl GateContext {
    pub fn is_changed(&self, file: &str) -> bool {
        self.changed_files.iter().any(|f| f == file)
    }
}
