//! The detector contract.

use drift_core::types::pattern::{PatternCategory, Severity};
use serde::{Deserialize, Serialize};

use super::context::DetectionContext;
use crate::scanner::Language;

/// A raw observation: one place where a detector saw its pattern.
///
/// Observations merge across files into patterns; the engine decides later
/// which become locations and which become outliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Distinguishes pattern families within one detector (e.g. the
    /// framework name). Combined with category and subcategory it forms
    /// the stable pattern id.
    pub pattern_key: String,
    pub file: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    /// Canonical shape of this occurrence; drives majority voting.
    pub signature: String,
    /// Intrinsic confidence of this single observation.
    pub confidence: f64,
}

/// A user-visible problem found directly by a detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub id: String,
    pub pattern_id: String,
    pub severity: Severity,
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub message: String,
    pub expected: String,
    pub actual: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    pub first_seen: i64,
    pub occurrences: u32,
}

impl Violation {
    /// Stable key used for baseline comparison: `file:line:pattern`.
    pub fn baseline_key(&self) -> String {
        format!("{}:{}:{}", self.file, self.start_line, self.pattern_id)
    }
}

/// What one detector produced for one file.
#[derive(Debug, Clone, Default)]
pub struct DetectionResult {
    pub observations: Vec<Observation>,
    pub violations: Vec<Violation>,
    /// Detector-level confidence in this file's results.
    pub confidence: f64,
}

impl DetectionResult {
    pub fn empty() -> Self {
        Self {
            confidence: 1.0,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty() && self.violations.is_empty()
    }
}

/// The uniform detector contract.
///
/// Detectors are pure functions of their context: no I/O, no shared
/// mutable state, panics contained by the engine.
pub trait Detector: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn category(&self) -> PatternCategory;
    fn subcategory(&self) -> &'static str;
    /// Empty slice = all languages.
    fn supported_languages(&self) -> &'static [Language];
    fn detect(&self, ctx: &DetectionContext) -> DetectionResult;

    /// Whether this detector runs on the given language.
    fn supports(&self, language: Language) -> bool {
        let langs = self.supported_languages();
        langs.is_empty() || langs.contains(&language)
    }
}
