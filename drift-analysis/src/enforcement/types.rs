//! Gate and run result types.

use std::collections::BTreeMap;

use drift_core::types::pattern::Severity;
use serde::{Deserialize, Serialize};

use crate::detectors::traits::Violation;
use crate::graph::impact::ImpactReport;

/// The six quality gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateId {
    PatternCompliance,
    ConstraintVerification,
    RegressionDetection,
    ImpactSimulation,
    SecurityBoundary,
    CustomRules,
}

impl GateId {
    pub fn all() -> &'static [GateId] {
        &[
            Self::PatternCompliance,
            Self::ConstraintVerification,
            Self::RegressionDetection,
            Self::ImpactSimulation,
            Self::SecurityBoundary,
            Self::CustomRules,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatternCompliance => "pattern-compliance",
            Self::ConstraintVerification => "constraint-verification",
            Self::RegressionDetection => "regression-detection",
            Self::ImpactSimulation => "impact-simulation",
            Self::SecurityBoundary => "security-boundary",
            Self::CustomRules => "custom-rules",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|g| g.as_str() == s)
    }
}

impl std::fmt::Display for GateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution status of one gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Passed,
    Warned,
    Failed,
    Skipped,
    Errored,
}

/// Typed per-gate detail payloads — one variant per gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "kebab-case")]
pub enum GateDetails {
    None,
    PatternCompliance {
        compliance_rate: f64,
        new_outliers: usize,
        patterns_checked: usize,
    },
    ConstraintVerification {
        constraints_checked: usize,
        violated: usize,
    },
    RegressionDetection {
        baseline_id: Option<String>,
        worst_confidence_drop: f64,
        worst_compliance_drop: f64,
        regressed_patterns: usize,
    },
    ImpactSimulation(ImpactReport),
    SecurityBoundary {
        protected_tables_touched: usize,
        guarded_files: usize,
    },
    CustomRules {
        rules_run: usize,
        matches: usize,
    },
}

/// Result of one gate's evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResult {
    pub gate_id: GateId,
    pub status: GateStatus,
    pub passed: bool,
    /// 0–100.
    pub score: f64,
    pub summary: String,
    pub violations: Vec<Violation>,
    pub warnings: Vec<String>,
    pub execution_time_ms: u64,
    pub details: GateDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GateResult {
    pub fn pass(gate_id: GateId, score: f64, summary: String) -> Self {
        Self {
            gate_id,
            status: GateStatus::Passed,
            passed: true,
            score,
            summary,
            violations: Vec::new(),
            warnings: Vec::new(),
            execution_time_ms: 0,
            details: GateDetails::None,
            error: None,
        }
    }

    pub fn warn(gate_id: GateId, score: f64, summary: String, warnings: Vec<String>) -> Self {
        Self {
            gate_id,
            status: GateStatus::Warned,
            passed: true,
            score,
            summary,
            violations: Vec::new(),
            warnings,
            execution_time_ms: 0,
            details: GateDetails::None,
            error: None,
        }
    }

    pub fn fail(
        gate_id: GateId,
        score: f64,
        summary: String,
        violations: Vec<Violation>,
    ) -> Self {
        Self {
            gate_id,
            status: GateStatus::Failed,
            passed: false,
            score,
            summary,
            violations,
            warnings: Vec::new(),
            execution_time_ms: 0,
            details: GateDetails::None,
            error: None,
        }
    }

    pub fn skipped(gate_id: GateId, reason: String) -> Self {
        Self {
            gate_id,
            status: GateStatus::Skipped,
            passed: true,
            score: 100.0,
            summary: reason,
            violations: Vec::new(),
            warnings: Vec::new(),
            execution_time_ms: 0,
            details: GateDetails::None,
            error: None,
        }
    }

    pub fn errored(gate_id: GateId, error: String) -> Self {
        Self {
            gate_id,
            status: GateStatus::Errored,
            passed: false,
            score: 0.0,
            summary: format!("gate errored: {error}"),
            violations: Vec::new(),
            warnings: Vec::new(),
            execution_time_ms: 0,
            details: GateDetails::None,
            error: Some(error),
        }
    }

    pub fn with_details(mut self, details: GateDetails) -> Self {
        self.details = details;
        self
    }
}

/// Overall run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Passed,
    Warned,
    Failed,
}

/// Policy identity echoed into the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRef {
    pub id: String,
    pub name: String,
}

/// Run metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetadata {
    pub execution_time_ms: u64,
    pub files_checked: usize,
    pub gates_run: usize,
    pub gates_skipped: usize,
    /// Unix seconds.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    pub ci: bool,
}

/// The aggregated verdict of one quality-gate run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityGateResult {
    pub passed: bool,
    pub status: RunStatus,
    /// Weighted mean of per-gate scores, 0–100.
    pub score: f64,
    pub summary: String,
    /// Keyed by gate id string for stable JSON.
    pub gates: BTreeMap<String, GateResult>,
    /// Flat, severity-sorted.
    pub violations: Vec<Violation>,
    pub warnings: Vec<String>,
    pub policy: PolicyRef,
    pub metadata: RunMetadata,
    /// 0 pass, 1 fail. (2 is reserved for configuration/store errors and
    /// produced by the embedding surface, not by a completed run.)
    pub exit_code: i32,
}

impl QualityGateResult {
    /// `(errors, warnings, infos)` over the flat violation list.
    pub fn totals(&self) -> (usize, usize, usize) {
        let mut totals = (0, 0, 0);
        for violation in &self.violations {
            match violation.severity {
                Severity::Error => totals.0 += 1,
                Severity::Warning => totals.1 += 1,
                Severity::Info | Severity::Hint => totals.2 += 1,
            }
        }
        totals
    }
}
