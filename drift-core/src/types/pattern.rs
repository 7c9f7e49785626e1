//! The pattern data model.
//!
//! Patterns are the unit of knowledge Drift extracts from a codebase: a
//! recurring structural shape with a confidence score, a set of conforming
//! locations, and a set of outliers that diverge from the majority.

use serde::{Deserialize, Serialize};

use super::identifiers::PatternId;

/// Pattern categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternCategory {
    Api,
    Auth,
    DataAccess,
    Logging,
    Performance,
    Documentation,
    Accessibility,
    Security,
    Testing,
    Structural,
    Observability,
    ErrorHandling,
}

impl PatternCategory {
    pub fn all() -> &'static [PatternCategory] {
        &[
            Self::Api,
            Self::Auth,
            Self::DataAccess,
            Self::Logging,
            Self::Performance,
            Self::Documentation,
            Self::Accessibility,
            Self::Security,
            Self::Testing,
            Self::Structural,
            Self::Observability,
            Self::ErrorHandling,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Auth => "auth",
            Self::DataAccess => "data-access",
            Self::Logging => "logging",
            Self::Performance => "performance",
            Self::Documentation => "documentation",
            Self::Accessibility => "accessibility",
            Self::Security => "security",
            Self::Testing => "testing",
            Self::Structural => "structural",
            Self::Observability => "observability",
            Self::ErrorHandling => "error-handling",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.name() == s)
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle status of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternStatus {
    Discovered,
    Approved,
    Ignored,
}

impl PatternStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Approved => "approved",
            Self::Ignored => "ignored",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "discovered" => Some(Self::Discovered),
            "approved" => Some(Self::Approved),
            "ignored" => Some(Self::Ignored),
            _ => None,
        }
    }
}

impl std::fmt::Display for PatternStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Violation severity, ordered most severe first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Hint => "hint",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Confidence tier derived deterministically from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    Uncertain,
}

impl ConfidenceLevel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Uncertain => "uncertain",
        }
    }

    /// Bucket a score: ≥0.85 high, ≥0.7 medium, ≥0.5 low, else uncertain.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            Self::High
        } else if score >= 0.7 {
            Self::Medium
        } else if score >= 0.5 {
            Self::Low
        } else {
            Self::Uncertain
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A confidence score with its derived level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub score: f64,
    pub level: ConfidenceLevel,
}

impl Confidence {
    pub fn from_score(score: f64) -> Self {
        let score = score.clamp(0.0, 1.0);
        Self {
            score,
            level: ConfidenceLevel::from_score(score),
        }
    }
}

/// A single conforming occurrence of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternLocation {
    pub file: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    /// Short content hash of the file at observation time.
    pub file_hash: String,
    /// Canonical shape extracted by the detector; drives majority voting.
    pub signature: String,
}

/// A location that diverges from the pattern's majority signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternOutlier {
    pub location: PatternLocation,
    pub reason: String,
}

/// A discovered convention with evidence and lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub id: PatternId,
    pub name: String,
    pub category: PatternCategory,
    pub subcategory: String,
    pub status: PatternStatus,
    pub confidence: Confidence,
    pub locations: Vec<PatternLocation>,
    pub outliers: Vec<PatternOutlier>,
    pub severity: Severity,
    /// Unix seconds of the first and most recent observation.
    pub first_seen: i64,
    pub last_seen: i64,
    /// Approved pattern that stopped matching; retained, flagged stale.
    #[serde(default)]
    pub stale: bool,
    pub description: String,
}

impl Pattern {
    /// Sort locations by `(file, start_line, start_column)` and outliers
    /// likewise, making serialized state byte-identical across runs.
    pub fn normalize(&mut self) {
        self.locations.sort_by(|a, b| {
            (&a.file, a.start_line, a.start_column).cmp(&(
                &b.file,
                b.start_line,
                b.start_column,
            ))
        });
        self.outliers.sort_by(|a, b| {
            (&a.location.file, a.location.start_line, a.location.start_column).cmp(&(
                &b.location.file,
                b.location.start_line,
                b.location.start_column,
            ))
        });
    }

    /// Compliance rate over this pattern's evidence.
    pub fn compliance(&self) -> f64 {
        let total = self.locations.len() + self.outliers.len();
        if total == 0 {
            1.0
        } else {
            self.locations.len() as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bucketing() {
        assert_eq!(ConfidenceLevel::from_score(0.9), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.85), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.84), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.7), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.49), ConfidenceLevel::Uncertain);
    }

    #[test]
    fn category_round_trip() {
        for cat in PatternCategory::all() {
            assert_eq!(PatternCategory::parse(cat.name()), Some(*cat));
        }
        assert_eq!(PatternCategory::parse("data-access"), Some(PatternCategory::DataAccess));
        assert_eq!(PatternCategory::parse("nonsense"), None);
    }

    #[test]
    fn severity_orders_most_severe_first() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
        assert!(Severity::Info < Severity::Hint);
    }
}
