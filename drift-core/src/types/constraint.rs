//! Constraints — machine-readable assertions synthesized from approved
//! patterns.

use serde::{Deserialize, Serialize};

use super::identifiers::PatternId;
use super::pattern::PatternCategory;

/// Lifecycle of a constraint. Invalidated rows are retained for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintStatus {
    Active,
    Invalidated,
}

impl ConstraintStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Invalidated => "invalidated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "invalidated" => Some(Self::Invalidated),
            _ => None,
        }
    }
}

/// A derived assertion over the codebase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub category: PatternCategory,
    pub subcategory: String,
    /// Machine-readable rule text, e.g. `signature == "envelope:{data,error}"`.
    pub rule: String,
    /// Natural-language description for reports.
    pub description: String,
    /// Evidence floor the source patterns must clear.
    pub min_confidence: f64,
    /// Approved patterns this constraint derives from.
    pub source_patterns: Vec<PatternId>,
    pub status: ConstraintStatus,
    pub created_at: i64,
    pub updated_at: i64,
}
