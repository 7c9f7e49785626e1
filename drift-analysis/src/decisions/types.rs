//! Decision-mining types.

use serde::{Deserialize, Serialize};

/// A summarized commit as mined from history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub timestamp: i64,
    pub files_changed: Vec<String>,
    pub insertions: u32,
    pub deletions: u32,
}

/// Architectural signal categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionCategory {
    DependencyChange,
    ApiSurface,
    SchemaMigration,
    SecurityFix,
    Performance,
    Configuration,
    Refactor,
    Testing,
}

impl DecisionCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DependencyChange => "dependency-change",
            Self::ApiSurface => "api-surface",
            Self::SchemaMigration => "schema-migration",
            Self::SecurityFix => "security-fix",
            Self::Performance => "performance",
            Self::Configuration => "configuration",
            Self::Refactor => "refactor",
            Self::Testing => "testing",
        }
    }
}

/// A long-lived architectural decision record mined from one commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub sha: String,
    pub category: DecisionCategory,
    pub title: String,
    pub timestamp: i64,
    pub author: String,
    /// Why this commit was classified as it was.
    pub evidence: String,
    pub files: Vec<String>,
}
