//! Normalized call-chain types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scanner::Language;

/// A language-agnostic method chain.
///
/// `sqlx::query("…").fetch_one(&pool).await` normalizes to receiver
/// `sqlx` with segments `[query, fetch_one]`. Normalization is lossy by
/// design; consumers must tolerate missing argument bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedCallChain {
    pub language: Language,
    pub file: String,
    pub line: u32,
    /// Identifier before the first separator (`.`, `::`, `->`).
    pub receiver: String,
    pub segments: Vec<ChainSegment>,
}

impl UnifiedCallChain {
    /// First segment carrying the given name, if any.
    pub fn segment(&self, name: &str) -> Option<&ChainSegment> {
        self.segments.iter().find(|s| s.name == name)
    }

    pub fn has_segment(&self, name: &str) -> bool {
        self.segment(name).is_some()
    }
}

/// One link in a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSegment {
    pub name: String,
    pub is_call: bool,
    pub args: Vec<NormalizedArg>,
}

impl ChainSegment {
    /// First string-literal argument value.
    pub fn first_string_arg(&self) -> Option<&str> {
        self.args
            .iter()
            .find_map(|a| a.string_value.as_deref())
    }

    /// First identifier argument value.
    pub fn first_identifier_arg(&self) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.kind == ArgKind::Identifier)
            .map(|a| a.value.as_str())
    }
}

/// Coarse classification of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    String,
    Number,
    Identifier,
    Closure,
    Object,
    Array,
    Other,
}

/// A normalized argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedArg {
    pub kind: ArgKind,
    /// Raw source text, truncated.
    pub value: String,
    /// Unquoted value for string literals.
    pub string_value: Option<String>,
}

/// Data-access operation classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOperation {
    Read,
    Write,
    Delete,
}

impl DataOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

/// A recognized data-access pattern on a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataAccessMatch {
    /// Matcher that produced this result.
    pub matcher_id: String,
    pub table: Option<String>,
    pub fields: Vec<String>,
    pub operation: DataOperation,
    pub confidence: f64,
    pub is_raw_sql: bool,
    pub metadata: BTreeMap<String, String>,
    pub file: String,
    pub line: u32,
}
