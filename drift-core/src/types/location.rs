//! Semantic locations — the positional vocabulary shared by parsers,
//! detectors and stores.

use serde::{Deserialize, Serialize};

/// What kind of construct a semantic location points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Class,
    Function,
    Method,
    Variable,
    Constant,
    Interface,
    Type,
    Enum,
    Module,
    Decorator,
    Block,
    File,
}

impl LocationKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
            Self::Variable => "variable",
            Self::Constant => "constant",
            Self::Interface => "interface",
            Self::Type => "type",
            Self::Enum => "enum",
            Self::Module => "module",
            Self::Decorator => "decorator",
            Self::Block => "block",
            Self::File => "file",
        }
    }
}

/// A named span inside a source file.
///
/// Invariants: members' ranges lie inside the parent's range, and
/// `span_hash` changes iff the snippet text changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticLocation {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub kind: LocationKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SemanticLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// xxh3 hash of the span text.
    pub span_hash: u64,
}

impl SemanticLocation {
    /// Whether `other` lies entirely inside this location's range.
    pub fn contains(&self, other: &SemanticLocation) -> bool {
        self.file == other.file
            && self.start_line <= other.start_line
            && other.end_line <= self.end_line
    }
}
