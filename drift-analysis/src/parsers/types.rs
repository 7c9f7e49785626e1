//! Canonical parse output. Every downstream system consumes this shape.

use drift_core::types::collections::SmallVec2;
use drift_core::types::location::SemanticLocation;
use serde::{Deserialize, Serialize};

use crate::scanner::Language;

/// Facts extracted from one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub file: String,
    pub language: Language,
    /// False only when the parser produced nothing usable.
    pub success: bool,

    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub calls: Vec<CallSite>,
    pub decorators: Vec<DecoratorInfo>,
    pub string_literals: Vec<StringLiteral>,
    pub semantic_locations: Vec<SemanticLocation>,
    pub diagnostics: Vec<Diagnostic>,

    pub parse_time_us: u64,
}

impl ParseResult {
    pub fn empty(file: &str, language: Language) -> Self {
        Self {
            file: file.to_string(),
            language,
            success: true,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            calls: Vec::new(),
            decorators: Vec::new(),
            string_literals: Vec::new(),
            semantic_locations: Vec::new(),
            diagnostics: Vec::new(),
            parse_time_us: 0,
        }
    }

    /// Interface declarations (a view over `classes`).
    pub fn interfaces(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.iter().filter(|c| c.kind == DeclKind::Interface)
    }

    /// Type alias declarations.
    pub fn type_aliases(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.iter().filter(|c| c.kind == DeclKind::TypeAlias)
    }

    /// Enum declarations.
    pub fn enums(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.iter().filter(|c| c.kind == DeclKind::Enum)
    }
}

/// What a class-like declaration actually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Class,
    Interface,
    Struct,
    Enum,
    Trait,
    TypeAlias,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// `Class.method` for members, `name` otherwise.
    pub qualified_name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub column: u32,
    pub is_async: bool,
    pub is_exported: bool,
    pub return_type: Option<String>,
    pub parameters: Vec<Parameter>,
    pub decorators: Vec<String>,
    /// xxh3 of the body text; changes iff the body changes.
    pub body_hash: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_annotation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub kind: DeclKind,
    pub extends: Option<String>,
    pub implements: SmallVec2<String>,
    pub is_exported: bool,
    pub start_line: u32,
    pub end_line: u32,
    pub methods: Vec<FunctionInfo>,
    pub properties: Vec<String>,
    pub decorators: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportInfo {
    pub source: String,
    pub names: Vec<ImportName>,
    pub line: u32,
    pub is_type_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportName {
    pub imported: String,
    pub local: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportInfo {
    pub name: Option<String>,
    pub is_default: bool,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSite {
    pub callee_name: String,
    pub receiver: Option<String>,
    pub line: u32,
    pub column: u32,
    pub is_method_call: bool,
    /// Raw argument texts, truncated; empty for argument-less calls.
    pub args: Vec<String>,
    pub is_await: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoratorInfo {
    pub name: String,
    pub raw: String,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
    pub line: u32,
    pub column: u32,
}

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: u32,
}
