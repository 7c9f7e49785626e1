//! Parser layer — per-language extraction of the structural facts the
//! detectors consume.
//!
//! One parser per supported language. Grammar-backed languages share a
//! single tree-sitter cursor-walk engine; Markdown, CSS and JSON use
//! heuristic extraction. Parsers are resilient: a syntax error inside a
//! region yields a diagnostic but correctly parsed regions are still
//! extracted.

pub mod engine;
pub mod heuristic;
pub mod languages;
pub mod locations;
pub mod traits;
pub mod types;

pub use languages::ParserRegistry;
pub use traits::LanguageParser;
pub use types::{CallSite, ClassInfo, Diagnostic, FunctionInfo, ImportInfo, ParseResult};
