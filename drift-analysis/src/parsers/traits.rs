//! The contract every language parser implements.

use std::path::Path;

use drift_core::errors::ParseError;

use super::types::ParseResult;
use crate::scanner::Language;

pub trait LanguageParser: Send + Sync {
    /// The language this parser handles.
    fn language(&self) -> Language;

    /// Extract structural facts from source.
    ///
    /// Returns `Err` only when parsing cannot start at all; recoverable
    /// syntax errors surface as diagnostics on the result.
    fn parse(&self, source: &[u8], path: &Path) -> Result<ParseResult, ParseError>;
}
