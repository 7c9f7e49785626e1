//! Detection context: everything a detector may inspect for one file.

use crate::parsers::types::ParseResult;
use crate::provider::types::{DataAccessMatch, UnifiedCallChain};
use crate::scanner::Language;

/// Read-only view over one file's facts. Borrowed for the duration of a
/// single `detect` call; detectors never hold on to it.
#[derive(Debug)]
pub struct DetectionContext<'a> {
    pub file: &'a str,
    pub content: &'a str,
    pub language: Language,
    pub parse: &'a ParseResult,
    pub chains: &'a [UnifiedCallChain],
    pub data_access: &'a [DataAccessMatch],
    pub is_test_file: bool,
    pub is_type_definition: bool,
    /// Short content hash of the file at scan time.
    pub file_hash: &'a str,
}

impl<'a> DetectionContext<'a> {
    /// Iterate `(1-based line number, line text)` skipping comment lines.
    pub fn code_lines(&self) -> impl Iterator<Item = (u32, &'a str)> {
        self.content
            .lines()
            .enumerate()
            .map(|(i, l)| (i as u32 + 1, l))
            .filter(|(_, l)| {
                let t = l.trim_start();
                !(t.starts_with("//")
                    || t.starts_with('#')
                    || t.starts_with("/*")
                    || t.starts_with('*'))
            })
    }
}

/// Classify whether a path is a test file.
pub fn is_test_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.contains(".test.")
        || lower.contains(".spec.")
        || lower.contains("__tests__/")
        || lower.contains("/tests/")
        || lower.starts_with("tests/")
        || lower
            .rsplit('/')
            .next()
            .is_some_and(|f| f.starts_with("test_") || f.ends_with("_test.go") || f.ends_with("_test.py"))
}

/// Classify whether a path is a type-definition file.
pub fn is_type_definition_path(path: &str) -> bool {
    path.ends_with(".d.ts")
}

/// Files detectors should never scan for style signals.
pub fn is_excluded_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.contains("node_modules/")
        || lower.contains("vendor/")
        || lower.ends_with(".min.js")
        || lower.ends_with(".min.css")
        || lower.contains("generated")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_classification() {
        assert!(is_test_path("src/auth.test.ts"));
        assert!(is_test_path("src/__tests__/auth.ts"));
        assert!(is_test_path("tests/integration.rs"));
        assert!(is_test_path("pkg/server_test.go"));
        assert!(!is_test_path("src/auth.ts"));
    }

    #[test]
    fn excluded_paths() {
        assert!(is_excluded_path("node_modules/lodash/index.js"));
        assert!(is_excluded_path("dist/bundle.min.js"));
        assert!(!is_excluded_path("src/app.ts"));
    }
}
