//! Testing-convention detectors. These run on test files only.

use drift_core::types::pattern::PatternCategory;
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation};
use crate::scanner::Language;

/// Tracks the naming scheme of test cases; the dominant scheme is the
/// convention.
pub struct TestNamingDetector {
    js_test: Regex,
}

impl TestNamingDetector {
    pub fn new() -> Self {
        Self {
            js_test: Regex::new(r#"\b(?:it|test)\(\s*["'`]([^"'`]+)["'`]"#)
                .expect("static regex"),
        }
    }

    fn scheme(name: &str) -> &'static str {
        let lower = name.to_lowercase();
        if lower.starts_with("should ") {
            "should-style"
        } else if lower.starts_with("returns ")
            || lower.starts_with("creates ")
            || lower.starts_with("updates ")
            || lower.starts_with("fails ")
            || lower.starts_with("rejects ")
        {
            "verb-style"
        } else if lower.starts_with("when ") || lower.starts_with("given ") {
            "bdd-style"
        } else {
            "plain"
        }
    }
}

impl Default for TestNamingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for TestNamingDetector {
    fn id(&self) -> &'static str {
        "testing.naming"
    }
    fn name(&self) -> &'static str {
        "Test naming scheme"
    }
    fn description(&self) -> &'static str {
        "How test cases are named"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Testing
    }
    fn subcategory(&self) -> &'static str {
        "naming"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if !ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();

        for (idx, line) in ctx.content.lines().enumerate() {
            let line_no = idx as u32 + 1;
            for caps in self.js_test.captures_iter(line) {
                result.observations.push(Observation {
                    pattern_key: "case-name".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: Self::scheme(&caps[1]).to_string(),
                    confidence: 0.8,
                });
            }
            // Rust / Python test functions.
            let trimmed = line.trim_start();
            if trimmed.starts_with("fn test_") || trimmed.starts_with("def test_") {
                result.observations.push(Observation {
                    pattern_key: "case-name".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: "test-prefix".to_string(),
                    confidence: 0.8,
                });
            }
        }
        result
    }
}

/// Tracks which assertion surface tests use.
pub struct AssertionStyleDetector {
    assertion: Regex,
}

impl AssertionStyleDetector {
    pub fn new() -> Self {
        Self {
            assertion: Regex::new(
                r"\b(expect\(|assert\.|assert_eq!|assert!|self\.assert[A-Z][a-zA-Z]*\()",
            )
            .expect("static regex"),
        }
    }

    fn style(matched: &str) -> &'static str {
        if matched.starts_with("expect(") {
            "expect"
        } else if matched.starts_with("assert_eq!") || matched.starts_with("assert!") {
            "rust-macro"
        } else if matched.starts_with("self.assert") {
            "unittest"
        } else {
            "assert-module"
        }
    }
}

impl Default for AssertionStyleDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for AssertionStyleDetector {
    fn id(&self) -> &'static str {
        "testing.assertions"
    }
    fn name(&self) -> &'static str {
        "Assertion style"
    }
    fn description(&self) -> &'static str {
        "Which assertion surface tests call"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Testing
    }
    fn subcategory(&self) -> &'static str {
        "assertions"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if !ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();
        for (idx, line) in ctx.content.lines().enumerate() {
            let line_no = idx as u32 + 1;
            for caps in self.assertion.captures_iter(line) {
                result.observations.push(Observation {
                    pattern_key: "surface".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: Self::style(&caps[1]).to_string(),
                    confidence: 0.85,
                });
            }
        }
        result
    }
}
