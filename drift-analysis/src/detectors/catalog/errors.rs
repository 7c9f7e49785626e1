//! Error-handling detectors: taxonomy shape and swallowed errors.

use drift_core::types::pattern::{PatternCategory, Severity};
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation, Violation};
use crate::scanner::Language;

/// Tracks what gets thrown: domain error classes vs. bare `Error`/strings.
pub struct ErrorTaxonomyDetector {
    throw_site: Regex,
}

impl ErrorTaxonomyDetector {
    pub fn new() -> Self {
        Self {
            throw_site: Regex::new(r"\b(?:throw new|raise)\s+([A-Za-z_][A-Za-z0-9_]*)")
                .expect("static regex"),
        }
    }
}

impl Default for ErrorTaxonomyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ErrorTaxonomyDetector {
    fn id(&self) -> &'static str {
        "errors.taxonomy"
    }
    fn name(&self) -> &'static str {
        "Error taxonomy"
    }
    fn description(&self) -> &'static str {
        "Domain error classes vs. bare errors at throw sites"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::ErrorHandling
    }
    fn subcategory(&self) -> &'static str {
        "taxonomy"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[
            Language::TypeScript,
            Language::JavaScript,
            Language::Python,
            Language::Java,
            Language::CSharp,
            Language::Php,
        ]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();
        for (line_no, line) in ctx.code_lines() {
            for caps in self.throw_site.captures_iter(line) {
                let class = &caps[1];
                let signature = if class == "Error" || class == "Exception" {
                    "bare-error"
                } else if class.ends_with("Error") || class.ends_with("Exception") {
                    "domain-error"
                } else {
                    continue;
                };
                result.observations.push(Observation {
                    pattern_key: "throw-site".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: signature.to_string(),
                    confidence: 0.85,
                });
            }
        }
        result
    }
}

/// Flags empty catch blocks: errors silently swallowed.
pub struct EmptyCatchDetector {
    empty_catch: Regex,
}

impl EmptyCatchDetector {
    pub fn new() -> Self {
        Self {
            empty_catch: Regex::new(r"catch\s*(?:\([^)]*\))?\s*\{\s*\}").expect("static regex"),
        }
    }
}

impl Default for EmptyCatchDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for EmptyCatchDetector {
    fn id(&self) -> &'static str {
        "errors.empty-catch"
    }
    fn name(&self) -> &'static str {
        "Empty catch block"
    }
    fn description(&self) -> &'static str {
        "Catch blocks that swallow errors without handling them"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::ErrorHandling
    }
    fn subcategory(&self) -> &'static str {
        "swallowed"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[
            Language::TypeScript,
            Language::JavaScript,
            Language::Java,
            Language::CSharp,
            Language::Php,
        ]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();
        let lines: Vec<&str> = ctx.content.lines().collect();

        for (i, line) in lines.iter().enumerate() {
            let line_no = i as u32 + 1;
            // Single-line `catch (e) {}` or the two-line form where the
            // brace closes on the next line.
            let single = self.empty_catch.is_match(line);
            let two_line = line.contains("catch")
                && line.trim_end().ends_with('{')
                && lines.get(i + 1).is_some_and(|next| next.trim() == "}");
            if !single && !two_line {
                continue;
            }
            result.violations.push(Violation {
                id: format!("errors.empty-catch:{}:{line_no}", ctx.file),
                pattern_id: "error-handling/swallowed/catch".to_string(),
                severity: Severity::Warning,
                file: ctx.file.to_string(),
                start_line: line_no,
                end_line: if two_line { line_no + 1 } else { line_no },
                message: "empty catch block swallows the error".to_string(),
                expected: "log, rethrow, or translate the error".to_string(),
                actual: "catch with an empty body".to_string(),
                explanation: "A swallowed error hides failures from both users and operators."
                    .to_string(),
                suggested_fix: None,
                first_seen: 0,
                occurrences: 1,
            });
        }

        result
    }
}
