//! Logging style detection.

use drift_core::types::pattern::PatternCategory;
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation};
use crate::scanner::Language;

/// Tracks how the codebase emits logs. Structured logger calls, bare
/// console/print calls and tracing macros each get a distinct signature;
/// whichever dominates becomes the convention and the rest are outliers.
pub struct LoggingStyleDetector {
    structured: Regex,
    bare: Regex,
    tracing_macro: Regex,
}

impl LoggingStyleDetector {
    pub fn new() -> Self {
        Self {
            structured: Regex::new(r"\b(?:logger|log)\.(?:info|warn|warning|error|debug|trace)\(")
                .expect("static regex"),
            bare: Regex::new(r"\b(?:console\.(?:log|warn|error|info)|print|println!|fmt\.Println)\(")
                .expect("static regex"),
            tracing_macro: Regex::new(r"\btracing::(?:info|warn|error|debug|trace)!")
                .expect("static regex"),
        }
    }
}

impl Default for LoggingStyleDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for LoggingStyleDetector {
    fn id(&self) -> &'static str {
        "logging.style"
    }
    fn name(&self) -> &'static str {
        "Logging style"
    }
    fn description(&self) -> &'static str {
        "Structured logger vs. bare console/print logging"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Logging
    }
    fn subcategory(&self) -> &'static str {
        "style"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();

        for (line_no, line) in ctx.code_lines() {
            let signature = if self.structured.is_match(line) {
                Some(("logger", 0.9))
            } else if self.tracing_macro.is_match(line) {
                Some(("tracing", 0.95))
            } else if self.bare.is_match(line) {
                Some(("bare", 0.85))
            } else {
                None
            };

            if let Some((signature, confidence)) = signature {
                result.observations.push(Observation {
                    pattern_key: "emission".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: signature.to_string(),
                    confidence,
                });
            }
        }
        result
    }
}
