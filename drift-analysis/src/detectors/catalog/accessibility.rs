//! Accessibility detectors for JSX/HTML-bearing files.

use drift_core::types::pattern::{PatternCategory, Severity};
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation, Violation};
use crate::scanner::Language;

/// Flags `<img>` elements without alt text and records conforming ones.
pub struct ImageAltDetector {
    img_tag: Regex,
    alt_attr: Regex,
}

impl ImageAltDetector {
    pub fn new() -> Self {
        Self {
            img_tag: Regex::new(r"<img\b[^>]*>").expect("static regex"),
            alt_attr: Regex::new(r#"\balt\s*=\s*["'{]"#).expect("static regex"),
        }
    }
}

impl Default for ImageAltDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ImageAltDetector {
    fn id(&self) -> &'static str {
        "a11y.img-alt"
    }
    fn name(&self) -> &'static str {
        "Image alt text"
    }
    fn description(&self) -> &'static str {
        "alt attributes on img elements"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Accessibility
    }
    fn subcategory(&self) -> &'static str {
        "img-alt"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::JavaScript, Language::Php, Language::Markdown]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        let mut result = DetectionResult::empty();
        for (idx, line) in ctx.content.lines().enumerate() {
            let line_no = idx as u32 + 1;
            for tag in self.img_tag.find_iter(line) {
                let has_alt = self.alt_attr.is_match(tag.as_str());
                result.observations.push(Observation {
                    pattern_key: "img".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: tag.start() as u32,
                    end_line: line_no,
                    signature: if has_alt { "alt-present" } else { "alt-missing" }.to_string(),
                    confidence: 0.9,
                });
                if !has_alt {
                    result.violations.push(Violation {
                        id: format!("a11y.img-alt:{}:{line_no}", ctx.file),
                        pattern_id: "accessibility/img-alt/img".to_string(),
                        severity: Severity::Warning,
                        file: ctx.file.to_string(),
                        start_line: line_no,
                        end_line: line_no,
                        message: "img element without alt text".to_string(),
                        expected: "an alt attribute (empty for decorative images)".to_string(),
                        actual: "no alt attribute".to_string(),
                        explanation: "Screen readers announce nothing useful for images without alt text.".to_string(),
                        suggested_fix: Some("add alt=\"…\" describing the image, or alt=\"\" if decorative".to_string()),
                        first_seen: 0,
                        occurrences: 1,
                    });
                }
            }
        }
        result
    }
}

/// Tracks aria-* attribute usage as a convention signal.
pub struct AriaUsageDetector {
    aria: Regex,
}

impl AriaUsageDetector {
    pub fn new() -> Self {
        Self {
            aria: Regex::new(r"\b(aria-[a-z]+)\s*=").expect("static regex"),
        }
    }
}

impl Default for AriaUsageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for AriaUsageDetector {
    fn id(&self) -> &'static str {
        "a11y.aria"
    }
    fn name(&self) -> &'static str {
        "ARIA attribute usage"
    }
    fn description(&self) -> &'static str {
        "aria-* attributes on interactive elements"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Accessibility
    }
    fn subcategory(&self) -> &'static str {
        "aria"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::JavaScript, Language::Php]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        let mut result = DetectionResult::empty();
        for (idx, line) in ctx.content.lines().enumerate() {
            let line_no = idx as u32 + 1;
            for caps in self.aria.captures_iter(line) {
                result.observations.push(Observation {
                    pattern_key: "attribute".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: caps[1].to_string(),
                    confidence: 0.8,
                });
            }
        }
        result
    }
}
