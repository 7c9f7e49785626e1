//! Documentation coverage detection.

use drift_core::types::pattern::PatternCategory;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation};
use crate::scanner::Language;

/// Observes whether exported functions carry a doc comment. When most do,
/// the undocumented ones become outliers.
pub struct PublicDocDetector;

impl Detector for PublicDocDetector {
    fn id(&self) -> &'static str {
        "docs.public-api"
    }
    fn name(&self) -> &'static str {
        "Public API documentation"
    }
    fn description(&self) -> &'static str {
        "Doc comments on exported functions"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Documentation
    }
    fn subcategory(&self) -> &'static str {
        "public-api"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let lines: Vec<&str> = ctx.content.lines().collect();
        let mut result = DetectionResult::empty();

        for func in ctx.parse.functions.iter().filter(|f| f.is_exported) {
            let documented = has_doc_above(&lines, func.start_line);
            result.observations.push(Observation {
                pattern_key: "exported-fn".to_string(),
                file: ctx.file.to_string(),
                start_line: func.start_line,
                start_column: func.column,
                end_line: func.start_line,
                signature: if documented { "documented" } else { "undocumented" }.to_string(),
                confidence: 0.7,
            });
        }
        result
    }
}

/// A doc comment directly above `line` (1-based), skipping decorators.
fn has_doc_above(lines: &[&str], line: u32) -> bool {
    let mut idx = (line as usize).min(lines.len());
    // lines[idx - 1] is the declaration itself.
    while idx > 1 {
        idx -= 1;
        let above = lines[idx - 1].trim();
        if above.starts_with('@') || above.starts_with("#[") {
            continue;
        }
        return above.starts_with("///")
            || above.starts_with("/**")
            || above.starts_with("*/")
            || above.starts_with('*')
            || above.starts_with("\"\"\"")
            || (above.starts_with('#') && !above.starts_with("#!"));
    }
    false
}
