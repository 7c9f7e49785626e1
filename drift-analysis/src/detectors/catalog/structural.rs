//! Structural detectors: module size and export shape.

use drift_core::types::pattern::{PatternCategory, Severity};

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation, Violation};
use crate::scanner::Language;

const LARGE_MODULE_LINES: usize = 800;

/// Buckets module sizes; monster files become violations.
pub struct ModuleSizeDetector;

impl Detector for ModuleSizeDetector {
    fn id(&self) -> &'static str {
        "structural.module-size"
    }
    fn name(&self) -> &'static str {
        "Module size"
    }
    fn description(&self) -> &'static str {
        "Distribution of module sizes across the codebase"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Structural
    }
    fn subcategory(&self) -> &'static str {
        "module-size"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let line_count = ctx.content.lines().count();
        let bucket = match line_count {
            0..=200 => "small",
            201..=500 => "medium",
            _ => "large",
        };

        let mut result = DetectionResult::empty();
        result.observations.push(Observation {
            pattern_key: "bucket".to_string(),
            file: ctx.file.to_string(),
            start_line: 1,
            start_column: 0,
            end_line: line_count as u32,
            signature: bucket.to_string(),
            confidence: 0.7,
        });

        if line_count > LARGE_MODULE_LINES {
            result.violations.push(Violation {
                id: format!("structural.module-size:{}", ctx.file),
                pattern_id: "structural/module-size/bucket".to_string(),
                severity: Severity::Info,
                file: ctx.file.to_string(),
                start_line: 1,
                end_line: line_count as u32,
                message: format!("module has {line_count} lines"),
                expected: format!("modules under {LARGE_MODULE_LINES} lines"),
                actual: format!("{line_count} lines"),
                explanation: "Very large modules concentrate churn and resist review.".to_string(),
                suggested_fix: None,
                first_seen: 0,
                occurrences: 1,
            });
        }
        result
    }
}

/// Tracks barrel files (index modules that only re-export).
pub struct BarrelExportDetector;

impl Detector for BarrelExportDetector {
    fn id(&self) -> &'static str {
        "structural.barrel"
    }
    fn name(&self) -> &'static str {
        "Barrel exports"
    }
    fn description(&self) -> &'static str {
        "index modules that re-export their directory"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Structural
    }
    fn subcategory(&self) -> &'static str {
        "barrel"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::JavaScript]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        let file_name = ctx.file.rsplit('/').next().unwrap_or(ctx.file);
        if !file_name.starts_with("index.") {
            return DetectionResult::empty();
        }

        let reexports = ctx
            .content
            .lines()
            .filter(|l| l.trim_start().starts_with("export ") && l.contains(" from "))
            .count();
        if reexports == 0 {
            return DetectionResult::empty();
        }

        let mut result = DetectionResult::empty();
        result.observations.push(Observation {
            pattern_key: "index".to_string(),
            file: ctx.file.to_string(),
            start_line: 1,
            start_column: 0,
            end_line: 1,
            signature: "barrel".to_string(),
            confidence: 0.8,
        });
        result
    }
}
