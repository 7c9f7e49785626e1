//! Data-access detectors, driven by the framework matcher results.

use drift_core::types::pattern::{PatternCategory, Severity};
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation, Violation};
use crate::scanner::Language;

/// Tracks which ORM/framework each data access goes through. The majority
/// framework is the convention; stray raw SQL or a second ORM shows up as
/// outliers.
pub struct OrmUsageDetector;

impl Detector for OrmUsageDetector {
    fn id(&self) -> &'static str {
        "data.orm-usage"
    }
    fn name(&self) -> &'static str {
        "Data-access framework"
    }
    fn description(&self) -> &'static str {
        "Which data-access framework queries go through"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::DataAccess
    }
    fn subcategory(&self) -> &'static str {
        "framework"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        let mut result = DetectionResult::empty();
        for access in ctx.data_access {
            result.observations.push(Observation {
                pattern_key: "framework".to_string(),
                file: ctx.file.to_string(),
                start_line: access.line,
                start_column: 0,
                end_line: access.line,
                signature: access.matcher_id.clone(),
                confidence: access.confidence,
            });
        }
        result
    }
}

/// Flags raw SQL built with string interpolation — the one data-access
/// shape that is a defect regardless of convention.
pub struct RawSqlDetector {
    interpolation: Regex,
}

impl RawSqlDetector {
    pub fn new() -> Self {
        Self {
            // Template/format interpolation markers inside a SQL-looking string.
            interpolation: Regex::new(
                r#"(?i)(select|insert|update|delete)[^"'`]*(\$\{|\{\}|%s|\#\{|" \+ | \+ ")"#,
            )
            .expect("static regex"),
        }
    }
}

impl Default for RawSqlDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for RawSqlDetector {
    fn id(&self) -> &'static str {
        "data.raw-sql"
    }
    fn name(&self) -> &'static str {
        "Raw SQL hygiene"
    }
    fn description(&self) -> &'static str {
        "Raw SQL strings and interpolation-built queries"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::DataAccess
    }
    fn subcategory(&self) -> &'static str {
        "raw-sql"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        let mut result = DetectionResult::empty();

        for access in ctx.data_access.iter().filter(|a| a.is_raw_sql) {
            result.observations.push(Observation {
                pattern_key: "raw-query".to_string(),
                file: ctx.file.to_string(),
                start_line: access.line,
                start_column: 0,
                end_line: access.line,
                signature: "parameterized".to_string(),
                confidence: 0.85,
            });
        }

        if ctx.is_test_file {
            return result;
        }

        for (line_no, line) in ctx.code_lines() {
            if self.interpolation.is_match(line) {
                result.violations.push(Violation {
                    id: format!("data.raw-sql:{}:{line_no}", ctx.file),
                    pattern_id: "data-access/raw-sql/raw-query".to_string(),
                    severity: Severity::Error,
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    end_line: line_no,
                    message: "SQL built with string interpolation".to_string(),
                    expected: "parameterized query placeholders".to_string(),
                    actual: "interpolated query string".to_string(),
                    explanation:
                        "Interpolating values into SQL strings allows injection; use bind parameters."
                            .to_string(),
                    suggested_fix: Some(
                        "replace the interpolation with a bind placeholder ($1, ?, %s) and pass the value separately".to_string(),
                    ),
                    first_seen: 0,
                    occurrences: 1,
                });
            }
        }
        result
    }
}
