//! Performance detectors.

use drift_core::types::pattern::{PatternCategory, Severity};
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation, Violation};
use crate::scanner::Language;

/// Flags data-access calls issued inside a loop body — the classic N+1
/// query shape. Loop extent is approximated by brace tracking from the
/// loop header.
pub struct QueryInLoopDetector {
    loop_header: Regex,
}

impl QueryInLoopDetector {
    pub fn new() -> Self {
        Self {
            loop_header: Regex::new(r"\b(?:for\s*\(|for\s+\w+\s+in\s|while\s*\(|\.forEach\(|\.map\()")
                .expect("static regex"),
        }
    }

    /// Line ranges covered by loop bodies, approximated by brace depth.
    fn loop_ranges(&self, content: &str) -> Vec<(u32, u32)> {
        let mut ranges = Vec::new();
        let lines: Vec<&str> = content.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            if !self.loop_header.is_match(line) {
                continue;
            }
            let start = i as u32 + 1;
            let mut depth: i32 = 0;
            let mut end = start;
            for (j, body_line) in lines.iter().enumerate().skip(i) {
                depth += body_line.matches(['{', '('].as_ref()).count() as i32;
                depth -= body_line.matches(['}', ')'].as_ref()).count() as i32;
                end = j as u32 + 1;
                if j > i && depth <= 0 {
                    break;
                }
                // Python-style loops have no braces; bound by indentation
                // window instead.
                if j > i + 30 {
                    break;
                }
            }
            ranges.push((start, end));
        }
        ranges
    }
}

impl Default for QueryInLoopDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for QueryInLoopDetector {
    fn id(&self) -> &'static str {
        "perf.query-in-loop"
    }
    fn name(&self) -> &'static str {
        "Query inside loop"
    }
    fn description(&self) -> &'static str {
        "Data access issued per loop iteration (N+1 shape)"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Performance
    }
    fn subcategory(&self) -> &'static str {
        "n-plus-one"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file || ctx.data_access.is_empty() {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();
        let ranges = self.loop_ranges(ctx.content);

        for access in ctx.data_access {
            let in_loop = ranges
                .iter()
                .any(|(start, end)| *start < access.line && access.line <= *end);
            if !in_loop {
                continue;
            }
            let table = access.table.as_deref().unwrap_or("<unknown>");
            result.violations.push(Violation {
                id: format!("perf.query-in-loop:{}:{}", ctx.file, access.line),
                pattern_id: "performance/n-plus-one/query".to_string(),
                severity: Severity::Warning,
                file: ctx.file.to_string(),
                start_line: access.line,
                end_line: access.line,
                message: format!("query against `{table}` runs once per loop iteration"),
                expected: "a single batched query outside the loop".to_string(),
                actual: "per-iteration data access".to_string(),
                explanation: "Each iteration pays a round-trip; batch the lookup or join instead."
                    .to_string(),
                suggested_fix: None,
                first_seen: 0,
                occurrences: 1,
            });
            result.observations.push(Observation {
                pattern_key: "query".to_string(),
                file: ctx.file.to_string(),
                start_line: access.line,
                start_column: 0,
                end_line: access.line,
                signature: "in-loop".to_string(),
                confidence: 0.7,
            });
        }
        result
    }
}

/// Tracks synchronous I/O in async runtimes.
pub struct BlockingIoDetector {
    blocking: Regex,
}

impl BlockingIoDetector {
    pub fn new() -> Self {
        Self {
            blocking: Regex::new(
                r"\b(?:readFileSync|writeFileSync|existsSync|execSync|statSync)\(",
            )
            .expect("static regex"),
        }
    }
}

impl Default for BlockingIoDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for BlockingIoDetector {
    fn id(&self) -> &'static str {
        "perf.blocking-io"
    }
    fn name(&self) -> &'static str {
        "Blocking I/O"
    }
    fn description(&self) -> &'static str {
        "Synchronous filesystem/process calls on async paths"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Performance
    }
    fn subcategory(&self) -> &'static str {
        "blocking-io"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::JavaScript]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();
        for (line_no, line) in ctx.code_lines() {
            if self.blocking.is_match(line) {
                result.observations.push(Observation {
                    pattern_key: "sync-call".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: "sync".to_string(),
                    confidence: 0.8,
                });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::types::ParseResult;
    use crate::provider::types::{DataAccessMatch, DataOperation};
    use std::collections::BTreeMap;

    #[test]
    fn query_inside_for_loop_is_flagged() {
        let detector = QueryInLoopDetector::new();
        let content = "for (const id of ids) {\n  const user = await prisma.user.findUnique({ where: { id } });\n}\n";
        let parse = ParseResult::empty("src/users.ts", Language::TypeScript);
        let access = DataAccessMatch {
            matcher_id: "prisma".to_string(),
            table: Some("user".to_string()),
            fields: Vec::new(),
            operation: DataOperation::Read,
            confidence: 0.95,
            is_raw_sql: false,
            metadata: BTreeMap::new(),
            file: "src/users.ts".to_string(),
            line: 2,
        };
        let ctx = DetectionContext {
            file: "src/users.ts",
            content,
            language: Language::TypeScript,
            parse: &parse,
            chains: &[],
            data_access: std::slice::from_ref(&access),
            is_test_file: false,
            is_type_definition: false,
            file_hash: "abc",
        };
        let result = detector.detect(&ctx);
        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0].message.contains("user"));
    }
}
