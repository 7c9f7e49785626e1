//! Security detectors.

use drift_core::types::pattern::{PatternCategory, Severity};
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation, Violation};
use crate::scanner::Language;

/// Flags credentials committed into source.
pub struct HardcodedSecretDetector {
    assignment: Regex,
}

impl HardcodedSecretDetector {
    pub fn new() -> Self {
        Self {
            assignment: Regex::new(
                r#"(?i)\b(api[_-]?key|secret|password|passwd|auth[_-]?token|access[_-]?key)\s*[:=]\s*["']([^"']{8,})["']"#,
            )
            .expect("static regex"),
        }
    }
}

impl Default for HardcodedSecretDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for HardcodedSecretDetector {
    fn id(&self) -> &'static str {
        "security.secrets"
    }
    fn name(&self) -> &'static str {
        "Hardcoded secret"
    }
    fn description(&self) -> &'static str {
        "Credential-looking literals assigned in source"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Security
    }
    fn subcategory(&self) -> &'static str {
        "secrets"
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
            for caps in self.assignment.captures_iter(line) {
                let value = &caps[2];
                // Placeholder values are not findings.
                let lower = value.to_lowercase();
                if lower.contains("example")
                    || lower.contains("placeholder")
                    || lower.contains("your-")
                    || lower.contains("changeme")
                    || lower.starts_with("${")
                    || lower.starts_with("process.env")
                {
                    continue;
                }
                result.violations.push(Violation {
                    id: format!("security.secrets:{}:{line_no}", ctx.file),
                    pattern_id: "security/secrets/literal".to_string(),
                    severity: Severity::Error,
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    end_line: line_no,
                    message: format!("possible hardcoded {}", caps[1].to_lowercase()),
                    expected: "credentials injected via environment or a secret store".to_string(),
                    actual: "credential literal in source".to_string(),
                    explanation:
                        "Source-controlled credentials leak through history, forks and builds."
                            .to_string(),
                    suggested_fix: Some("read the value from the environment at startup".to_string()),
                    first_seen: 0,
                    occurrences: 1,
                });
            }
        }
        result
    }
}

/// Tracks CORS configuration; wildcard origins are violations.
pub struct CorsWildcardDetector {
    wildcard: Regex,
    configured: Regex,
}

impl CorsWildcardDetector {
    pub fn new() -> Self {
        Self {
            wildcard: Regex::new(
                r#"(?:Access-Control-Allow-Origin['"]?\s*[,:]\s*['"]\*|origin\s*:\s*['"]\*['"])"#,
            )
            .expect("static regex"),
            configured: Regex::new(r"\bcors\s*\(").expect("static regex"),
        }
    }
}

impl Default for CorsWildcardDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for CorsWildcardDetector {
    fn id(&self) -> &'static str {
        "security.cors"
    }
    fn name(&self) -> &'static str {
        "CORS origin policy"
    }
    fn description(&self) -> &'static str {
        "CORS configuration and wildcard origins"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Security
    }
    fn subcategory(&self) -> &'static str {
        "cors"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::JavaScript, Language::Python, Language::Go]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();
        for (line_no, line) in ctx.code_lines() {
            let is_wildcard = self.wildcard.is_match(line);
            if is_wildcard {
                result.violations.push(Violation {
                    id: format!("security.cors:{}:{line_no}", ctx.file),
                    pattern_id: "security/cors/origin".to_string(),
                    severity: Severity::Warning,
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    end_line: line_no,
                    message: "CORS allows any origin".to_string(),
                    expected: "an explicit origin allowlist".to_string(),
                    actual: "wildcard origin".to_string(),
                    explanation: "A wildcard origin hands every site access to authenticated responses.".to_string(),
                    suggested_fix: None,
                    first_seen: 0,
                    occurrences: 1,
                });
            }
            if is_wildcard || self.configured.is_match(line) {
                result.observations.push(Observation {
                    pattern_key: "origin-policy".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: if is_wildcard { "wildcard" } else { "configured" }.to_string(),
                    confidence: 0.85,
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

    fn ctx<'a>(content: &'a str, parse: &'a ParseResult) -> DetectionContext<'a> {
        DetectionContext {
            file: "src/config.ts",
            content,
            language: Language::TypeScript,
            parse,
            chains: &[],
            data_access: &[],
            is_test_file: false,
            is_type_definition: false,
            file_hash: "abc",
        }
    }

    #[test]
    fn literal_secret_is_error() {
        let detector = HardcodedSecretDetector::new();
        let parse = ParseResult::empty("src/config.ts", Language::TypeScript);
        let content = r#"const config = { api_key: "sk-live-0a1b2c3d4e5f" };"#;
        let result = detector.detect(&ctx(content, &parse));
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, Severity::Error);
    }

    #[test]
    fn placeholder_secret_is_ignored() {
        let detector = HardcodedSecretDetector::new();
        let parse = ParseResult::empty("src/config.ts", Language::TypeScript);
        let content = r#"const config = { api_key: "your-api-key-here" };"#;
        assert!(detector.detect(&ctx(content, &parse)).violations.is_empty());
    }
}
