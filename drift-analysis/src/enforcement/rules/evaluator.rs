//! Custom rule evaluation over file contents.

use std::collections::BTreeMap;

use regex::Regex;

use crate::detectors::traits::Violation;

use super::types::CustomRule;

/// Run rules over `(path → content)`; invalid regexes are reported as
/// warnings, not failures.
pub fn evaluate_rules(
    rules: &[CustomRule],
    files: &BTreeMap<String, String>,
) -> (Vec<Violation>, Vec<String>) {
    let mut violations = Vec::new();
    let mut warnings = Vec::new();

    for rule in rules {
        let regex = match Regex::new(&rule.pattern) {
            Ok(r) => r,
            Err(e) => {
                warnings.push(format!("rule `{}` has an invalid pattern: {e}", rule.id));
                continue;
            }
        };

        for (path, content) in files {
            if let Some(suffix) = &rule.path_suffix {
                if !path.ends_with(suffix.as_str()) {
                    continue;
                }
            }
            for (idx, line) in content.lines().enumerate() {
                if regex.is_match(line) {
                    let line_no = idx as u32 + 1;
                    violations.push(Violation {
                        id: format!("{}:{path}:{line_no}", rule.id),
                        pattern_id: rule.id.clone(),
                        severity: rule.severity,
                        file: path.clone(),
                        start_line: line_no,
                        end_line: line_no,
                        message: rule.message.clone(),
                        expected: rule.description.clone(),
                        actual: line.trim().chars().take(120).collect(),
                        explanation: rule.description.clone(),
                        suggested_fix: None,
                        first_seen: 0,
                        occurrences: 1,
                    });
                }
            }
        }
    }

    violations.sort_by(|a, b| {
        (a.severity, &a.file, a.start_line).cmp(&(b.severity, &b.file, b.start_line))
    });
    (violations, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::types::pattern::Severity;

    #[test]
    fn rule_matches_and_suffix_filters() {
        let rules = vec![CustomRule {
            id: "no-debugger".to_string(),
            description: "debugger statements are not committed".to_string(),
            severity: Severity::Error,
            pattern: r"\bdebugger\b".to_string(),
            path_suffix: Some(".ts".to_string()),
            message: "remove the debugger statement".to_string(),
        }];
        let mut files = BTreeMap::new();
        files.insert("src/a.ts".to_string(), "debugger;\n".to_string());
        files.insert("src/b.py".to_string(), "debugger\n".to_string());

        let (violations, warnings) = evaluate_rules(&rules, &files);
        assert!(warnings.is_empty());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].file, "src/a.ts");
    }

    #[test]
    fn invalid_regex_is_a_warning() {
        let rules = vec![CustomRule {
            id: "broken".to_string(),
            description: String::new(),
            severity: Severity::Info,
            pattern: "(unclosed".to_string(),
            path_suffix: None,
            message: String::new(),
        }];
        let (violations, warnings) = evaluate_rules(&rules, &BTreeMap::new());
        assert!(violations.is_empty());
        assert_eq!(warnings.len(), 1);
    }
}
