//! Constraint verification against a set of changed files.

use drift_core::types::collections::FxHashSet;
use drift_core::types::constraint::{Constraint, ConstraintStatus};
use drift_core::types::pattern::Pattern;

/// A constraint broken at a concrete location.
#[derive(Debug, Clone)]
pub struct ConstraintViolation {
    pub constraint_id: String,
    pub file: String,
    pub line: u32,
    pub message: String,
    pub expected: String,
    pub actual: String,
}

/// Check active constraints against the current pattern evidence,
/// restricted to `changed_files` (empty = all files).
pub fn verify(
    constraints: &[Constraint],
    patterns: &[Pattern],
    changed_files: &[String],
    min_confidence: f64,
) -> Vec<ConstraintViolation> {
    let changed: FxHashSet<&str> = changed_files.iter().map(String::as_str).collect();
    let mut violations = Vec::new();

    for constraint in constraints {
        if constraint.status != ConstraintStatus::Active {
            continue;
        }

        let expected_signature = expected_signature(&constraint.rule);

        for source_id in &constraint.source_patterns {
            let Some(pattern) = patterns.iter().find(|p| &p.id == source_id) else {
                continue;
            };
            if pattern.confidence.score < min_confidence {
                continue;
            }
            for outlier in &pattern.outliers {
                if !changed.is_empty() && !changed.contains(outlier.location.file.as_str()) {
                    continue;
                }
                violations.push(ConstraintViolation {
                    constraint_id: constraint.id.clone(),
                    file: outlier.location.file.clone(),
                    line: outlier.location.start_line,
                    message: format!("{}: {}", constraint.description, outlier.reason),
                    expected: expected_signature.clone(),
                    actual: outlier.location.signature.clone(),
                });
            }
        }
    }

    violations.sort_by(|a, b| {
        (&a.constraint_id, &a.file, a.line).cmp(&(&b.constraint_id, &b.file, b.line))
    });
    violations
}

/// Pull the expected signature back out of the machine-readable rule.
fn expected_signature(rule: &str) -> String {
    rule.split('"')
        .nth(1)
        .unwrap_or(rule)
        .to_string()
}
