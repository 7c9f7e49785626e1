//! Reporter equivalence tests: every format agrees with the result's
//! violation totals.

use std::collections::BTreeMap;

use drift_analysis::detectors::traits::Violation;
use drift_analysis::enforcement::report::{available_formats, create_reporter};
use drift_analysis::enforcement::types::{
    GateId, GateResult, PolicyRef, QualityGateResult, RunMetadata, RunStatus,
};
use drift_core::types::pattern::Severity;

fn violation(n: usize, severity: Severity) -> Violation {
    Violation {
        id: format!("rule-{n}:src/file{n}.ts:{}", n + 1),
        pattern_id: format!("rule-{n}"),
        severity,
        file: format!("src/file{n}.ts"),
        start_line: n as u32 + 1,
        end_line: n as u32 + 1,
        message: format!("violation number {n}"),
        expected: "the convention".to_string(),
        actual: "something else".to_string(),
        explanation: "diverges from the approved pattern".to_string(),
        suggested_fix: None,
        first_seen: 0,
        occurrences: 1,
    }
}

/// 3 errors, 2 warnings, 1 info.
fn sample_result() -> QualityGateResult {
    let violations = vec![
        violation(0, Severity::Error),
        violation(1, Severity::Error),
        violation(2, Severity::Error),
        violation(3, Severity::Warning),
        violation(4, Severity::Warning),
        violation(5, Severity::Info),
    ];
    let mut gate = GateResult::fail(
        GateId::PatternCompliance,
        40.0,
        "compliance 40%".to_string(),
        violations.clone(),
    );
    gate.execution_time_ms = 12;

    let mut gates = BTreeMap::new();
    gates.insert("pattern-compliance".to_string(), gate);

    QualityGateResult {
        passed: false,
        status: RunStatus::Failed,
        score: 40.0,
        summary: "failed: 3 error(s), 2 warning(s) across 1 gate(s)".to_string(),
        gates,
        violations,
        warnings: Vec::new(),
        policy: PolicyRef {
            id: "default".to_string(),
            name: "Default".to_string(),
        },
        metadata: RunMetadata {
            execution_time_ms: 20,
            files_checked: 6,
            gates_run: 1,
            gates_skipped: 0,
            timestamp: 1_700_000_000,
            branch: None,
            commit_sha: None,
            ci: false,
        },
        exit_code: 1,
    }
}

#[test]
fn totals_shape() {
    let result = sample_result();
    assert_eq!(result.totals(), (3, 2, 1));
}

#[test]
fn text_summary_line() {
    let result = sample_result();
    let text = create_reporter("text")
        .unwrap()
        .generate(&result)
        .unwrap();
    assert!(text.contains("3 errors, 2 warnings, 1 info (6 total)"));
    assert!(text.contains("Result: FAILED"));
    // Violations grouped by file.
    assert!(text.contains("src/file0.ts"));
}

#[test]
fn json_round_trips_the_result() {
    let result = sample_result();
    let json = create_reporter("json")
        .unwrap()
        .generate(&result)
        .unwrap();
    let parsed: QualityGateResult = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.totals(), result.totals());
    assert_eq!(parsed.exit_code, 1);
    assert_eq!(parsed.policy.id, "default");
}

#[test]
fn github_annotations_match_totals() {
    let result = sample_result();
    let out = create_reporter("github")
        .unwrap()
        .generate(&result)
        .unwrap();
    assert_eq!(out.matches("::error ").count(), 3);
    assert_eq!(out.matches("::warning ").count(), 2);
    // 1 info annotation + the summary notice.
    assert_eq!(out.matches("::notice").count(), 2);
    assert!(out.contains("drift_errors=3"));
    assert!(out.contains("drift_warnings=2"));
    assert!(out.contains("drift_passed=false"));
}

#[test]
fn gitlab_issues_match_totals_with_unique_fingerprints() {
    let result = sample_result();
    let out = create_reporter("gitlab")
        .unwrap()
        .generate(&result)
        .unwrap();
    let issues: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(issues.len(), 6);

    let count = |sev: &str| issues.iter().filter(|i| i["severity"] == sev).count();
    assert_eq!(count("critical"), 3);
    assert_eq!(count("major"), 2);
    assert_eq!(count("info"), 1);

    let fingerprints: std::collections::HashSet<&str> = issues
        .iter()
        .map(|i| i["fingerprint"].as_str().unwrap())
        .collect();
    assert_eq!(fingerprints.len(), 6, "fingerprints must be unique");
    for issue in &issues {
        assert_eq!(issue["type"], "issue");
        assert!(issue["location"]["lines"]["begin"].as_u64().unwrap() >= 1);
    }
}

#[test]
fn sarif_results_and_rules_are_consistent() {
    let result = sample_result();
    let out = create_reporter("sarif")
        .unwrap()
        .generate(&result)
        .unwrap();
    let sarif: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(sarif["version"], "2.1.0");
    let run = &sarif["runs"][0];
    assert_eq!(run["tool"]["driver"]["name"], "Drift Quality Gates");

    let results = run["results"].as_array().unwrap();
    assert_eq!(results.len(), 6);

    let level_count = |level: &str| results.iter().filter(|r| r["level"] == level).count();
    assert_eq!(level_count("error"), 3);
    assert_eq!(level_count("warning"), 2);
    assert_eq!(level_count("note"), 1);

    // Every result's ruleId exists in tool.driver.rules.
    let rule_ids: std::collections::HashSet<&str> = run["tool"]["driver"]["rules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    for r in results {
        assert!(rule_ids.contains(r["ruleId"].as_str().unwrap()));
    }
}

#[test]
fn unknown_format_is_none_and_formats_are_complete() {
    assert!(create_reporter("xml").is_none());
    for format in available_formats() {
        assert!(create_reporter(format).is_some());
    }
}
