//! Quality-gate orchestration tests.

use drift_analysis::enforcement::context::GateContext;
use drift_analysis::enforcement::orchestrator::{GateRequest, Orchestrator};
use drift_analysis::enforcement::policy::Policy;
use drift_analysis::enforcement::types::{GateStatus, RunStatus};
use drift_core::types::identifiers::PatternId;
use drift_core::types::pattern::*;
use drift_storage::snapshots::{HealthSnapshot, SnapshotPattern};

fn approved_pattern_with_outlier(score: f64) -> Pattern {
    Pattern {
        id: PatternId("api/rest-route/envelope".to_string()),
        name: "REST route registration".to_string(),
        category: PatternCategory::Api,
        subcategory: "rest-route".to_string(),
        status: PatternStatus::Approved,
        confidence: Confidence::from_score(score),
        locations: vec![PatternLocation {
            file: "src/a.ts".to_string(),
            start_line: 12,
            start_column: 0,
            end_line: 12,
            file_hash: "aaaaaaaaaaaa".to_string(),
            signature: "envelope:{data,error}".to_string(),
        }],
        outliers: vec![PatternOutlier {
            location: PatternLocation {
                file: "src/c.ts".to_string(),
                start_line: 4,
                start_column: 0,
                end_line: 4,
                file_hash: "cccccccccccc".to_string(),
                signature: "envelope:{result}".to_string(),
            },
            reason: "signature `envelope:{result}` diverges from the majority `envelope:{data,error}` (1 of 2 occurrences conform)".to_string(),
        }],
        severity: Severity::Error,
        first_seen: 50,
        last_seen: 100,
        stale: false,
        description: "majority signature: envelope:{data,error}".to_string(),
    }
}

fn request(files: &[&str]) -> GateRequest {
    GateRequest {
        files: files.iter().map(|f| f.to_string()).collect(),
        ..Default::default()
    }
}

/// An outlier commit fails the compliance gate with one error at the
/// outlier's location, and the run exits 1.
#[test]
fn outlier_commit_fails_pattern_compliance() {
    let ctx = GateContext {
        changed_files: vec!["src/c.ts".to_string()],
        patterns: vec![approved_pattern_with_outlier(0.9)],
        ..Default::default()
    };

    let result = Orchestrator::new().run(&ctx, &Policy::default_policy(), &request(&["src/c.ts"]));

    assert!(!result.passed);
    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.exit_code, 1);
    assert!(result.score < 100.0);

    let compliance = &result.gates["pattern-compliance"];
    assert_eq!(compliance.status, GateStatus::Failed);

    let violation = result
        .violations
        .iter()
        .find(|v| v.file == "src/c.ts")
        .expect("violation at the outlier");
    assert_eq!(violation.start_line, 4);
    assert_eq!(violation.severity, Severity::Error);
    assert_eq!(violation.pattern_id, "api/rest-route/envelope");
}

#[test]
fn clean_change_set_passes() {
    let mut pattern = approved_pattern_with_outlier(0.9);
    pattern.outliers.clear();
    let ctx = GateContext {
        changed_files: vec!["src/a.ts".to_string()],
        patterns: vec![pattern],
        ..Default::default()
    };

    let result = Orchestrator::new().run(&ctx, &Policy::default_policy(), &request(&["src/a.ts"]));
    assert!(result.passed);
    assert_eq!(result.exit_code, 0);
}

#[test]
fn empty_file_list_short_circuits_to_pass() {
    let ctx = GateContext::default();
    let result = Orchestrator::new().run(&ctx, &Policy::default_policy(), &request(&[]));
    assert!(result.passed);
    assert_eq!(result.status, RunStatus::Passed);
    assert!(result.gates.is_empty());
}

fn regression_context() -> GateContext {
    // Baseline: confidence 0.95, full compliance. Current: 0.88 / 82%.
    let mut baseline_patterns = std::collections::BTreeMap::new();
    baseline_patterns.insert(
        "api/rest-route/envelope".to_string(),
        SnapshotPattern {
            confidence: 0.95,
            compliance: 1.0,
            status: "approved".to_string(),
        },
    );
    let baseline = HealthSnapshot {
        id: "last-scan".to_string(),
        created_at: 50,
        branch: None,
        commit_sha: None,
        patterns: baseline_patterns,
    };

    let mut pattern = approved_pattern_with_outlier(0.88);
    // 82% compliance: 9 locations, 2 outliers.
    pattern.locations = (0..9)
        .map(|i| PatternLocation {
            file: format!("src/f{i}.ts"),
            start_line: 1,
            start_column: 0,
            end_line: 1,
            file_hash: "aaaaaaaaaaaa".to_string(),
            signature: "envelope:{data,error}".to_string(),
        })
        .collect();
    pattern.outliers = (0..2)
        .map(|i| PatternOutlier {
            location: PatternLocation {
                file: format!("src/o{i}.ts"),
                start_line: 1,
                start_column: 0,
                end_line: 1,
                file_hash: "bbbbbbbbbbbb".to_string(),
                signature: "bare".to_string(),
            },
            reason: "diverges".to_string(),
        })
        .collect();

    GateContext {
        changed_files: vec!["src/f0.ts".to_string()],
        patterns: vec![pattern],
        baseline: Some(baseline),
        ..Default::default()
    }
}

/// With the default policy the regression gate is non-blocking: the run
/// warns. Under strict policy the same drop fails the run.
#[test]
fn regression_warns_by_default_fails_under_strict() {
    let ctx = regression_context();

    let default_result =
        Orchestrator::new().run(&ctx, &Policy::default_policy(), &request(&["src/f0.ts"]));
    let regression = &default_result.gates["regression-detection"];
    assert_eq!(regression.status, GateStatus::Failed);
    assert!(default_result.passed, "non-blocking gate must not fail the run");
    assert_eq!(default_result.status, RunStatus::Warned);

    let strict_result =
        Orchestrator::new().run(&ctx, &Policy::strict(), &request(&["src/f0.ts"]));
    assert!(!strict_result.passed);
    assert_eq!(strict_result.status, RunStatus::Failed);
}

#[test]
fn missing_baseline_skips_regression_gate() {
    let mut ctx = regression_context();
    ctx.baseline = None;

    let result = Orchestrator::new().run(&ctx, &Policy::strict(), &request(&["src/f0.ts"]));
    let regression = &result.gates["regression-detection"];
    assert_eq!(regression.status, GateStatus::Skipped);
}

#[test]
fn fail_on_warning_flips_exit_code() {
    let ctx = regression_context();
    let mut req = request(&["src/f0.ts"]);
    req.fail_on_warning = true;

    let result = Orchestrator::new().run(&ctx, &Policy::default_policy(), &req);
    assert_eq!(result.status, RunStatus::Warned);
    assert_eq!(result.exit_code, 1);
}

/// Gate soundness: a passing run has no failing blocking gate and every
/// required gate passed.
#[test]
fn gate_soundness_invariant() {
    let policy = Policy::default_policy();
    let contexts = vec![
        GateContext {
            changed_files: vec!["src/a.ts".to_string()],
            patterns: vec![approved_pattern_with_outlier(0.9)],
            ..Default::default()
        },
        regression_context(),
    ];

    for ctx in &contexts {
        let result = Orchestrator::new().run(ctx, &policy, &request(&["src/a.ts"]));
        if result.passed {
            for gate in result.gates.values() {
                let blocking = policy.settings(gate.gate_id).blocking;
                if blocking {
                    assert!(
                        !matches!(gate.status, GateStatus::Failed | GateStatus::Errored),
                        "blocking gate {} failed in a passing run",
                        gate.gate_id
                    );
                }
            }
            for required in &policy.required_gates {
                if let Some(gate) = result.gates.get(required.as_str()) {
                    assert!(!matches!(gate.status, GateStatus::Failed | GateStatus::Errored));
                }
            }
        }
    }
}

#[test]
fn security_gate_blocks_unguarded_protected_access() {
    use drift_analysis::provider::types::{DataAccessMatch, DataOperation};

    let ctx = GateContext {
        changed_files: vec!["src/admin.ts".to_string()],
        data_access: vec![DataAccessMatch {
            matcher_id: "prisma".to_string(),
            table: Some("users".to_string()),
            fields: vec![],
            operation: DataOperation::Delete,
            confidence: 0.95,
            is_raw_sql: false,
            metadata: Default::default(),
            file: "src/admin.ts".to_string(),
            line: 9,
        }],
        ..Default::default()
    };

    let result =
        Orchestrator::new().run(&ctx, &Policy::default_policy(), &request(&["src/admin.ts"]));
    assert!(!result.passed);
    let security = &result.gates["security-boundary"];
    assert_eq!(security.status, GateStatus::Failed);
    assert!(security.violations[0]
        .message
        .contains("protected table `users`"));
}
