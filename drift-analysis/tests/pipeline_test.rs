//! End-to-end pipeline tests: scan → store → approve → gate.

use std::path::Path;

use drift_analysis::enforcement::orchestrator::GateRequest;
use drift_analysis::ScanSession;
use drift_core::config::DriftConfig;
use drift_core::types::identifiers::PatternId;
use drift_core::types::pattern::{PatternCategory, PatternStatus};
use drift_core::NoopEvents;
use drift_storage::Manifest;

const ROUTE_TEMPLATE: &str = r#"
import { Router } from 'express';
const router = Router();

router.get('/api/ROUTE', (req, res) => {
  res.json({ data: payload, error: null });
});
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn route_file(root: &Path, rel: &str, route: &str) {
    write(root, rel, &ROUTE_TEMPLATE.replace("ROUTE", route));
}

#[test]
fn scan_populates_stores_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    route_file(dir.path(), "src/a.ts", "users");
    write(dir.path(), "src/b.ts", "// placeholder\n");

    let session = ScanSession::open(dir.path(), DriftConfig::default()).unwrap();
    let report = session.scan(&NoopEvents).unwrap();

    assert_eq!(report.diff.added.len(), 2);
    assert!(report.patterns_discovered > 0);

    let patterns = session.pattern_store().get_all();
    let route_pattern = patterns
        .iter()
        .find(|p| p.category == PatternCategory::Api && p.subcategory == "rest-route")
        .expect("route pattern stored");
    assert_eq!(route_pattern.status, PatternStatus::Discovered);
    assert_eq!(route_pattern.locations.len(), 1);
    assert_eq!(route_pattern.locations[0].file, "src/a.ts");

    // Manifest: forward and reverse indices agree; the placeholder file
    // carries no route pattern.
    let manifest = Manifest::load(&dir.path().join(".drift/manifest.json")).unwrap();
    assert!(manifest.files["src/a.ts"]
        .patterns
        .contains(&route_pattern.id.to_string()));
    assert!(!manifest.files["src/b.ts"]
        .patterns
        .contains(&route_pattern.id.to_string()));
    for (pattern_id, files) in &manifest.patterns {
        for file in files {
            assert!(manifest.files[file].patterns.contains(pattern_id));
        }
    }
}

#[test]
fn rescan_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    route_file(dir.path(), "src/a.ts", "users");

    let session = ScanSession::open(dir.path(), DriftConfig::default()).unwrap();
    session.scan(&NoopEvents).unwrap();
    let first = session.pattern_store().get_all();

    let second_report = session.scan(&NoopEvents).unwrap();
    assert!(second_report.diff.added.is_empty());
    assert!(second_report.diff.modified.is_empty());

    let second = session.pattern_store().get_all();

    // Byte-identical modulo the observation timestamps.
    let canonical = |patterns: &[drift_core::types::pattern::Pattern]| {
        let mut patterns = patterns.to_vec();
        for p in &mut patterns {
            p.first_seen = 0;
            p.last_seen = 0;
        }
        serde_json::to_string(&patterns).unwrap()
    };
    assert_eq!(
        canonical(&first),
        canonical(&second),
        "stored pattern state must be identical across identical scans"
    );
}

/// Approval, then an outlier introduced in a new file: the pattern stays
/// approved, the divergent location lands in `outliers`, and the gate run
/// on the new file fails.
#[test]
fn approve_then_outlier_then_gate() {
    let dir = tempfile::tempdir().unwrap();
    route_file(dir.path(), "src/a.ts", "users");
    route_file(dir.path(), "src/b.ts", "orders");
    route_file(dir.path(), "src/d.ts", "carts");

    let session = ScanSession::open(dir.path(), DriftConfig::default()).unwrap();
    session.scan(&NoopEvents).unwrap();

    let pattern_id = PatternId("api/rest-route/envelope".to_string());
    session.pattern_store().approve(&pattern_id).unwrap();
    session.pattern_store().save_all().unwrap();

    // New file with the same route shape but a different envelope.
    write(
        dir.path(),
        "src/c.ts",
        r#"
import { Router } from 'express';
const router = Router();

router.get('/api/misc', (req, res) => {
  res.json({ result: payload });
});
"#,
    );
    session.scan(&NoopEvents).unwrap();

    let pattern = session.pattern_store().get(&pattern_id).unwrap();
    assert_eq!(pattern.status, PatternStatus::Approved, "approval survives rescans");
    assert_eq!(pattern.outliers.len(), 1);
    assert_eq!(pattern.outliers[0].location.file, "src/c.ts");
    assert!(pattern.outliers[0].reason.contains("envelope"));
    assert_eq!(session.pattern_store().get_stats().total_outliers, 1);

    // Quality gates on the outlier commit.
    let result = session
        .check(&GateRequest {
            files: vec!["src/c.ts".to_string()],
            ..Default::default()
        })
        .unwrap();
    assert!(!result.passed);
    assert_eq!(result.exit_code, 1);
    assert!(result
        .violations
        .iter()
        .any(|v| v.file == "src/c.ts" && v.pattern_id == pattern_id.to_string()));
}

#[test]
fn constraints_synthesize_from_approved_patterns() {
    let dir = tempfile::tempdir().unwrap();
    for (i, name) in ["users", "orders", "carts", "items", "tags"].iter().enumerate() {
        route_file(dir.path(), &format!("src/r{i}.ts"), name);
    }

    let session = ScanSession::open(dir.path(), DriftConfig::default()).unwrap();
    session.scan(&NoopEvents).unwrap();

    let pattern_id = PatternId("api/rest-route/envelope".to_string());
    session.pattern_store().approve(&pattern_id).unwrap();
    session.pattern_store().save_all().unwrap();

    // Re-scan re-runs synthesis against the now-approved pattern.
    session.scan(&NoopEvents).unwrap();

    let constraints = session.constraint_store().get_active();
    let constraint = constraints
        .iter()
        .find(|c| c.id == "constraint/api/rest-route")
        .expect("constraint synthesized from the approved pattern");
    assert!(constraint.rule.contains("envelope:{data,error}"));
    assert!(constraint.source_patterns.contains(&pattern_id));
}

#[test]
fn empty_project_scan_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let session = ScanSession::open(dir.path(), DriftConfig::default()).unwrap();
    let report = session.scan(&NoopEvents).unwrap();
    assert_eq!(report.diff.stats.total_files, 0);
    assert_eq!(report.patterns_discovered, 0);

    let manifest = Manifest::load(&dir.path().join(".drift/manifest.json")).unwrap();
    assert!(manifest.files.is_empty());
}
