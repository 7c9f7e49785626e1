//! Constraint store, contract store and snapshot tests.

use drift_core::types::constraint::{Constraint, ConstraintStatus};
use drift_core::types::contract::*;
use drift_core::types::identifiers::PatternId;
use drift_core::types::pattern::PatternCategory;
use drift_storage::{ConstraintStore, ContractStore, SnapshotStore};
use drift_storage::snapshots::{sanitize_snapshot_id, HealthSnapshot, SnapshotPattern};

fn constraint(id: &str, status: ConstraintStatus) -> Constraint {
    Constraint {
        id: id.to_string(),
        category: PatternCategory::Api,
        subcategory: "rest-route".to_string(),
        rule: "signature == \"envelope:{data}\"".to_string(),
        description: "responses share one envelope".to_string(),
        min_confidence: 0.85,
        source_patterns: vec![PatternId("api/rest-route/envelope".to_string())],
        status,
        created_at: 10,
        updated_at: 10,
    }
}

#[test]
fn constraint_store_round_trip_and_upsert() {
    let store = ConstraintStore::open_in_memory().unwrap();
    store
        .save_all(&[constraint("c1", ConstraintStatus::Active)])
        .unwrap();

    let loaded = store.get("c1").unwrap();
    assert_eq!(loaded.rule, "signature == \"envelope:{data}\"");
    assert_eq!(loaded.source_patterns.len(), 1);
    assert_eq!(store.get_active().len(), 1);

    // Invalidation keeps the row for audit.
    let mut retired = constraint("c1", ConstraintStatus::Invalidated);
    retired.updated_at = 20;
    store.save_all(&[retired]).unwrap();
    assert!(store.get_active().is_empty());
    assert_eq!(store.get_all().len(), 1);
    assert_eq!(store.get("c1").unwrap().created_at, 10);
}

#[test]
fn contract_store_round_trip() {
    let store = ContractStore::open_in_memory().unwrap();
    let contract = Contract {
        id: "GET /api/users/{param}".to_string(),
        method: "GET".to_string(),
        normalized_path: "/api/users/{param}".to_string(),
        backend: BackendEndpoint {
            file: "src/routes.ts".to_string(),
            line: 12,
            response_fields: vec![ContractField {
                path: "data".to_string(),
                field_type: "object".to_string(),
                optional: false,
                nullable: false,
            }],
        },
        frontend_calls: vec![FrontendCall {
            file: "web/api.ts".to_string(),
            line: 4,
            expected_type: Some("User".to_string()),
            expected_fields: Vec::new(),
        }],
        mismatches: vec![FieldMismatch {
            field_path: "data.email".to_string(),
            kind: MismatchKind::MissingInFrontend,
            severity: drift_core::types::pattern::Severity::Warning,
        }],
        status: ContractStatus::Broken,
        confidence: 0.85,
    };
    store.save_all(std::slice::from_ref(&contract)).unwrap();

    let loaded = store.get("GET /api/users/{param}").unwrap();
    assert_eq!(loaded.method, "GET");
    assert_eq!(loaded.backend.response_fields[0].path, "data");
    assert_eq!(loaded.mismatches[0].kind, MismatchKind::MissingInFrontend);
    assert_eq!(loaded.status, ContractStatus::Broken);
}

#[test]
fn snapshots_save_load_latest() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("snapshots"));

    let mut patterns = std::collections::BTreeMap::new();
    patterns.insert(
        "api/rest-route/envelope".to_string(),
        SnapshotPattern {
            confidence: 0.95,
            compliance: 1.0,
            status: "approved".to_string(),
        },
    );

    let older = HealthSnapshot {
        id: "scan-001".to_string(),
        created_at: 100,
        branch: Some("main".to_string()),
        commit_sha: None,
        patterns: patterns.clone(),
    };
    let newer = HealthSnapshot {
        id: "scan-002".to_string(),
        created_at: 200,
        branch: None,
        commit_sha: Some("abc123".to_string()),
        patterns,
    };
    store.save(&older).unwrap();
    store.save(&newer).unwrap();

    assert_eq!(store.list(), vec!["scan-001", "scan-002"]);
    assert_eq!(store.load("scan-001").unwrap(), older);
    assert_eq!(store.latest().unwrap().id, "scan-002");
}

#[test]
fn snapshot_id_sanitization() {
    assert_eq!(sanitize_snapshot_id("feature/x y"), "feature-x-y");
    assert_eq!(sanitize_snapshot_id("scan_01"), "scan_01");
}
