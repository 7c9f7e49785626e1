//! Pattern store integration tests: round-trip, lifecycle, stats.

use drift_core::types::identifiers::PatternId;
use drift_core::types::pattern::*;
use drift_storage::pattern_store::{PatternPatch, PatternStore, MAX_LOCATIONS_PER_PATTERN};

fn pattern(id: &str, locations: usize, outliers: usize) -> Pattern {
    let make_loc = |i: usize| PatternLocation {
        file: format!("src/file{i:04}.ts"),
        start_line: 1 + i as u32,
        start_column: 0,
        end_line: 2 + i as u32,
        file_hash: "abc123def456".to_string(),
        signature: "envelope:{data}".to_string(),
    };
    Pattern {
        id: PatternId(id.to_string()),
        name: format!("pattern {id}"),
        category: PatternCategory::Api,
        subcategory: "rest-route".to_string(),
        status: PatternStatus::Discovered,
        confidence: Confidence::from_score(0.9),
        locations: (0..locations).map(make_loc).collect(),
        outliers: (0..outliers)
            .map(|i| PatternOutlier {
                location: make_loc(1000 + i),
                reason: "envelope diverges from majority".to_string(),
            })
            .collect(),
        severity: Severity::Warning,
        first_seen: 100,
        last_seen: 100,
        stale: false,
        description: "test pattern".to_string(),
    }
}

#[test]
fn save_then_get_round_trips() {
    let store = PatternStore::open_in_memory().unwrap();
    let p = pattern("api/rest-route/aaa", 2, 1);
    store.add(p.clone());
    store.save_all().unwrap();

    let loaded = store.get(&p.id).unwrap();
    assert_eq!(loaded.id, p.id);
    assert_eq!(loaded.locations.len(), 2);
    assert_eq!(loaded.outliers.len(), 1);
    assert_eq!(loaded.outliers[0].reason, "envelope diverges from majority");
    assert_eq!(loaded.confidence.level, ConfidenceLevel::High);
}

#[test]
fn reads_observe_committed_state_only() {
    let store = PatternStore::open_in_memory().unwrap();
    store.add(pattern("api/rest-route/bbb", 1, 0));
    // Not yet committed.
    assert!(store.get(&PatternId("api/rest-route/bbb".into())).is_none());
    store.save_all().unwrap();
    assert!(store.get(&PatternId("api/rest-route/bbb".into())).is_some());
}

#[test]
fn persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("patterns.db");
    {
        let store = PatternStore::open(&db_path).unwrap();
        store.add(pattern("auth/middleware/ccc", 3, 0));
        store.save_all().unwrap();
    }
    let store = PatternStore::open(&db_path).unwrap();
    let loaded = store.get(&PatternId("auth/middleware/ccc".into())).unwrap();
    assert_eq!(loaded.locations.len(), 3);
}

#[test]
fn approve_requires_location() {
    let store = PatternStore::open_in_memory().unwrap();
    store.add(pattern("api/rest-route/empty", 0, 0));
    let id = PatternId("api/rest-route/empty".into());
    assert!(store.approve(&id).is_err());

    store.add(pattern("api/rest-route/full", 1, 0));
    let id = PatternId("api/rest-route/full".into());
    store.approve(&id).unwrap();
    store.save_all().unwrap();
    assert_eq!(store.get(&id).unwrap().status, PatternStatus::Approved);
}

#[test]
fn ignore_preserves_evidence_and_unignore_rediscoveres() {
    let store = PatternStore::open_in_memory().unwrap();
    store.add(pattern("logging/structured/ddd", 2, 1));
    let id = PatternId("logging/structured/ddd".into());

    store.ignore(&id).unwrap();
    store.save_all().unwrap();
    let loaded = store.get(&id).unwrap();
    assert_eq!(loaded.status, PatternStatus::Ignored);
    assert_eq!(loaded.locations.len(), 2);
    assert_eq!(loaded.outliers.len(), 1);

    store.unignore(&id).unwrap();
    store.save_all().unwrap();
    assert_eq!(store.get(&id).unwrap().status, PatternStatus::Discovered);
}

#[test]
fn approved_cannot_be_ignored_directly() {
    let store = PatternStore::open_in_memory().unwrap();
    store.add(pattern("api/rest-route/eee", 1, 0));
    let id = PatternId("api/rest-route/eee".into());
    store.approve(&id).unwrap();
    assert!(store.ignore(&id).is_err());
}

#[test]
fn absorb_scan_demotes_low_confidence_approved() {
    let store = PatternStore::open_in_memory().unwrap();
    store.add(pattern("api/rest-route/fff", 2, 0));
    let id = PatternId("api/rest-route/fff".into());
    store.approve(&id).unwrap();

    let mut rescan = pattern("api/rest-route/fff", 2, 0);
    rescan.confidence = Confidence::from_score(0.3);
    store.absorb_scan(vec![rescan], 200);
    store.save_all().unwrap();

    assert_eq!(store.get(&id).unwrap().status, PatternStatus::Discovered);
}

#[test]
fn absorb_scan_flags_stale_approved() {
    let store = PatternStore::open_in_memory().unwrap();
    store.add(pattern("api/rest-route/ggg", 2, 0));
    let id = PatternId("api/rest-route/ggg".into());
    store.approve(&id).unwrap();

    // Re-scan far in the future with no matches for this pattern.
    let far_future = 100 + 365 * 24 * 60 * 60;
    store.absorb_scan(Vec::new(), far_future);
    store.save_all().unwrap();

    let loaded = store.get(&id).unwrap();
    assert_eq!(loaded.status, PatternStatus::Approved);
    assert!(loaded.stale);
}

#[test]
fn oversized_evidence_is_truncated() {
    let store = PatternStore::open_in_memory().unwrap();
    store.add(pattern("perf/n-plus-one/hhh", MAX_LOCATIONS_PER_PATTERN + 500, 0));
    store.save_all().unwrap();
    let loaded = store
        .get(&PatternId("perf/n-plus-one/hhh".into()))
        .unwrap();
    assert_eq!(loaded.locations.len(), MAX_LOCATIONS_PER_PATTERN);
}

#[test]
fn stats_aggregate_by_status_category_level() {
    let store = PatternStore::open_in_memory().unwrap();
    store.add(pattern("api/rest-route/s1", 2, 1));
    store.add(pattern("api/rest-route/s2", 1, 0));
    let mut low = pattern("auth/middleware/s3", 1, 0);
    low.confidence = Confidence::from_score(0.55);
    store.add(low);
    store.ignore(&PatternId("api/rest-route/s2".into())).unwrap();
    store.save_all().unwrap();

    let stats = store.get_stats();
    assert_eq!(stats.total_patterns, 3);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.discovered, 2);
    assert_eq!(stats.by_category["api"], 2);
    assert_eq!(stats.by_category["auth"], 1);
    assert_eq!(stats.by_confidence_level["high"], 2);
    assert_eq!(stats.by_confidence_level["low"], 1);
    assert_eq!(stats.total_locations, 4);
    assert_eq!(stats.total_outliers, 1);
}

#[test]
fn patch_updates_fields() {
    let store = PatternStore::open_in_memory().unwrap();
    store.add(pattern("docs/jsdoc/iii", 1, 0));
    let id = PatternId("docs/jsdoc/iii".into());
    store
        .update(
            &id,
            PatternPatch {
                severity: Some(Severity::Error),
                description: Some("updated".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    store.save_all().unwrap();
    let loaded = store.get(&id).unwrap();
    assert_eq!(loaded.severity, Severity::Error);
    assert_eq!(loaded.description, "updated");
}
