//! Detector engine integration tests: discovery, outliers, determinism.

use std::path::Path;

use drift_analysis::detectors::engine::{DetectorEngine, FileInput};
use drift_analysis::parsers::ParserRegistry;
use drift_analysis::provider::{chains, MatcherEngine};
use drift_analysis::scanner::hasher;
use drift_analysis::scanner::Language;
use drift_core::types::pattern::PatternCategory;

fn input(file: &str, language: Language, content: &str) -> FileInput {
    let parse = ParserRegistry::with_defaults()
        .parse(language, content.as_bytes(), Path::new(file))
        .unwrap();
    let file_chains = chains::extract_chains(content, file, language);
    let matchers = MatcherEngine::with_defaults();
    let data_access = file_chains
        .iter()
        .filter_map(|c| matchers.match_chain(c))
        .collect();
    FileInput {
        file: file.to_string(),
        content: content.to_string(),
        language,
        parse,
        chains: file_chains,
        data_access,
        file_hash: hasher::short_hash(&hasher::hash_content(content.as_bytes())),
    }
}

const ROUTE_WITH_ENVELOPE: &str = r#"
import { Router } from 'express';
const router = Router();

router.get('/api/users', (req, res) => {
  res.json({ data: users, error: null });
});
"#;

#[test]
fn fresh_scan_discovers_route_pattern() {
    let engine = DetectorEngine::with_defaults();
    let files = vec![
        input("src/a.ts", Language::TypeScript, ROUTE_WITH_ENVELOPE),
        input("src/b.ts", Language::TypeScript, "// empty\n"),
    ];
    let output = engine.run(&files, 100);

    let route_pattern = output
        .patterns
        .iter()
        .find(|p| p.category == PatternCategory::Api && p.subcategory == "rest-route")
        .expect("route pattern discovered");
    assert_eq!(route_pattern.locations.len(), 1);
    assert_eq!(route_pattern.locations[0].file, "src/a.ts");
    assert!(route_pattern.outliers.is_empty());
    assert_eq!(
        route_pattern.status,
        drift_core::types::pattern::PatternStatus::Discovered
    );
}

#[test]
fn divergent_envelope_becomes_outlier() {
    // Three conforming handlers establish the majority; the fourth file
    // responds with a different envelope and is reclassified.
    let conforming = |path: &str| input(path, Language::TypeScript, ROUTE_WITH_ENVELOPE);
    let divergent = input(
        "src/c.ts",
        Language::TypeScript,
        r#"
const router = require('express').Router();
router.get('/api/users2', (req, res) => {
  res.json({ result: users });
});
"#,
    );

    let engine = DetectorEngine::with_defaults();
    let files = vec![
        conforming("src/a.ts"),
        conforming("src/b.ts"),
        conforming("src/d.ts"),
        divergent,
    ];
    let output = engine.run(&files, 100);

    let pattern = output
        .patterns
        .iter()
        .find(|p| p.subcategory == "rest-route")
        .expect("route pattern");
    assert_eq!(pattern.locations.len(), 3);
    assert_eq!(pattern.outliers.len(), 1);
    let outlier = &pattern.outliers[0];
    assert_eq!(outlier.location.file, "src/c.ts");
    assert!(outlier.reason.contains("envelope"));
    // Disjointness: no location shares the outlier's position.
    assert!(!pattern
        .locations
        .iter()
        .any(|l| l.file == outlier.location.file
            && l.start_line == outlier.location.start_line));
}

#[test]
fn detection_is_deterministic() {
    let files = || {
        vec![
            input("src/a.ts", Language::TypeScript, ROUTE_WITH_ENVELOPE),
            input(
                "src/db.ts",
                Language::TypeScript,
                "const rows = await knex('users').where({ active: true }).select('id');\n",
            ),
            input(
                "src/log.ts",
                Language::TypeScript,
                "logger.info('starting');\nconsole.log('dbg');\n",
            ),
        ]
    };

    let engine = DetectorEngine::with_defaults();
    let first = engine.run(&files(), 100);
    let second = engine.run(&files(), 100);

    let serialize = |output: &drift_analysis::detectors::engine::EngineOutput| {
        serde_json::to_string(&output.patterns).unwrap()
    };
    assert_eq!(serialize(&first), serialize(&second));
}

#[test]
fn data_access_pattern_from_matchers() {
    let engine = DetectorEngine::with_defaults();
    let files = vec![input(
        "src/db.rs",
        Language::Rust,
        r#"pub async fn load(pool: &PgPool) -> anyhow::Result<Row> {
    let rows = sqlx::query("SELECT id, email FROM users WHERE id = $1").fetch_one(pool).await?;
    Ok(rows)
}
"#,
    )];
    let output = engine.run(&files, 100);
    let pattern = output
        .patterns
        .iter()
        .find(|p| p.category == PatternCategory::DataAccess && p.subcategory == "framework")
        .expect("data-access pattern");
    assert_eq!(pattern.locations[0].signature, "sqlx");
}

#[test]
fn interpolated_sql_yields_violation() {
    let engine = DetectorEngine::with_defaults();
    let files = vec![input(
        "src/db.ts",
        Language::TypeScript,
        "const rows = await pool.query(`SELECT * FROM users WHERE id = ${id}`);\n",
    )];
    let output = engine.run(&files, 100);
    assert!(output
        .violations
        .iter()
        .any(|v| v.pattern_id.contains("raw-sql")
            && v.severity == drift_core::types::pattern::Severity::Error));
}

#[test]
fn test_files_do_not_feed_style_patterns() {
    let engine = DetectorEngine::with_defaults();
    let files = vec![input(
        "src/auth.test.ts",
        Language::TypeScript,
        "console.log('in test');\n",
    )];
    let output = engine.run(&files, 100);
    assert!(!output
        .patterns
        .iter()
        .any(|p| p.category == PatternCategory::Logging));
}

#[test]
fn catalog_reports_no_failures_on_benign_input() {
    let engine = DetectorEngine::with_defaults();
    let files = vec![input("src/ok.ts", Language::TypeScript, "export const a = 1;\n")];
    let output = engine.run(&files, 100);
    assert!(output.failures.is_empty());
    assert!(output.health.iter().all(|h| !h.unhealthy));
}
