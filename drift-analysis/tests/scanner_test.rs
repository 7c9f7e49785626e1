//! Scanner integration tests: discovery, diffing, idempotence, ignores.

use std::path::Path;

use drift_core::config::ScanConfig;
use drift_core::types::collections::FxHashMap;
use drift_core::NoopEvents;
use drift_analysis::scanner::types::CachedFile;
use drift_analysis::scanner::Scanner;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn scan(root: &Path, cached: &FxHashMap<String, CachedFile>) -> drift_analysis::scanner::ScanDiff {
    let scanner = Scanner::new(ScanConfig::default());
    scanner.scan(root, cached, &NoopEvents).unwrap()
}

fn cache_of(diff: &drift_analysis::scanner::ScanDiff) -> FxHashMap<String, CachedFile> {
    diff.files
        .iter()
        .map(|(path, record)| {
            (
                path.clone(),
                CachedFile {
                    relative_path: path.clone(),
                    content_hash: record.content_hash.clone(),
                    mtime_secs: record.mtime_secs,
                },
            )
        })
        .collect()
}

#[test]
fn fresh_scan_reports_all_added() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.ts", "export const x = 1;\n");
    write(dir.path(), "src/b.ts", "// empty\n");

    let diff = scan(dir.path(), &FxHashMap::default());
    assert_eq!(diff.added, vec!["src/a.ts", "src/b.ts"]);
    assert!(diff.modified.is_empty());
    assert!(diff.removed.is_empty());
    assert!(diff.unchanged.is_empty());
    assert_eq!(diff.stats.total_files, 2);
    assert_eq!(diff.files["src/a.ts"].short_hash.len(), 12);
}

#[test]
fn rescan_of_unchanged_tree_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.ts", "export const x = 1;\n");
    write(dir.path(), "src/deep/b.py", "print('hi')\n");

    let first = scan(dir.path(), &FxHashMap::default());
    let second = scan(dir.path(), &cache_of(&first));

    assert!(second.added.is_empty());
    assert!(second.modified.is_empty());
    assert!(second.removed.is_empty());
    assert_eq!(second.unchanged.len(), 2);

    // Hashes are stable across runs.
    for (path, record) in &second.files {
        assert_eq!(record.content_hash, first.files[path].content_hash);
    }
}

#[test]
fn modify_add_remove_are_classified() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.ts", "export const x = 1;\n");
    write(dir.path(), "src/gone.ts", "old\n");

    let first = scan(dir.path(), &FxHashMap::default());
    let cached = cache_of(&first);

    write(dir.path(), "src/a.ts", "export const x = 2;\n");
    write(dir.path(), "src/new.ts", "fresh\n");
    std::fs::remove_file(dir.path().join("src/gone.ts")).unwrap();

    let second = scan(dir.path(), &cached);
    assert_eq!(second.added, vec!["src/new.ts"]);
    assert_eq!(second.modified, vec!["src/a.ts"]);
    assert_eq!(second.removed, vec!["src/gone.ts"]);
}

#[test]
fn built_in_ignores_and_driftignore_apply() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/keep.ts", "ok\n");
    write(dir.path(), "node_modules/lib/skip.js", "skip\n");
    write(dir.path(), ".drift/patterns.db", "private\n");
    write(dir.path(), ".driftignore", "secret/\n");
    write(dir.path(), "secret/token.ts", "skip\n");

    let diff = scan(dir.path(), &FxHashMap::default());
    let paths: Vec<&str> = diff.files.keys().map(String::as_str).collect();
    assert!(paths.contains(&"src/keep.ts"));
    assert!(!paths.iter().any(|p| p.starts_with("node_modules")));
    assert!(!paths.iter().any(|p| p.starts_with(".drift/")));
    assert!(!paths.iter().any(|p| p.starts_with("secret")));
}

#[test]
fn max_file_size_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let config = ScanConfig {
        max_file_size: 64,
        ..Default::default()
    };
    write(dir.path(), "exact.txt", &"a".repeat(64));
    write(dir.path(), "over.txt", &"a".repeat(65));

    let scanner = Scanner::new(config);
    let diff = scanner
        .scan(dir.path(), &FxHashMap::default(), &NoopEvents)
        .unwrap();
    assert!(diff.files.contains_key("exact.txt"));
    assert!(!diff.files.contains_key("over.txt"));
    assert_eq!(diff.stats.files_skipped_large, 1);
}

#[test]
fn binary_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/code.ts", "ok\n");
    std::fs::write(dir.path().join("blob.bin"), [0u8, 1, 2, 3, 0, 255]).unwrap();

    let diff = scan(dir.path(), &FxHashMap::default());
    assert!(diff.files.contains_key("src/code.ts"));
    assert!(!diff.files.contains_key("blob.bin"));
    assert_eq!(diff.stats.files_skipped_binary, 1);
}

#[test]
fn include_globs_whitelist() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.ts", "keep\n");
    write(dir.path(), "docs/readme.md", "drop\n");

    let config = ScanConfig {
        include: vec!["src/**".to_string()],
        ..Default::default()
    };
    let scanner = Scanner::new(config);
    let diff = scanner
        .scan(dir.path(), &FxHashMap::default(), &NoopEvents)
        .unwrap();
    assert!(diff.files.contains_key("src/a.ts"));
    assert!(!diff.files.contains_key("docs/readme.md"));
    assert!(diff.stats.files_skipped_ignored >= 1);
}

#[test]
fn empty_codebase_scans_clean() {
    let dir = tempfile::tempdir().unwrap();
    let diff = scan(dir.path(), &FxHashMap::default());
    assert_eq!(diff.stats.total_files, 0);
    assert!(diff.added.is_empty());
    assert!(!diff.incomplete);
}

#[test]
fn missing_root_is_fatal() {
    let scanner = Scanner::new(ScanConfig::default());
    let result = scanner.scan(
        Path::new("/definitely/not/a/real/path"),
        &FxHashMap::default(),
        &NoopEvents,
    );
    assert!(matches!(
        result,
        Err(drift_core::errors::ScanError::RootNotFound { .. })
    ));
}

#[cfg(unix)]
#[test]
fn symlink_cycle_terminates() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.ts", "ok\n");
    std::os::unix::fs::symlink(dir.path().join("src"), dir.path().join("src/loop")).unwrap();

    let config = ScanConfig {
        follow_symlinks: true,
        ..Default::default()
    };
    let scanner = Scanner::new(config);
    let diff = scanner
        .scan(dir.path(), &FxHashMap::default(), &NoopEvents)
        .unwrap();
    assert!(diff.files.keys().any(|p| p.ends_with("a.ts")));
}

#[test]
fn language_classification_in_records() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "const x = 1;\n");
    write(dir.path(), "b.py", "x = 1\n");
    write(dir.path(), "script", "#!/usr/bin/env python3\nprint('x')\n");

    let diff = scan(dir.path(), &FxHashMap::default());
    use drift_analysis::scanner::Language;
    assert_eq!(diff.files["a.ts"].language, Some(Language::TypeScript));
    assert_eq!(diff.files["b.py"].language, Some(Language::Python));
    assert_eq!(diff.files["script"].language, Some(Language::Python));
}
