//! Parallel file discovery built on the `ignore` crate's `WalkParallel`.
//!
//! Filter order per directory: built-in ignore list, layered
//! `.gitignore`/`.driftignore` (when enabled), caller include globs
//! (empty = include all), caller ignore patterns.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel as channel;
use drift_core::config::ScanConfig;
use drift_core::errors::ScanError;

use super::types::DiscoveredFile;

/// Directories never scanned, regardless of ignore files.
pub const DEFAULT_IGNORES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "out",
    "coverage",
    ".nyc_output",
    "target",
    ".drift",
    "__pycache__",
    ".pytest_cache",
    ".next",
    ".nuxt",
    "vendor",
    ".venv",
    "venv",
];

/// Result of the discovery phase.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<DiscoveredFile>,
    pub skipped_large: usize,
    pub skipped_ignored: usize,
    pub errors: Vec<String>,
}

/// Walk the tree under `root`, collecting candidate files.
///
/// Output is sorted by relative path for deterministic downstream state.
pub fn walk(
    root: &Path,
    config: &ScanConfig,
    cancelled: &AtomicBool,
) -> Result<WalkOutcome, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(config.respect_gitignore)
        .git_global(false)
        .git_exclude(config.respect_gitignore)
        .require_git(false)
        .follow_links(config.follow_symlinks)
        .max_depth(config.max_depth)
        .threads(config.effective_threads());

    if config.respect_driftignore {
        builder.add_custom_ignore_filename(".driftignore");
    }

    // Built-in directory ignores prune whole subtrees.
    builder.filter_entry(|entry| {
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        if !is_dir {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !DEFAULT_IGNORES.contains(&name.as_ref())
    });

    // Caller globs are evaluated manually so rejections can be counted.
    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in &config.include {
        let _ = overrides.add(pattern);
    }
    for pattern in &config.ignore_patterns {
        let _ = overrides.add(&format!("!{pattern}"));
    }
    let overrides = Arc::new(overrides.build().map_err(|e| ScanError::Io {
        path: root.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
    })?);
    let has_includes = overrides.num_whitelists() > 0;

    let (tx, rx) = channel::unbounded();
    let (err_tx, err_rx) = channel::unbounded::<String>();
    let skipped_large = Arc::new(AtomicUsize::new(0));
    let skipped_ignored = Arc::new(AtomicUsize::new(0));
    let max_file_size = config.max_file_size;
    let root_buf = root.to_path_buf();
    let cancel_flag = Arc::new(AtomicBool::new(cancelled.load(Ordering::Relaxed)));

    let walker = builder.build_parallel();
    walker.run(|| {
        let tx = tx.clone();
        let err_tx = err_tx.clone();
        let overrides = Arc::clone(&overrides);
        let skipped_large = Arc::clone(&skipped_large);
        let skipped_ignored = Arc::clone(&skipped_ignored);
        let root = root_buf.clone();
        let cancelled = Arc::clone(&cancel_flag);

        Box::new(move |entry| {
            if cancelled.load(Ordering::Relaxed) {
                return ignore::WalkState::Quit;
            }

            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let _ = err_tx.send(e.to_string());
                    return ignore::WalkState::Continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }

            let path = entry.path();
            let matched = overrides.matched(path, false);
            if matched.is_ignore() || (has_includes && matched.is_none()) {
                skipped_ignored.fetch_add(1, Ordering::Relaxed);
                return ignore::WalkState::Continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    let _ = err_tx.send(format!("{}: {e}", path.display()));
                    return ignore::WalkState::Continue;
                }
            };

            if metadata.len() > max_file_size {
                skipped_large.fetch_add(1, Ordering::Relaxed);
                return ignore::WalkState::Continue;
            }

            let relative_path = path
                .strip_prefix(&root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");

            let mtime_secs = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            let _ = tx.send(DiscoveredFile {
                path: path.to_path_buf(),
                relative_path,
                size: metadata.len(),
                mtime_secs,
            });

            ignore::WalkState::Continue
        })
    });

    drop(tx);
    drop(err_tx);

    let mut files: Vec<DiscoveredFile> = rx.into_iter().collect();
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Ok(WalkOutcome {
        files,
        skipped_large: skipped_large.load(Ordering::Relaxed),
        skipped_ignored: skipped_ignored.load(Ordering::Relaxed),
        errors: err_rx.into_iter().collect(),
    })
}
