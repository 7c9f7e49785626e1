//! Top-level scanner: walk → hash/classify → diff.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use drift_core::config::ScanConfig;
use drift_core::errors::ScanError;
use drift_core::events::{ScanCompleted, ScanEventHandler, ScanProgress, ScanStarted};
use drift_core::types::collections::FxHashMap;
use drift_core::CancellationToken;
use rayon::prelude::*;

use super::incremental::{classify_file, compute_diff, Classified};
use super::types::{CachedFile, ScanDiff, ScanStats};
use super::walker;

/// Orchestrates one scan of a project root.
pub struct Scanner {
    config: ScanConfig,
    cancellation: CancellationToken,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Handle external callers can use to cancel an in-flight scan.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Scan `root`, diffing against `cached` (empty map = fresh scan).
    pub fn scan(
        &self,
        root: &Path,
        cached: &FxHashMap<String, CachedFile>,
        events: &dyn ScanEventHandler,
    ) -> Result<ScanDiff, ScanError> {
        self.cancellation.reset();
        events.on_started(&ScanStarted {
            root: root.to_path_buf(),
        });

        // Phase 1: discovery.
        let discovery_start = Instant::now();
        let outcome = match walker::walk(root, &self.config, self.cancellation.as_atomic()) {
            Ok(o) => o,
            Err(e) => {
                events.on_error(&e.to_string());
                return Err(e);
            }
        };
        let discovery_ms = discovery_start.elapsed().as_millis() as u64;

        if self.cancellation.is_cancelled() {
            let mut diff = compute_diff(
                Vec::new(),
                cached,
                ScanStats {
                    discovery_ms,
                    ..Default::default()
                },
            );
            diff.incomplete = true;
            return Ok(diff);
        }

        let total = outcome.files.len();
        events.on_progress(&ScanProgress {
            processed: 0,
            total,
        });

        // Phase 2: hash + classify in parallel.
        let hashing_start = Instant::now();
        let processed = AtomicUsize::new(0);
        let skipped_binary = AtomicUsize::new(0);
        let force_full = self.config.force_full_scan;
        let compute_hashes = self.config.compute_hashes;
        let mut errors = outcome.errors;

        let results: Vec<_> = outcome
            .files
            .par_iter()
            .filter_map(|file| {
                if self.cancellation.is_cancelled() {
                    return None;
                }
                let count = processed.fetch_add(1, Ordering::Relaxed);
                if count % 256 == 0 {
                    events.on_progress(&ScanProgress {
                        processed: count,
                        total,
                    });
                }

                let cached_entry = cached.get(&file.relative_path);
                match classify_file(file, cached_entry, force_full, compute_hashes) {
                    Ok(Classified::Keep(status, record)) => Some(Ok((status, record))),
                    Ok(Classified::Binary) => {
                        skipped_binary.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %file.path.display(),
                            error = %e,
                            "file skipped: read failed"
                        );
                        Some(Err(format!("{}: {e}", file.relative_path)))
                    }
                }
            })
            .collect();

        let hashing_ms = hashing_start.elapsed().as_millis() as u64;

        let mut entries = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(entry) => entries.push(entry),
                Err(message) => errors.push(message),
            }
        }

        // Phase 3: diff.
        let diff_start = Instant::now();
        let mut languages_found = FxHashMap::default();
        for (_, record) in &entries {
            if let Some(lang) = record.language {
                *languages_found.entry(lang).or_insert(0usize) += 1;
            }
        }

        let mtime_hits = entries
            .iter()
            .filter(|(status, _)| *status == super::types::FileStatus::Unchanged)
            .count();
        let cache_hit_rate = if total > 0 {
            mtime_hits as f64 / total as f64
        } else {
            0.0
        };

        let stats = ScanStats {
            total_files: 0,
            total_size_bytes: 0,
            discovery_ms,
            hashing_ms,
            diff_ms: 0,
            cache_hit_rate,
            files_skipped_large: outcome.skipped_large,
            files_skipped_ignored: outcome.skipped_ignored,
            files_skipped_binary: skipped_binary.load(Ordering::Relaxed),
            languages_found,
        };

        let incomplete = self.cancellation.is_cancelled();
        let mut diff = compute_diff(entries, cached, stats);
        diff.stats.diff_ms = diff_start.elapsed().as_millis() as u64;
        diff.errors = errors;
        diff.incomplete = incomplete;

        events.on_completed(&ScanCompleted {
            added: diff.added.len(),
            modified: diff.modified.len(),
            removed: diff.removed.len(),
            unchanged: diff.unchanged.len(),
            duration_ms: discovery_ms + hashing_ms + diff.stats.diff_ms,
        });

        Ok(diff)
    }
}
