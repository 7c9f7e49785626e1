//! Scanner configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the file walker and hasher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum file size in bytes; larger files are skipped and counted.
    pub max_file_size: u64,
    /// Maximum directory depth below the root. `None` = unbounded.
    pub max_depth: Option<usize>,
    /// Follow symbolic links. Cycles are detected and skipped.
    pub follow_symlinks: bool,
    /// Honor `.gitignore` files (hierarchical gitignore semantics).
    pub respect_gitignore: bool,
    /// Honor `.driftignore` files (same syntax as gitignore).
    pub respect_driftignore: bool,
    /// Include globs; when non-empty only matching paths are scanned.
    pub include: Vec<String>,
    /// Caller-supplied ignore patterns, applied after the built-in list.
    pub ignore_patterns: Vec<String>,
    /// Compute content hashes. Disabling degrades diffing to mtime-only.
    pub compute_hashes: bool,
    /// Worker threads for hashing. 0 = one per core.
    pub threads: usize,
    /// Force a full rescan, skipping the mtime fast path.
    pub force_full_scan: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1_048_576,
            max_depth: None,
            follow_symlinks: false,
            respect_gitignore: true,
            respect_driftignore: true,
            include: Vec::new(),
            ignore_patterns: Vec::new(),
            compute_hashes: true,
            threads: 0,
            force_full_scan: false,
        }
    }
}

impl ScanConfig {
    /// Effective worker count: configured value, or every available core.
    pub fn effective_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}
