//! Scanner data types.

use std::path::PathBuf;

use drift_core::types::collections::FxHashMap;
use serde::{Deserialize, Serialize};

use super::language::Language;

/// Metadata for one discovered file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Path relative to the scan root, with forward slashes.
    pub relative_path: String,
    pub language: Option<Language>,
    pub size: u64,
    /// Full SHA-256 hex digest of the content. Empty when hashing is off.
    pub content_hash: String,
    /// First 12 hex chars of `content_hash`.
    pub short_hash: String,
    pub mtime_secs: i64,
}

/// Intermediate record emitted by the walker before hashing.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub size: u64,
    pub mtime_secs: i64,
}

/// Classification of one file against the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Unchanged,
}

/// The primary scan output: every file classified relative to the last scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanDiff {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: Vec<String>,
    /// Per-file errors; never fatal to the scan.
    pub errors: Vec<String>,
    pub stats: ScanStats,
    /// relative path → file record.
    pub files: FxHashMap<String, FileRecord>,
    /// True when cancellation interrupted the scan.
    #[serde(default)]
    pub incomplete: bool,
}

/// Aggregate statistics for one scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub discovery_ms: u64,
    pub hashing_ms: u64,
    pub diff_ms: u64,
    pub cache_hit_rate: f64,
    pub files_skipped_large: usize,
    pub files_skipped_ignored: usize,
    pub files_skipped_binary: usize,
    pub languages_found: FxHashMap<Language, usize>,
}

/// Cached per-file state from the previous snapshot.
#[derive(Debug, Clone)]
pub struct CachedFile {
    pub relative_path: String,
    pub content_hash: String,
    pub mtime_secs: i64,
}
