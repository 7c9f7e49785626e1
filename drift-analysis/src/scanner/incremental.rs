//! Incremental classification: mtime fast path, content hash slow path.

use drift_core::types::collections::{FxHashMap, FxHashSet};

use super::hasher::{hash_content, is_binary, short_hash};
use super::language::Language;
use super::types::{CachedFile, DiscoveredFile, FileRecord, FileStatus, ScanDiff, ScanStats};

/// Outcome of classifying a single file.
pub enum Classified {
    Keep(FileStatus, FileRecord),
    /// Binary sniff hit; excluded from the diff.
    Binary,
}

/// Classify one file against the cached snapshot.
///
/// Level 1 compares mtimes and skips the read entirely for the common
/// unchanged case; level 2 reads and hashes. With `compute_hashes` off,
/// diffing degrades to mtime-only and records carry no content hash.
pub fn classify_file(
    file: &DiscoveredFile,
    cached: Option<&CachedFile>,
    force_full: bool,
    compute_hashes: bool,
) -> std::io::Result<Classified> {
    if let Some(cached) = cached {
        if !force_full && cached.mtime_secs == file.mtime_secs {
            return Ok(Classified::Keep(
                FileStatus::Unchanged,
                FileRecord {
                    path: file.path.clone(),
                    relative_path: file.relative_path.clone(),
                    language: Language::from_extension(extension(file)),
                    size: file.size,
                    content_hash: cached.content_hash.clone(),
                    short_hash: short_hash(&cached.content_hash),
                    mtime_secs: file.mtime_secs,
                },
            ));
        }
    }

    let content = std::fs::read(&file.path)?;
    if is_binary(&content) {
        return Ok(Classified::Binary);
    }

    let language = Language::classify(extension(file), &content);
    let content_hash = if compute_hashes {
        hash_content(&content)
    } else {
        String::new()
    };

    let status = match cached {
        Some(cached) if compute_hashes && hashes_match(&cached.content_hash, &content_hash) => {
            FileStatus::Unchanged
        }
        Some(_) => FileStatus::Modified,
        None => FileStatus::Added,
    };

    Ok(Classified::Keep(
        status,
        FileRecord {
            path: file.path.clone(),
            relative_path: file.relative_path.clone(),
            language,
            size: file.size,
            short_hash: short_hash(&content_hash),
            content_hash,
            mtime_secs: file.mtime_secs,
        },
    ))
}

fn extension(file: &DiscoveredFile) -> Option<&str> {
    file.path.extension().and_then(|e| e.to_str())
}

/// Cached hashes may be the full digest or the 12-char short form (the
/// manifest stores short ids); match on whichever was kept.
fn hashes_match(cached: &str, full: &str) -> bool {
    cached == full || (cached.len() == 12 && full.starts_with(cached))
}

/// Fold classified entries into the final diff. Files present in the cache
/// but absent from this scan are `removed`.
pub fn compute_diff(
    entries: Vec<(FileStatus, FileRecord)>,
    cached: &FxHashMap<String, CachedFile>,
    stats: ScanStats,
) -> ScanDiff {
    let mut diff = ScanDiff {
        stats,
        ..Default::default()
    };
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for (status, record) in entries {
        seen.insert(record.relative_path.clone());
        match status {
            FileStatus::Added => diff.added.push(record.relative_path.clone()),
            FileStatus::Modified => diff.modified.push(record.relative_path.clone()),
            FileStatus::Unchanged => diff.unchanged.push(record.relative_path.clone()),
        }
        diff.files.insert(record.relative_path.clone(), record);
    }

    for path in cached.keys() {
        if !seen.contains(path) {
            diff.removed.push(path.clone());
        }
    }

    diff.added.sort();
    diff.modified.sort();
    diff.removed.sort();
    diff.unchanged.sort();

    diff.stats.total_files = diff.files.len();
    diff.stats.total_size_bytes = diff.files.values().map(|f| f.size).sum();

    diff
}
