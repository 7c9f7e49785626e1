//! Commit-history mining over git2.

use std::path::Path;

use super::categorizer::categorize;
use super::types::{CommitSummary, Decision};

/// Walks history from HEAD and extracts decisions.
pub struct HistoryMiner {
    max_commits: usize,
}

impl HistoryMiner {
    pub fn new() -> Self {
        Self { max_commits: 1000 }
    }

    pub fn with_max_commits(mut self, max: usize) -> Self {
        self.max_commits = max;
        self
    }

    /// Mine decisions from the repository at `repo_path`.
    pub fn mine(&self, repo_path: &Path) -> Result<Vec<Decision>, String> {
        let commits = self.walk(repo_path)?;
        Ok(commits.iter().filter_map(categorize).collect())
    }

    /// Collect commit summaries from HEAD, newest first.
    pub fn walk(&self, repo_path: &Path) -> Result<Vec<CommitSummary>, String> {
        let repo = git2::Repository::open(repo_path)
            .map_err(|e| format!("failed to open repository: {e}"))?;

        let mut revwalk = repo
            .revwalk()
            .map_err(|e| format!("failed to create revwalk: {e}"))?;
        revwalk
            .push_head()
            .map_err(|e| format!("failed to push HEAD: {e}"))?;
        revwalk
            .set_sorting(git2::Sort::TIME)
            .map_err(|e| format!("failed to set sorting: {e}"))?;

        let mut summaries = Vec::new();
        for (i, oid) in revwalk.enumerate() {
            if i >= self.max_commits {
                break;
            }
            let Ok(oid) = oid else {
                continue;
            };
            let Ok(commit) = repo.find_commit(oid) else {
                continue;
            };

            let (files_changed, insertions, deletions) = diff_stats(&repo, &commit);
            summaries.push(CommitSummary {
                sha: oid.to_string(),
                message: commit.message().unwrap_or("").to_string(),
                author: commit.author().name().unwrap_or("unknown").to_string(),
                timestamp: commit.time().seconds(),
                files_changed,
                insertions,
                deletions,
            });
        }
        Ok(summaries)
    }
}

impl Default for HistoryMiner {
    fn default() -> Self {
        Self::new()
    }
}

fn diff_stats(repo: &git2::Repository, commit: &git2::Commit) -> (Vec<String>, u32, u32) {
    let Ok(tree) = commit.tree() else {
        return (Vec::new(), 0, 0);
    };
    let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());

    let Ok(diff) = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None) else {
        return (Vec::new(), 0, 0);
    };

    let mut files = Vec::new();
    let _ = diff.foreach(
        &mut |delta, _| {
            if let Some(path) = delta.new_file().path() {
                files.push(path.to_string_lossy().to_string());
            }
            true
        },
        None,
        None,
        None,
    );

    let (insertions, deletions) = diff
        .stats()
        .map(|s| (s.insertions() as u32, s.deletions() as u32))
        .unwrap_or((0, 0));

    (files, insertions, deletions)
}
