//! Commit categorization into architectural signals.

use super::commit_message::CommitMessage;
use super::types::{CommitSummary, Decision, DecisionCategory};

/// Classify a commit; commits without an architectural signal yield `None`.
pub fn categorize(commit: &CommitSummary) -> Option<Decision> {
    let parsed = CommitMessage::parse(&commit.message);
    let subject = parsed
        .as_ref()
        .map(|m| m.subject.clone())
        .unwrap_or_else(|| first_line(&commit.message));
    let lower = commit.message.to_lowercase();

    let (category, evidence) = if touches(commit, &["cargo.toml", "package.json", "go.mod", "requirements.txt", "pyproject.toml", "composer.json"]) {
        (
            DecisionCategory::DependencyChange,
            "touches a dependency manifest".to_string(),
        )
    } else if touches_dir(commit, "migrations/") || lower.contains("migration") || lower.contains("schema") {
        (
            DecisionCategory::SchemaMigration,
            "touches migrations or mentions schema changes".to_string(),
        )
    } else if lower.contains("security")
        || lower.contains("vulnerability")
        || lower.contains("cve-")
        || lower.contains("injection")
    {
        (
            DecisionCategory::SecurityFix,
            "message cites a security concern".to_string(),
        )
    } else if matches!(parsed.as_ref().map(|m| m.commit_type.as_str()), Some("perf"))
        || lower.contains("performance")
        || lower.contains("n+1")
    {
        (
            DecisionCategory::Performance,
            "performance-typed commit".to_string(),
        )
    } else if parsed.as_ref().is_some_and(|m| m.breaking)
        || lower.contains("breaking change")
        || lower.contains("api change")
    {
        (
            DecisionCategory::ApiSurface,
            "breaking marker on the commit header".to_string(),
        )
    } else if matches!(parsed.as_ref().map(|m| m.commit_type.as_str()), Some("refactor")) {
        (
            DecisionCategory::Refactor,
            "refactor-typed commit".to_string(),
        )
    } else if matches!(parsed.as_ref().map(|m| m.commit_type.as_str()), Some("test"))
        || commit
            .files_changed
            .iter()
            .all(|f| f.contains("test") || f.contains("spec"))
            && !commit.files_changed.is_empty()
    {
        (
            DecisionCategory::Testing,
            "only test files changed".to_string(),
        )
    } else if touches(commit, &[".yaml", ".yml", ".toml", ".env.example", "dockerfile"]) {
        (
            DecisionCategory::Configuration,
            "configuration files changed".to_string(),
        )
    } else {
        return None;
    };

    Some(Decision {
        sha: commit.sha.clone(),
        category,
        title: subject,
        timestamp: commit.timestamp,
        author: commit.author.clone(),
        evidence,
        files: commit.files_changed.clone(),
    })
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or("").to_string()
}

fn touches(commit: &CommitSummary, suffixes: &[&str]) -> bool {
    commit.files_changed.iter().any(|f| {
        let lower = f.to_lowercase();
        suffixes.iter().any(|s| lower.ends_with(s))
    })
}

fn touches_dir(commit: &CommitSummary, dir: &str) -> bool {
    commit.files_changed.iter().any(|f| f.contains(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(message: &str, files: &[&str]) -> CommitSummary {
        CommitSummary {
            sha: "abc123".to_string(),
            message: message.to_string(),
            author: "dev".to_string(),
            timestamp: 1_700_000_000,
            files_changed: files.iter().map(|f| f.to_string()).collect(),
            insertions: 10,
            deletions: 2,
        }
    }

    #[test]
    fn dependency_manifest_wins() {
        let decision =
            categorize(&commit("chore(deps): bump serde", &["Cargo.toml"])).unwrap();
        assert_eq!(decision.category, DecisionCategory::DependencyChange);
    }

    #[test]
    fn migration_directory() {
        let decision = categorize(&commit(
            "feat: add orders table",
            &["db/migrations/0042_orders.sql"],
        ))
        .unwrap();
        assert_eq!(decision.category, DecisionCategory::SchemaMigration);
    }

    #[test]
    fn breaking_header_is_api_surface() {
        let decision = categorize(&commit(
            "feat(api)!: rename user endpoints",
            &["src/routes.ts"],
        ))
        .unwrap();
        assert_eq!(decision.category, DecisionCategory::ApiSurface);
        assert_eq!(decision.title, "rename user endpoints");
    }

    #[test]
    fn mundane_commit_is_none() {
        assert!(categorize(&commit("fix: typo in readme", &["README.md"])).is_none());
    }
}
