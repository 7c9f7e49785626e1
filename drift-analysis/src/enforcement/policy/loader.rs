//! Policy resolution: file policies, built-in ids, branch auto-selection.

use std::path::Path;

use drift_core::errors::ConfigError;

use super::types::Policy;

/// Load a policy YAML file.
pub fn load_policy(path: &Path) -> Result<Policy, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;
    serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Resolve a policy for a run.
///
/// Order: explicit id (user policy dir first, then built-ins), then branch
/// auto-selection over user policies and built-ins, then the default.
pub fn resolve_policy(
    policy_id: Option<&str>,
    branch: Option<&str>,
    policies_dir: Option<&Path>,
) -> Result<Policy, ConfigError> {
    let user_policies = load_user_policies(policies_dir);

    if let Some(id) = policy_id {
        if let Some(found) = user_policies.iter().find(|p| p.id == id) {
            return Ok(found.clone());
        }
        return builtin(id).ok_or_else(|| ConfigError::UnknownPolicy { id: id.to_string() });
    }

    if let Some(branch) = branch {
        for policy in user_policies
            .iter()
            .chain([Policy::strict(), Policy::lenient()].iter())
        {
            if policy.branches.iter().any(|glob| branch_matches(glob, branch)) {
                return Ok(policy.clone());
            }
        }
    }

    Ok(Policy::default_policy())
}

fn builtin(id: &str) -> Option<Policy> {
    match id {
        "default" => Some(Policy::default_policy()),
        "strict" => Some(Policy::strict()),
        "lenient" => Some(Policy::lenient()),
        _ => None,
    }
}

fn load_user_policies(policies_dir: Option<&Path>) -> Vec<Policy> {
    let Some(dir) = policies_dir else {
        return Vec::new();
    };
    let mut policies: Vec<Policy> = std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .flatten()
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .filter_map(|entry| match load_policy(&entry.path()) {
            Ok(policy) => Some(policy),
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "skipping malformed policy file");
                None
            }
        })
        .collect();
    policies.sort_by(|a, b| a.id.cmp(&b.id));
    policies
}

/// Trailing-`*` glob match, enough for `release/*` style branch rules.
fn branch_matches(glob: &str, branch: &str) -> bool {
    match glob.strip_suffix('*') {
        Some(prefix) => branch.starts_with(prefix),
        None => glob == branch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_resolve() {
        assert_eq!(resolve_policy(Some("strict"), None, None).unwrap().id, "strict");
        assert_eq!(resolve_policy(Some("lenient"), None, None).unwrap().id, "lenient");
        assert!(resolve_policy(Some("nope"), None, None).is_err());
    }

    #[test]
    fn branch_auto_selection() {
        let policy = resolve_policy(None, Some("main"), None).unwrap();
        assert_eq!(policy.id, "strict");
        let policy = resolve_policy(None, Some("release/2.4"), None).unwrap();
        assert_eq!(policy.id, "strict");
        let policy = resolve_policy(None, Some("feature/widgets"), None).unwrap();
        assert_eq!(policy.id, "default");
    }

    #[test]
    fn yaml_policy_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.yaml");
        let mut policy = Policy::default_policy();
        policy.id = "team".to_string();
        policy.name = "Team".to_string();
        std::fs::write(&path, serde_yaml::to_string(&policy).unwrap()).unwrap();

        let loaded = load_policy(&path).unwrap();
        assert_eq!(loaded.id, "team");

        let resolved = resolve_policy(Some("team"), None, Some(dir.path())).unwrap();
        assert_eq!(resolved.name, "Team");
    }
}
