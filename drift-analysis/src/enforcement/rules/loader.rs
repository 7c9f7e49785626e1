//! Rule file loading.

use std::path::Path;

use drift_core::errors::ConfigError;

use super::types::{CustomRule, RuleFile};

/// Load every rule file under `.drift/rules/`.
///
/// A malformed file is a configuration error: custom rules are explicit
/// user intent, so silently dropping them would be worse than failing.
pub fn load_rule_files(rules_dir: &Path) -> Result<Vec<CustomRule>, ConfigError> {
    if !rules_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<_> = std::fs::read_dir(rules_dir)
        .map_err(|_| ConfigError::FileNotFound {
            path: rules_dir.display().to_string(),
        })?
        .flatten()
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    entries.sort_by_key(|e| e.path());

    let mut rules = Vec::new();
    for entry in entries {
        let path = entry.path();
        let raw = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let file: RuleFile =
            serde_yaml::from_str(&raw).map_err(|e| ConfigError::MalformedRule {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        rules.extend(file.rules);
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_rejects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("team.yaml"),
            "name: team\nrules:\n  - id: no-todo\n    description: no TODO markers\n    severity: info\n    pattern: 'TODO'\n    message: remove the TODO\n",
        )
        .unwrap();
        let rules = load_rule_files(dir.path()).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "no-todo");

        std::fs::write(dir.path().join("broken.yaml"), "rules: [this is not").unwrap();
        assert!(load_rule_files(dir.path()).is_err());
    }

    #[test]
    fn missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rules = load_rule_files(&dir.path().join("nope")).unwrap();
        assert!(rules.is_empty());
    }
}
