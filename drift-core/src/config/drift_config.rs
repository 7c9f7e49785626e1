//! Top-level configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{GateConfig, ScanConfig};
use crate::errors::ConfigError;

/// Aggregate configuration.
///
/// Resolution order, highest priority first:
/// 1. Environment variables (`DRIFT_*`)
/// 2. Project config (`drift.toml` in the project root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub scan: ScanConfig,
    pub gates: GateConfig,
}

impl DriftConfig {
    /// Load configuration for a project root.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_path = root.join("drift.toml");
        if project_path.exists() {
            let raw = std::fs::read_to_string(&project_path).map_err(|e| {
                ConfigError::Parse {
                    path: project_path.display().to_string(),
                    message: e.to_string(),
                }
            })?;
            config = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
                path: project_path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        Self::apply_env(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn apply_env(config: &mut Self) {
        if let Ok(v) = std::env::var("DRIFT_MAX_FILE_SIZE") {
            if let Ok(n) = v.parse() {
                config.scan.max_file_size = n;
            }
        }
        if let Ok(v) = std::env::var("DRIFT_THREADS") {
            if let Ok(n) = v.parse() {
                config.scan.threads = n;
            }
        }
        if let Ok(v) = std::env::var("DRIFT_POLICY") {
            config.gates.default_policy = v;
        }
    }

    fn validate(config: &Self) -> Result<(), ConfigError> {
        if config.scan.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_file_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if config.gates.gate_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gates.gate_timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DriftConfig::default();
        assert!(DriftConfig::validate(&config).is_ok());
        assert_eq!(config.scan.max_file_size, 1_048_576);
        assert_eq!(config.gates.default_policy, "default");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = DriftConfig::from_toml(
            r#"
            [scan]
            max_file_size = 2048
            follow_symlinks = true

            [gates]
            default_policy = "strict"
            "#,
        )
        .unwrap();
        assert_eq!(config.scan.max_file_size, 2048);
        assert!(config.scan.follow_symlinks);
        assert_eq!(config.gates.default_policy, "strict");
    }

    #[test]
    fn zero_file_size_rejected() {
        let err = DriftConfig::from_toml("[scan]\nmax_file_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
