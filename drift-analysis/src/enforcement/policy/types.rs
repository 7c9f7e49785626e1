//! Policy types and the built-in presets.

use serde::{Deserialize, Serialize};

use crate::enforcement::types::GateId;

/// How gate verdicts combine into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    /// At least one enabled gate must pass.
    Any,
    /// Every enabled gate must pass.
    All,
    /// Only the gates listed in `required_gates` decide.
    RequiredOnly,
}

/// Where the regression baseline comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselineRef {
    BranchBase,
    LastScan,
    Snapshot(String),
}

impl Default for BaselineRef {
    fn default() -> Self {
        Self::LastScan
    }
}

/// Per-gate knobs shared by every gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    pub enabled: bool,
    /// A failing blocking gate fails the run; a failing non-blocking gate
    /// only downgrades it to `warned`.
    pub blocking: bool,
    /// Weight in the overall score.
    pub weight: f64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            blocking: true,
            weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternComplianceConfig {
    pub min_compliance_rate: f64,
    pub max_new_outliers: usize,
}

impl Default for PatternComplianceConfig {
    fn default() -> Self {
        Self {
            min_compliance_rate: 0.9,
            max_new_outliers: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintVerificationConfig {
    pub min_confidence: f64,
    pub include_discovered: bool,
}

impl Default for ConstraintVerificationConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.85,
            include_discovered: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// Maximum tolerated confidence drop, in percentage points.
    pub max_confidence_drop: f64,
    /// Maximum tolerated compliance drop, in percentage points.
    pub max_compliance_drop: f64,
    pub baseline: BaselineRef,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            max_confidence_drop: 5.0,
            max_compliance_drop: 10.0,
            baseline: BaselineRef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    pub max_impacted_files: usize,
    pub max_impacted_functions: usize,
    pub max_entry_points: usize,
    /// 0–100.
    pub max_friction: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            max_impacted_files: 100,
            max_impacted_functions: 500,
            max_entry_points: 20,
            max_friction: 60.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityBoundaryConfig {
    /// Tables that must only be touched from guarded files.
    pub protected_tables: Vec<String>,
    /// Auth pattern subcategories that count as guards.
    pub required_auth_patterns: Vec<String>,
    pub max_flow_depth: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomRulesConfig {
    /// Inline rules; file-loaded rules merge in from `.drift/rules/`.
    pub rules: Vec<crate::enforcement::rules::CustomRule>,
    pub load_rule_files: bool,
}

/// A complete policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub mode: AggregationMode,
    pub required_gates: Vec<GateId>,
    /// Branch-name globs this policy auto-selects for.
    pub branches: Vec<String>,

    pub pattern_compliance: GateSettings,
    pub pattern_compliance_config: PatternComplianceConfig,
    pub constraint_verification: GateSettings,
    pub constraint_verification_config: ConstraintVerificationConfig,
    pub regression_detection: GateSettings,
    pub regression_config: RegressionConfig,
    pub impact_simulation: GateSettings,
    pub impact_config: ImpactConfig,
    pub security_boundary: GateSettings,
    pub security_config: SecurityBoundaryConfig,
    pub custom_rules: GateSettings,
    pub custom_rules_config: CustomRulesConfig,
}

impl Default for Policy {
    fn default() -> Self {
        Self::default_policy()
    }
}

impl Policy {
    pub fn settings(&self, gate: GateId) -> &GateSettings {
        match gate {
            GateId::PatternCompliance => &self.pattern_compliance,
            GateId::ConstraintVerification => &self.constraint_verification,
            GateId::RegressionDetection => &self.regression_detection,
            GateId::ImpactSimulation => &self.impact_simulation,
            GateId::SecurityBoundary => &self.security_boundary,
            GateId::CustomRules => &self.custom_rules,
        }
    }

    pub fn enabled_gates(&self) -> Vec<GateId> {
        GateId::all()
            .iter()
            .copied()
            .filter(|g| self.settings(*g).enabled)
            .collect()
    }

    /// The default policy: every gate on, regression and impact advisory.
    pub fn default_policy() -> Self {
        Self {
            id: "default".to_string(),
            name: "Default".to_string(),
            mode: AggregationMode::RequiredOnly,
            required_gates: vec![
                GateId::PatternCompliance,
                GateId::ConstraintVerification,
                GateId::SecurityBoundary,
            ],
            branches: Vec::new(),
            pattern_compliance: GateSettings::default(),
            pattern_compliance_config: PatternComplianceConfig::default(),
            constraint_verification: GateSettings::default(),
            constraint_verification_config: ConstraintVerificationConfig::default(),
            regression_detection: GateSettings {
                blocking: false,
                ..GateSettings::default()
            },
            regression_config: RegressionConfig::default(),
            impact_simulation: GateSettings {
                blocking: false,
                weight: 0.5,
                ..GateSettings::default()
            },
            impact_config: ImpactConfig::default(),
            security_boundary: GateSettings::default(),
            security_config: SecurityBoundaryConfig::default(),
            custom_rules: GateSettings::default(),
            custom_rules_config: CustomRulesConfig::default(),
        }
    }

    /// Strict: everything blocks, all gates must pass.
    pub fn strict() -> Self {
        let mut policy = Self::default_policy();
        policy.id = "strict".to_string();
        policy.name = "Strict".to_string();
        policy.mode = AggregationMode::All;
        policy.required_gates = GateId::all().to_vec();
        policy.regression_detection.blocking = true;
        policy.impact_simulation.blocking = true;
        policy.branches = vec!["main".to_string(), "master".to_string(), "release/*".to_string()];
        policy
    }

    /// Lenient: only security blocks; everything else is advisory.
    pub fn lenient() -> Self {
        let mut policy = Self::default_policy();
        policy.id = "lenient".to_string();
        policy.name = "Lenient".to_string();
        policy.mode = AggregationMode::RequiredOnly;
        policy.required_gates = vec![GateId::SecurityBoundary];
        policy.pattern_compliance.blocking = false;
        policy.constraint_verification.blocking = false;
        policy.custom_rules.blocking = false;
        policy
    }
}
