//! The gate catalog.

pub mod constraint_verification;
pub mod custom_rules;
pub mod impact_simulation;
pub mod pattern_compliance;
pub mod regression;
pub mod security_boundary;

use crate::enforcement::context::GateContext;
use crate::enforcement::policy::Policy;
use crate::enforcement::types::{GateId, GateResult};

/// One quality gate.
pub trait QualityGate: Send + Sync {
    fn id(&self) -> GateId;
    fn name(&self) -> &'static str;
    fn evaluate(&self, ctx: &GateContext, policy: &Policy) -> GateResult;
}

/// All six gates in canonical order.
pub fn all_gates() -> Vec<Box<dyn QualityGate>> {
    vec![
        Box::new(pattern_compliance::PatternComplianceGate),
        Box::new(constraint_verification::ConstraintVerificationGate),
        Box::new(regression::RegressionGate),
        Box::new(impact_simulation::ImpactSimulationGate),
        Box::new(security_boundary::SecurityBoundaryGate),
        Box::new(custom_rules::CustomRulesGate),
    ]
}
