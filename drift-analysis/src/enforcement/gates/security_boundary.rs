//! Gate: security boundaries.
//!
//! Fails when the change set touches protected tables from files carrying
//! no auth guard, or introduces sensitive-table access where none existed.

use drift_core::types::collections::FxHashSet;
use drift_core::types::pattern::{PatternCategory, Severity};

use crate::detectors::traits::Violation;
use crate::enforcement::context::GateContext;
use crate::enforcement::policy::Policy;
use crate::enforcement::types::{GateDetails, GateId, GateResult};

/// Tables treated as sensitive even without explicit configuration.
const DEFAULT_SENSITIVE_TABLES: &[&str] = &["users", "accounts", "credentials", "payments", "sessions"];

pub struct SecurityBoundaryGate;

impl super::QualityGate for SecurityBoundaryGate {
    fn id(&self) -> GateId {
        GateId::SecurityBoundary
    }

    fn name(&self) -> &'static str {
        "Security Boundaries"
    }

    fn evaluate(&self, ctx: &GateContext, policy: &Policy) -> GateResult {
        let config = &policy.security_config;

        // Files carrying an auth guard: any auth-category pattern location.
        let guarded_files: FxHashSet<&str> = ctx
            .patterns
            .iter()
            .filter(|p| p.category == PatternCategory::Auth)
            .filter(|p| {
                config.required_auth_patterns.is_empty()
                    || config
                        .required_auth_patterns
                        .iter()
                        .any(|sub| p.subcategory == *sub)
            })
            .flat_map(|p| p.locations.iter())
            .map(|l| l.file.as_str())
            .collect();

        let protected: Vec<String> = if config.protected_tables.is_empty() {
            DEFAULT_SENSITIVE_TABLES.iter().map(|s| s.to_string()).collect()
        } else {
            config.protected_tables.clone()
        };

        let mut violations = Vec::new();
        let mut touched = FxHashSet::default();

        for access in &ctx.data_access {
            if !ctx.is_changed(&access.file) {
                continue;
            }
            let Some(table) = &access.table else {
                continue;
            };
            let table_lower = table.to_lowercase();
            if !protected.iter().any(|p| p.to_lowercase() == table_lower) {
                continue;
            }
            touched.insert(table_lower.clone());

            if guarded_files.contains(access.file.as_str()) {
                continue;
            }
            violations.push(Violation {
                id: format!("security-boundary:{}:{}", access.file, access.line),
                pattern_id: "security/boundary/protected-table".to_string(),
                severity: Severity::Error,
                file: access.file.clone(),
                start_line: access.line,
                end_line: access.line,
                message: format!(
                    "access to protected table `{table}` from a file without an auth guard"
                ),
                expected: "an auth pattern (middleware/guard) in the accessing file".to_string(),
                actual: format!("{} access with no recognized guard", access.operation.name()),
                explanation:
                    "Sensitive tables must only be reached through code paths that enforce authorization."
                        .to_string(),
                suggested_fix: None,
                first_seen: 0,
                occurrences: 1,
            });
        }

        let details = GateDetails::SecurityBoundary {
            protected_tables_touched: touched.len(),
            guarded_files: guarded_files.len(),
        };

        if violations.is_empty() {
            GateResult::pass(
                GateId::SecurityBoundary,
                100.0,
                format!(
                    "{} protected table(s) touched, all guarded",
                    touched.len()
                ),
            )
            .with_details(details)
        } else {
            let score = (100.0 - violations.len() as f64 * 25.0).max(0.0);
            GateResult::fail(
                GateId::SecurityBoundary,
                score,
                format!("{} unguarded protected-table access(es)", violations.len()),
                violations,
            )
            .with_details(details)
        }
    }
}
