//! Gate orchestration: parallel execution, timeout accounting, policy
//! aggregation into a single verdict.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::context::GateContext;
use super::gates::{all_gates, QualityGate};
use super::policy::{AggregationMode, Policy};
use super::types::{
    GateId, GateResult, GateStatus, PolicyRef, QualityGateResult, RunMetadata, RunStatus,
};

/// Inputs for one run, minus the shared context.
#[derive(Debug, Clone, Default)]
pub struct GateRequest {
    pub files: Vec<String>,
    /// Policy id; `None` selects by branch, falling back to the default.
    pub policy: Option<String>,
    pub branch: Option<String>,
    pub base_branch: Option<String>,
    pub commit_sha: Option<String>,
    pub ci: bool,
    pub fail_on_warning: bool,
}

pub struct Orchestrator {
    gates: Vec<Box<dyn QualityGate>>,
    gate_timeout: Duration,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            gates: all_gates(),
            gate_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.gate_timeout = timeout;
        self
    }

    /// Run all enabled gates and aggregate per the policy.
    pub fn run(
        &self,
        ctx: &GateContext,
        policy: &Policy,
        request: &GateRequest,
    ) -> QualityGateResult {
        let run_start = Instant::now();

        // Empty change set short-circuits to a pass.
        if request.files.is_empty() && ctx.changed_files.is_empty() {
            return self.empty_pass(policy, request, run_start);
        }

        let enabled: Vec<&Box<dyn QualityGate>> = self
            .gates
            .iter()
            .filter(|g| policy.settings(g.id()).enabled)
            .collect();

        let mut results: Vec<GateResult> = enabled
            .par_iter()
            .map(|gate| {
                let start = Instant::now();
                let outcome = catch_unwind(AssertUnwindSafe(|| gate.evaluate(ctx, policy)));
                let elapsed = start.elapsed();

                let mut result = match outcome {
                    Ok(result) => result,
                    Err(_) => GateResult::errored(
                        gate.id(),
                        "gate panicked during evaluation".to_string(),
                    ),
                };
                if elapsed > self.gate_timeout {
                    result = GateResult::errored(
                        gate.id(),
                        format!(
                            "gate exceeded its {:.0}s budget ({:.1}s)",
                            self.gate_timeout.as_secs_f64(),
                            elapsed.as_secs_f64()
                        ),
                    );
                }
                result.execution_time_ms = elapsed.as_millis() as u64;
                result
            })
            .collect();
        results.sort_by_key(|r| r.gate_id);

        self.aggregate(results, policy, request, ctx, run_start)
    }

    fn empty_pass(
        &self,
        policy: &Policy,
        request: &GateRequest,
        run_start: Instant,
    ) -> QualityGateResult {
        QualityGateResult {
            passed: true,
            status: RunStatus::Passed,
            score: 100.0,
            summary: "no files to check".to_string(),
            gates: BTreeMap::new(),
            violations: Vec::new(),
            warnings: Vec::new(),
            policy: PolicyRef {
                id: policy.id.clone(),
                name: policy.name.clone(),
            },
            metadata: self.metadata(request, 0, 0, run_start),
            exit_code: 0,
        }
    }

    fn aggregate(
        &self,
        results: Vec<GateResult>,
        policy: &Policy,
        request: &GateRequest,
        ctx: &GateContext,
        run_start: Instant,
    ) -> QualityGateResult {
        // A gate that errored counts as failed unless it is non-blocking.
        let effective_failed = |r: &GateResult| {
            matches!(r.status, GateStatus::Failed | GateStatus::Errored)
        };

        let blocking_ok = results
            .iter()
            .filter(|r| policy.settings(r.gate_id).blocking)
            .all(|r| !effective_failed(r));

        let required_ok = policy.required_gates.iter().all(|required| {
            results
                .iter()
                .find(|r| r.gate_id == *required)
                // A required gate that did not run (disabled) counts as met.
                .map(|r| !effective_failed(r))
                .unwrap_or(true)
        });

        let ran: Vec<&GateResult> = results
            .iter()
            .filter(|r| r.status != GateStatus::Skipped)
            .collect();

        let mode_ok = match policy.mode {
            AggregationMode::Any => ran.is_empty() || ran.iter().any(|r| !effective_failed(r)),
            AggregationMode::All => ran.iter().all(|r| !effective_failed(r)),
            AggregationMode::RequiredOnly => true,
        };

        let passed = blocking_ok && required_ok && mode_ok;

        // Weighted mean of scores over the gates that actually ran.
        let (weight_sum, weighted) = ran.iter().fold((0.0f64, 0.0f64), |(ws, sum), r| {
            let weight = policy.settings(r.gate_id).weight;
            (ws + weight, sum + r.score * weight)
        });
        let score = if weight_sum > 0.0 {
            (weighted / weight_sum).clamp(0.0, 100.0)
        } else {
            100.0
        };

        let has_soft_failures = results.iter().any(|r| {
            r.status == GateStatus::Warned
                || (effective_failed(r) && !policy.settings(r.gate_id).blocking)
        });
        let status = if !passed {
            RunStatus::Failed
        } else if has_soft_failures {
            RunStatus::Warned
        } else {
            RunStatus::Passed
        };

        let mut violations: Vec<_> = results
            .iter()
            .flat_map(|r| r.violations.iter().cloned())
            .collect();
        violations.sort_by(|a, b| {
            (a.severity, &a.file, a.start_line).cmp(&(b.severity, &b.file, b.start_line))
        });

        let warnings: Vec<String> = results
            .iter()
            .flat_map(|r| r.warnings.iter().cloned())
            .collect();

        let gates_run = ran.len();
        let gates_skipped = results.len() - gates_run;
        let (errors, warns, _) = {
            let mut t = (0usize, 0usize, 0usize);
            for v in &violations {
                match v.severity {
                    drift_core::types::pattern::Severity::Error => t.0 += 1,
                    drift_core::types::pattern::Severity::Warning => t.1 += 1,
                    _ => t.2 += 1,
                }
            }
            t
        };

        let summary = match status {
            RunStatus::Passed => format!("passed: {gates_run} gate(s), score {score:.1}"),
            RunStatus::Warned => format!(
                "passed with warnings: {warns} warning(s) across {gates_run} gate(s)"
            ),
            RunStatus::Failed => format!(
                "failed: {errors} error(s), {warns} warning(s) across {gates_run} gate(s)"
            ),
        };

        let exit_code = if !passed || (request.fail_on_warning && status == RunStatus::Warned) {
            1
        } else {
            0
        };

        let files_checked = if request.files.is_empty() {
            ctx.changed_files.len()
        } else {
            request.files.len()
        };

        let mut metadata = self.metadata(request, files_checked, gates_run, run_start);
        metadata.gates_skipped = gates_skipped;

        QualityGateResult {
            passed,
            status,
            score,
            summary,
            gates: results
                .into_iter()
                .map(|r| (r.gate_id.as_str().to_string(), r))
                .collect(),
            violations,
            warnings,
            policy: PolicyRef {
                id: policy.id.clone(),
                name: policy.name.clone(),
            },
            metadata,
            exit_code,
        }
    }

    fn metadata(
        &self,
        request: &GateRequest,
        files_checked: usize,
        gates_run: usize,
        run_start: Instant,
    ) -> RunMetadata {
        let environment = detect_environment();
        RunMetadata {
            execution_time_ms: run_start.elapsed().as_millis() as u64,
            files_checked,
            gates_run,
            gates_skipped: 0,
            timestamp: drift_storage::now_secs(),
            branch: request.branch.clone().or(environment.branch),
            commit_sha: request.commit_sha.clone().or(environment.commit_sha),
            ci: request.ci || environment.ci,
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Hints read from well-known CI variables. Informational, never required.
struct Environment {
    ci: bool,
    branch: Option<String>,
    commit_sha: Option<String>,
}

fn detect_environment() -> Environment {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    Environment {
        ci: var("CI").is_some(),
        branch: var("GITHUB_HEAD_REF").or_else(|| var("CI_COMMIT_BRANCH")),
        commit_sha: var("GITHUB_SHA").or_else(|| var("CI_COMMIT_SHA")),
    }
}
