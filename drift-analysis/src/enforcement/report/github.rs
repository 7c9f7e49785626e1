//! GitHub Actions report: one workflow-command annotation per violation,
//! plus a summary notice and output totals.

use drift_core::types::pattern::Severity;

use crate::enforcement::types::QualityGateResult;

use super::Reporter;

pub struct GitHubReporter;

fn command_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info | Severity::Hint => "notice",
    }
}

/// Workflow-command property values escape `%`, CR and LF; messages also
/// escape `::`-breaking characters.
fn escape_property(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
        .replace(':', "%3A")
        .replace(',', "%2C")
}

fn escape_message(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl Reporter for GitHubReporter {
    fn name(&self) -> &'static str {
        "github"
    }

    fn generate(&self, result: &QualityGateResult) -> Result<String, String> {
        let mut out = String::new();

        for violation in &result.violations {
            out.push_str(&format!(
                "::{} file={},line={},col={},title={}::{}\n",
                command_for(violation.severity),
                escape_property(&violation.file),
                violation.start_line,
                1,
                escape_property(&violation.pattern_id),
                escape_message(&violation.message),
            ));
        }

        let (errors, warnings, infos) = result.totals();
        out.push_str(&format!(
            "::notice title=Drift Quality Gates::{} — {} errors, {} warnings, {} info (score {:.1})\n",
            escape_message(&result.summary),
            errors,
            warnings,
            infos,
            result.score,
        ));

        // Step outputs for downstream workflow steps.
        out.push_str(&format!("drift_errors={errors}\n"));
        out.push_str(&format!("drift_warnings={warnings}\n"));
        out.push_str(&format!("drift_infos={infos}\n"));
        out.push_str(&format!("drift_passed={}\n", result.passed));

        Ok(out)
    }
}
