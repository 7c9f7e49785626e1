//! JSON report: the `QualityGateResult` verbatim.

use crate::enforcement::types::QualityGateResult;

use super::Reporter;

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, result: &QualityGateResult) -> Result<String, String> {
        serde_json::to_string_pretty(result).map_err(|e| e.to_string())
    }
}
