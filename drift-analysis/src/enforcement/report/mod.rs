//! Reporters — render a `QualityGateResult` for humans and CI systems.

pub mod github;
pub mod gitlab;
pub mod json;
pub mod sarif;
pub mod text;

use crate::enforcement::types::QualityGateResult;

/// One output format.
pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate(&self, result: &QualityGateResult) -> Result<String, String>;
}

/// Look up a reporter by format name.
pub fn create_reporter(format: &str) -> Option<Box<dyn Reporter>> {
    match format {
        "text" => Some(Box::new(text::TextReporter)),
        "json" => Some(Box::new(json::JsonReporter)),
        "github" => Some(Box::new(github::GitHubReporter)),
        "gitlab" => Some(Box::new(gitlab::GitLabReporter)),
        "sarif" => Some(Box::new(sarif::SarifReporter)),
        _ => None,
    }
}

pub fn available_formats() -> &'static [&'static str] {
    &["text", "json", "github", "gitlab", "sarif"]
}
