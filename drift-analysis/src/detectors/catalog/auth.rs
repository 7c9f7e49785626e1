//! Auth detectors: middleware placement and token handling.

use drift_core::types::pattern::PatternCategory;
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation};
use crate::scanner::Language;

const AUTH_MIDDLEWARE: &[&str] = &[
    "requireauth",
    "requireauthentication",
    "authenticate",
    "isauthenticated",
    "ensureauthenticated",
    "verifytoken",
    "validatetoken",
    "checkauth",
    "authorize",
    "login_required",
    "permission_required",
];

/// Detects how authorization middleware is invoked on routes; the
/// majority invocation form is the convention.
pub struct AuthMiddlewareDetector {
    decorator_form: Regex,
}

impl AuthMiddlewareDetector {
    pub fn new() -> Self {
        Self {
            decorator_form: Regex::new(r"@(login_required|permission_required|auth_required)")
                .expect("static regex"),
        }
    }
}

impl Default for AuthMiddlewareDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for AuthMiddlewareDetector {
    fn id(&self) -> &'static str {
        "auth.middleware"
    }
    fn name(&self) -> &'static str {
        "Auth middleware placement"
    }
    fn description(&self) -> &'static str {
        "How authorization checks are attached to request handlers"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Auth
    }
    fn subcategory(&self) -> &'static str {
        "middleware"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();

        for call in &ctx.parse.calls {
            let callee = call.callee_name.to_lowercase();
            if AUTH_MIDDLEWARE.contains(&callee.as_str()) {
                result.observations.push(Observation {
                    pattern_key: "guard".to_string(),
                    file: ctx.file.to_string(),
                    start_line: call.line,
                    start_column: call.column,
                    end_line: call.line,
                    signature: format!("call:{callee}"),
                    confidence: 0.9,
                });
            }
        }

        for (line_no, line) in ctx.code_lines() {
            if let Some(caps) = self.decorator_form.captures(line) {
                result.observations.push(Observation {
                    pattern_key: "guard".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: format!("decorator:{}", &caps[1]),
                    confidence: 0.9,
                });
            }
        }

        result
    }
}

/// Detects JWT and password-hashing primitives so their consistent use is
/// tracked as a pattern.
pub struct TokenHandlingDetector {
    primitives: Regex,
}

impl TokenHandlingDetector {
    pub fn new() -> Self {
        Self {
            primitives: Regex::new(
                r"\b(jwt\.(?:sign|verify|decode)|bcrypt\.(?:hash|compare)|argon2\.(?:hash|verify))\b",
            )
            .expect("static regex"),
        }
    }
}

impl Default for TokenHandlingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for TokenHandlingDetector {
    fn id(&self) -> &'static str {
        "auth.tokens"
    }
    fn name(&self) -> &'static str {
        "Token handling primitives"
    }
    fn description(&self) -> &'static str {
        "JWT and password-hashing primitive usage"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Auth
    }
    fn subcategory(&self) -> &'static str {
        "tokens"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::JavaScript, Language::Python]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();
        for (line_no, line) in ctx.code_lines() {
            for caps in self.primitives.captures_iter(line) {
                let primitive = &caps[1];
                let library = primitive.split('.').next().unwrap_or(primitive);
                result.observations.push(Observation {
                    pattern_key: "primitive".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    signature: library.to_string(),
                    confidence: 0.95,
                });
            }
        }
        result
    }
}
