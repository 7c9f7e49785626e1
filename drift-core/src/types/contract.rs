//! BE↔FE API contracts.

use serde::{Deserialize, Serialize};

use super::pattern::Severity;

/// A field present in a request or response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractField {
    /// Dotted name-path, e.g. `data.user.email`.
    pub path: String,
    pub field_type: String,
    pub optional: bool,
    pub nullable: bool,
}

/// The backend side of a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendEndpoint {
    pub file: String,
    pub line: u32,
    pub response_fields: Vec<ContractField>,
}

/// A frontend call consuming the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendCall {
    pub file: String,
    pub line: u32,
    /// The response type the caller expects, when annotated.
    pub expected_type: Option<String>,
    pub expected_fields: Vec<ContractField>,
}

/// How the two sides of a contract disagree on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchKind {
    MissingInFrontend,
    MissingInBackend,
    TypeMismatch,
    OptionalityMismatch,
    NullabilityMismatch,
}

impl MismatchKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MissingInFrontend => "missing-in-frontend",
            Self::MissingInBackend => "missing-in-backend",
            Self::TypeMismatch => "type-mismatch",
            Self::OptionalityMismatch => "optionality-mismatch",
            Self::NullabilityMismatch => "nullability-mismatch",
        }
    }
}

/// A single field-level disagreement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMismatch {
    pub field_path: String,
    pub kind: MismatchKind,
    pub severity: Severity,
}

/// Verification state of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Discovered,
    Verified,
    Broken,
}

impl ContractStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Verified => "verified",
            Self::Broken => "broken",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "discovered" => Some(Self::Discovered),
            "verified" => Some(Self::Verified),
            "broken" => Some(Self::Broken),
            _ => None,
        }
    }
}

/// A backend endpoint paired with the frontend calls that consume it.
///
/// Invariant: `status == Verified` implies `mismatches` was empty at
/// verification time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub method: String,
    /// Path with parameter segments normalized to `{param}`.
    pub normalized_path: String,
    pub backend: BackendEndpoint,
    pub frontend_calls: Vec<FrontendCall>,
    pub mismatches: Vec<FieldMismatch>,
    pub status: ContractStatus,
    pub confidence: f64,
}
