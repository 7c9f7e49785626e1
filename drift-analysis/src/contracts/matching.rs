//! Contract matching: join backend endpoints and frontend calls on
//! `(normalized path, method)`, compute field mismatches.

use std::collections::BTreeMap;

use drift_core::types::contract::{
    Contract, ContractField, ContractStatus, FieldMismatch, MismatchKind,
};
use drift_core::types::pattern::Severity;

use super::extractors::{normalize_path, ExtractedCall, ExtractedEndpoint};

/// Result of one matching pass.
#[derive(Debug, Default)]
pub struct MatchOutcome {
    pub contracts: Vec<Contract>,
    pub unmatched_backend: Vec<ExtractedEndpoint>,
    pub unmatched_frontend: Vec<ExtractedCall>,
}

/// Join endpoints and calls, producing contracts with field mismatches.
pub fn match_contracts(
    endpoints: Vec<ExtractedEndpoint>,
    calls: Vec<ExtractedCall>,
) -> MatchOutcome {
    let mut by_route: BTreeMap<(String, String), (Vec<ExtractedEndpoint>, Vec<ExtractedCall>)> =
        BTreeMap::new();

    for endpoint in endpoints {
        let key = (endpoint.method.clone(), normalize_path(&endpoint.path));
        by_route.entry(key).or_default().0.push(endpoint);
    }
    for call in calls {
        let key = (call.method.clone(), normalize_path(&call.path));
        by_route.entry(key).or_default().1.push(call);
    }

    let mut outcome = MatchOutcome::default();

    for ((method, path), (route_endpoints, route_calls)) in by_route {
        if route_endpoints.is_empty() {
            outcome.unmatched_frontend.extend(route_calls);
            continue;
        }
        if route_calls.is_empty() {
            outcome.unmatched_backend.extend(route_endpoints);
            continue;
        }

        // One backend endpoint per route wins; extras are duplicates the
        // extraction layer keeps for surfacing.
        let backend = route_endpoints[0].endpoint.clone();
        let frontend_calls: Vec<_> = route_calls.iter().map(|c| c.call.clone()).collect();

        let mut mismatches = Vec::new();
        for call in &route_calls {
            mismatches.extend(field_mismatches(
                &backend.response_fields,
                &call.call.expected_fields,
            ));
        }
        mismatches.sort_by(|a, b| a.field_path.cmp(&b.field_path));
        mismatches.dedup_by(|a, b| a.field_path == b.field_path && a.kind == b.kind);

        let status = if mismatches.is_empty() {
            ContractStatus::Verified
        } else {
            ContractStatus::Broken
        };

        outcome.contracts.push(Contract {
            id: format!("{} {path}", method),
            method,
            normalized_path: path,
            backend,
            frontend_calls,
            mismatches,
            status,
            confidence: 0.85,
        });
    }

    outcome
}

/// Compare two field sets by name-path.
fn field_mismatches(
    backend: &[ContractField],
    frontend: &[ContractField],
) -> Vec<FieldMismatch> {
    // Either side without declared fields means "shape unknown" — nothing
    // to compare.
    if backend.is_empty() || frontend.is_empty() {
        return Vec::new();
    }

    let mut mismatches = Vec::new();

    for field in backend {
        match frontend.iter().find(|f| f.path == field.path) {
            None => mismatches.push(FieldMismatch {
                field_path: field.path.clone(),
                kind: MismatchKind::MissingInFrontend,
                severity: Severity::Warning,
            }),
            Some(other) => {
                if field.field_type != other.field_type
                    && field.field_type != "unknown"
                    && other.field_type != "unknown"
                {
                    mismatches.push(FieldMismatch {
                        field_path: field.path.clone(),
                        kind: MismatchKind::TypeMismatch,
                        severity: Severity::Error,
                    });
                }
                if field.optional != other.optional {
                    mismatches.push(FieldMismatch {
                        field_path: field.path.clone(),
                        kind: MismatchKind::OptionalityMismatch,
                        severity: Severity::Warning,
                    });
                }
                if field.nullable != other.nullable {
                    mismatches.push(FieldMismatch {
                        field_path: field.path.clone(),
                        kind: MismatchKind::NullabilityMismatch,
                        severity: Severity::Warning,
                    });
                }
            }
        }
    }

    for field in frontend {
        if !backend.iter().any(|f| f.path == field.path) {
            mismatches.push(FieldMismatch {
                field_path: field.path.clone(),
                kind: MismatchKind::MissingInBackend,
                severity: Severity::Error,
            });
        }
    }

    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::types::contract::BackendEndpoint;
    use drift_core::types::contract::FrontendCall;

    fn endpoint(method: &str, path: &str, fields: &[&str]) -> ExtractedEndpoint {
        ExtractedEndpoint {
            method: method.to_string(),
            path: path.to_string(),
            endpoint: BackendEndpoint {
                file: "src/routes.ts".to_string(),
                line: 1,
                response_fields: fields
                    .iter()
                    .map(|f| ContractField {
                        path: f.to_string(),
                        field_type: "unknown".to_string(),
                        optional: false,
                        nullable: false,
                    })
                    .collect(),
            },
        }
    }

    fn call(method: &str, path: &str, fields: &[&str]) -> ExtractedCall {
        ExtractedCall {
            method: method.to_string(),
            path: path.to_string(),
            call: FrontendCall {
                file: "web/api.ts".to_string(),
                line: 1,
                expected_type: None,
                expected_fields: fields
                    .iter()
                    .map(|f| ContractField {
                        path: f.to_string(),
                        field_type: "unknown".to_string(),
                        optional: false,
                        nullable: false,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn matched_route_without_field_info_is_verified() {
        let outcome = match_contracts(
            vec![endpoint("GET", "/api/users/:id", &[])],
            vec![call("GET", "/api/users/{id}", &[])],
        );
        assert_eq!(outcome.contracts.len(), 1);
        assert_eq!(outcome.contracts[0].status, ContractStatus::Verified);
        assert!(outcome.unmatched_backend.is_empty());
        assert!(outcome.unmatched_frontend.is_empty());
    }

    #[test]
    fn field_divergence_breaks_contract() {
        let outcome = match_contracts(
            vec![endpoint("GET", "/api/users", &["data", "error"])],
            vec![call("GET", "/api/users", &["data", "meta"])],
        );
        let contract = &outcome.contracts[0];
        assert_eq!(contract.status, ContractStatus::Broken);
        let kinds: Vec<MismatchKind> = contract.mismatches.iter().map(|m| m.kind).collect();
        assert!(kinds.contains(&MismatchKind::MissingInFrontend));
        assert!(kinds.contains(&MismatchKind::MissingInBackend));
    }

    #[test]
    fn unmatched_sides_are_retained() {
        let outcome = match_contracts(
            vec![endpoint("GET", "/api/orphan", &[])],
            vec![call("POST", "/api/widow", &[])],
        );
        assert!(outcome.contracts.is_empty());
        assert_eq!(outcome.unmatched_backend.len(), 1);
        assert_eq!(outcome.unmatched_frontend.len(), 1);
    }
}
