//! Endpoint and API-call extraction.
//!
//! Backend: Express/Fastify-style routes (TS/JS), Flask/FastAPI decorators
//! (Python), Axum routers (Rust). Frontend: fetch/axios call sites.
//! Extraction is lexical; response/request field shapes come from nearby
//! object literals and are best-effort.

use drift_core::types::contract::{BackendEndpoint, ContractField, FrontendCall};
use regex::Regex;

use crate::scanner::Language;

/// A backend endpoint before matching.
#[derive(Debug, Clone)]
pub struct ExtractedEndpoint {
    pub method: String,
    pub path: String,
    pub endpoint: BackendEndpoint,
}

/// A frontend call before matching.
#[derive(Debug, Clone)]
pub struct ExtractedCall {
    pub method: String,
    pub path: String,
    pub call: FrontendCall,
}

/// Normalize a route path: parameter segments become `{param}`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.split(['?', '#']).next().unwrap_or(path);
    let mut segments: Vec<String> = Vec::new();
    for segment in trimmed.split('/') {
        if segment.is_empty() {
            continue;
        }
        let normalized = if segment.starts_with(':')
            || (segment.starts_with('{') && segment.ends_with('}'))
            || segment.starts_with('<')
            || segment.starts_with('$')
            || segment.chars().all(|c| c.is_ascii_digit())
        {
            "{param}".to_string()
        } else {
            segment.to_lowercase()
        };
        segments.push(normalized);
    }
    format!("/{}", segments.join("/"))
}

/// Extract backend endpoints from one file.
pub fn extract_backend_endpoints(
    content: &str,
    file: &str,
    language: Language,
) -> Vec<ExtractedEndpoint> {
    match language {
        Language::TypeScript | Language::JavaScript => express_endpoints(content, file),
        Language::Python => flask_endpoints(content, file),
        Language::Rust => axum_endpoints(content, file),
        _ => Vec::new(),
    }
}

fn express_endpoints(content: &str, file: &str) -> Vec<ExtractedEndpoint> {
    // app.get('/users/:id', handler)
    let route = Regex::new(
        r#"\b(?:app|router|server|api)\.(get|post|put|delete|patch)\(\s*["'`]([^"'`]+)["'`]"#,
    )
    .expect("static regex");
    let mut endpoints = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for caps in route.captures_iter(line) {
            endpoints.push(ExtractedEndpoint {
                method: caps[1].to_uppercase(),
                path: caps[2].to_string(),
                endpoint: BackendEndpoint {
                    file: file.to_string(),
                    line: idx as u32 + 1,
                    response_fields: response_fields_near(content, idx),
                },
            });
        }
    }
    endpoints
}

fn flask_endpoints(content: &str, file: &str) -> Vec<ExtractedEndpoint> {
    // @app.route('/users/<id>', methods=['GET']) and
    // @app.get('/users/<id>') / @router.post(...)
    let route = Regex::new(
        r#"@(?:app|router|api|blueprint|bp)\.(route|get|post|put|delete|patch)\(\s*["']([^"']+)["']"#,
    )
    .expect("static regex");
    let methods_kw = Regex::new(r#"methods\s*=\s*\[([^\]]*)\]"#).expect("static regex");

    let mut endpoints = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for caps in route.captures_iter(line) {
            let path = caps[2].to_string();
            let verb = &caps[1];
            let methods: Vec<String> = if verb == "route" {
                methods_kw
                    .captures(line)
                    .map(|m| {
                        m[1].split(',')
                            .map(|s| s.trim().trim_matches(['"', '\'']).to_uppercase())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_else(|| vec!["GET".to_string()])
            } else {
                vec![verb.to_uppercase()]
            };
            for method in methods {
                endpoints.push(ExtractedEndpoint {
                    method,
                    path: path.clone(),
                    endpoint: BackendEndpoint {
                        file: file.to_string(),
                        line: idx as u32 + 1,
                        response_fields: Vec::new(),
                    },
                });
            }
        }
    }
    endpoints
}

fn axum_endpoints(content: &str, file: &str) -> Vec<ExtractedEndpoint> {
    // .route("/users/{id}", get(show_user).post(create_user))
    let route =
        Regex::new(r#"\.route\(\s*"([^"]+)"\s*,\s*([a-z_]+)\("#).expect("static regex");
    let mut endpoints = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for caps in route.captures_iter(line) {
            let method = caps[2].to_uppercase();
            if !matches!(method.as_str(), "GET" | "POST" | "PUT" | "DELETE" | "PATCH") {
                continue;
            }
            endpoints.push(ExtractedEndpoint {
                method,
                path: caps[1].to_string(),
                endpoint: BackendEndpoint {
                    file: file.to_string(),
                    line: idx as u32 + 1,
                    response_fields: Vec::new(),
                },
            });
        }
    }
    endpoints
}

/// Extract frontend API calls from one file.
pub fn extract_frontend_calls(
    content: &str,
    file: &str,
    language: Language,
) -> Vec<ExtractedCall> {
    if !matches!(language, Language::TypeScript | Language::JavaScript) {
        return Vec::new();
    }

    let mut calls = Vec::new();

    // fetch('/api/users', { method: 'POST' })
    let fetch = Regex::new(r#"\bfetch\(\s*["'`]([^"'`]+)["'`]"#).expect("static regex");
    let fetch_method =
        Regex::new(r#"method\s*:\s*["']([A-Za-z]+)["']"#).expect("static regex");
    // axios.get('/api/users') / http.post(...)
    let axios = Regex::new(
        r#"\b(?:axios|http|client)\.(get|post|put|delete|patch)(?:<([A-Za-z0-9_\[\]<>]+)>)?\(\s*["'`]([^"'`]+)["'`]"#,
    )
    .expect("static regex");

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx as u32 + 1;

        for caps in fetch.captures_iter(line) {
            let method = fetch_method
                .captures(line)
                .map(|m| m[1].to_uppercase())
                .unwrap_or_else(|| "GET".to_string());
            calls.push(ExtractedCall {
                method,
                path: caps[1].to_string(),
                call: FrontendCall {
                    file: file.to_string(),
                    line: line_no,
                    expected_type: None,
                    expected_fields: Vec::new(),
                },
            });
        }

        for caps in axios.captures_iter(line) {
            calls.push(ExtractedCall {
                method: caps[1].to_uppercase(),
                path: caps[3].to_string(),
                call: FrontendCall {
                    file: file.to_string(),
                    line: line_no,
                    expected_type: caps.get(2).map(|m| m.as_str().to_string()),
                    expected_fields: Vec::new(),
                },
            });
        }
    }
    calls
}

/// Response fields from the nearest `res.json({ … })` after a route line.
fn response_fields_near(content: &str, route_line_idx: usize) -> Vec<ContractField> {
    let json_call = Regex::new(r"res\.json\(\s*\{([^}]*)\}").expect("static regex");
    let lines: Vec<&str> = content.lines().collect();
    let window_end = (route_line_idx + 30).min(lines.len());

    for line in &lines[route_line_idx..window_end] {
        if let Some(caps) = json_call.captures(line) {
            return caps[1]
                .split(',')
                .filter_map(|pair| pair.split(':').next())
                .map(str::trim)
                .filter(|k| !k.is_empty() && k.chars().all(|c| c.is_alphanumeric() || c == '_'))
                .map(|k| ContractField {
                    path: k.to_string(),
                    field_type: "unknown".to_string(),
                    optional: false,
                    nullable: false,
                })
                .collect();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_normalization() {
        assert_eq!(normalize_path("/users/:id"), "/users/{param}");
        assert_eq!(normalize_path("/users/{id}"), "/users/{param}");
        assert_eq!(normalize_path("/users/<int:id>"), "/users/{param}");
        assert_eq!(normalize_path("/Users/42/Orders"), "/users/{param}/orders");
        assert_eq!(normalize_path("/health?probe=1"), "/health");
    }

    #[test]
    fn express_route_with_envelope() {
        let src = "app.get('/api/users/:id', (req, res) => {\n  res.json({ data: user, error: null });\n});\n";
        let endpoints = extract_backend_endpoints(src, "src/routes.ts", Language::TypeScript);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, "GET");
        assert_eq!(endpoints[0].path, "/api/users/:id");
        let fields: Vec<&str> = endpoints[0]
            .endpoint
            .response_fields
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(fields, vec!["data", "error"]);
    }

    #[test]
    fn flask_route_methods() {
        let src = "@app.route('/api/users', methods=['GET', 'POST'])\ndef users():\n    pass\n";
        let endpoints = extract_backend_endpoints(src, "app/views.py", Language::Python);
        let methods: Vec<&str> = endpoints.iter().map(|e| e.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "POST"]);
    }

    #[test]
    fn axum_route() {
        let src = r#"let app = Router::new().route("/api/users/{id}", get(show_user));"#;
        let endpoints = extract_backend_endpoints(src, "src/http.rs", Language::Rust);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, "GET");
    }

    #[test]
    fn frontend_fetch_and_axios() {
        let src = "const r = await fetch('/api/users', { method: 'POST' });\nconst u = await axios.get<User>('/api/users/1');\n";
        let calls = extract_frontend_calls(src, "web/api.ts", Language::TypeScript);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[1].method, "GET");
        assert_eq!(calls[1].call.expected_type.as_deref(), Some("User"));
    }
}
