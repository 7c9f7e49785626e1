//! Shared tree-sitter extraction engine.
//!
//! All grammar-backed parsers funnel through [`parse_source`]: a single
//! depth-first cursor walk with per-kind dispatch. Extraction is
//! deliberately tolerant — grammars differ in field names, so helpers fall
//! back to text-level splitting rather than assuming one AST shape.

use std::path::Path;
use std::time::Instant;

use drift_core::errors::ParseError;
use tree_sitter::{Node, Parser};

use super::locations;
use super::types::*;
use crate::scanner::hasher::span_hash;
use crate::scanner::Language;

/// Maximum stored length for call argument text.
const MAX_ARG_TEXT: usize = 120;

/// Parse `source` with the given grammar and extract the canonical facts.
pub fn parse_source(
    source: &[u8],
    path: &Path,
    language: Language,
    grammar: tree_sitter::Language,
) -> Result<ParseResult, ParseError> {
    let start = Instant::now();
    let file = path.to_string_lossy().replace('\\', "/");

    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|_| ParseError::GrammarUnavailable {
            language: language.name().to_string(),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::ParserFailure {
            path: path.to_path_buf(),
            message: "tree-sitter returned no tree".to_string(),
        })?;

    let mut result = ParseResult::empty(&file, language);
    let root = tree.root_node();

    collect_error_diagnostics(root, &mut result.diagnostics);
    extract(&mut result, root, source, language);
    result.semantic_locations = locations::build(&result, source, language);
    result.parse_time_us = start.elapsed().as_micros() as u64;
    Ok(result)
}

/// Record every ERROR region as a diagnostic, bounded so a pathological
/// file cannot flood the result.
fn collect_error_diagnostics(root: Node, diagnostics: &mut Vec<Diagnostic>) {
    const MAX_DIAGNOSTICS: usize = 64;
    if !root.has_error() {
        return;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if diagnostics.len() >= MAX_DIAGNOSTICS {
            break;
        }
        if node.is_error() || node.is_missing() {
            diagnostics.push(Diagnostic {
                message: format!("syntax error near line {}", node.start_position().row + 1),
                line: node.start_position().row as u32 + 1,
            });
            continue;
        }
        if node.has_error() {
            for i in 0..node.child_count() {
                if let Some(child) = node.child(i) {
                    stack.push(child);
                }
            }
        }
    }
    diagnostics.sort_by_key(|d| d.line);
}

fn extract(result: &mut ParseResult, root: Node, source: &[u8], language: Language) {
    let mut cursor = root.walk();
    walk_node(result, &mut cursor, source, language, 0);
}

fn walk_node(
    result: &mut ParseResult,
    cursor: &mut tree_sitter::TreeCursor,
    source: &[u8],
    language: Language,
    depth: usize,
) {
    let node = cursor.node();
    let kind = node.kind();

    match kind {
        "function_declaration" | "function_definition" | "function_item"
        | "method_declaration" | "method_definition" | "constructor_declaration" => {
            if let Some(func) = extract_function(node, source, language) {
                result.functions.push(func);
            }
        }
        "arrow_function" => {
            if let Some(func) = extract_arrow_function(node, source) {
                result.functions.push(func);
            }
        }
        "class_declaration" | "class_definition" => {
            if let Some(class) = extract_class(node, source, language, DeclKind::Class) {
                result.classes.push(class);
            }
        }
        "interface_declaration" => {
            if let Some(class) = extract_class(node, source, language, DeclKind::Interface) {
                result.classes.push(class);
            }
        }
        "struct_item" => {
            if let Some(class) = extract_class(node, source, language, DeclKind::Struct) {
                result.classes.push(class);
            }
        }
        "trait_item" => {
            if let Some(class) = extract_class(node, source, language, DeclKind::Trait) {
                result.classes.push(class);
            }
        }
        "enum_item" | "enum_declaration" => {
            if let Some(class) = extract_class(node, source, language, DeclKind::Enum) {
                result.classes.push(class);
            }
        }
        "type_alias_declaration" | "type_item" => {
            if let Some(class) = extract_class(node, source, language, DeclKind::TypeAlias) {
                result.classes.push(class);
            }
        }
        "type_spec" => {
            // Go: only struct and interface types are declarations we keep.
            let inner_kind = node
                .child_by_field_name("type")
                .map(|t| t.kind().to_string());
            let decl = match inner_kind.as_deref() {
                Some("struct_type") => Some(DeclKind::Struct),
                Some("interface_type") => Some(DeclKind::Interface),
                _ => None,
            };
            if let Some(decl) = decl {
                if let Some(class) = extract_class(node, source, language, decl) {
                    result.classes.push(class);
                }
            }
        }
        "import_statement" | "import_from_statement" | "import_declaration"
        | "use_declaration" | "using_directive" | "namespace_use_declaration" => {
            extract_import(node, source, language, &mut result.imports);
        }
        "export_statement" => {
            let text = node_text(node, source);
            result.exports.push(ExportInfo {
                name: exported_name(node, source),
                is_default: text.starts_with("export default"),
                line: line_of(node),
            });
        }
        "call_expression" | "call" | "method_invocation" | "invocation_expression"
        | "function_call_expression" | "member_call_expression"
        | "scoped_call_expression" => {
            if let Some(call) = extract_call(node, source, language) {
                result.calls.push(call);
            }
        }
        "decorator" | "attribute_item" | "annotation" | "marker_annotation" => {
            let raw = node_text(node, source);
            let name = raw
                .trim_start_matches(['@', '#', '['])
                .split(['(', ']', ' '])
                .next()
                .unwrap_or("")
                .to_string();
            if !name.is_empty() {
                result.decorators.push(DecoratorInfo {
                    name,
                    raw: truncate(&raw, MAX_ARG_TEXT),
                    line: line_of(node),
                });
            }
        }
        "string" | "string_literal" | "template_string" | "interpreted_string_literal"
        | "raw_string_literal" | "encapsed_string" => {
            let raw = node_text(node, source);
            let value = raw.trim_matches(['"', '\'', '`']).to_string();
            if !value.is_empty() && value.len() <= 512 {
                result.string_literals.push(StringLiteral {
                    value,
                    line: line_of(node),
                    column: node.start_position().column as u32,
                });
            }
        }
        _ => {}
    }

    if depth < 64 && cursor.goto_first_child() {
        loop {
            walk_node(result, cursor, source, language, depth + 1);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

// ---- functions ----

fn extract_function(node: Node, source: &[u8], language: Language) -> Option<FunctionInfo> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .or_else(|| find_child_text(node, source, &["identifier", "property_identifier", "field_identifier"]))?;

    let params = node
        .child_by_field_name("parameters")
        .or_else(|| node.child_by_field_name("parameter_list"))
        .map(|p| extract_parameters(p, source))
        .unwrap_or_default();

    let return_type = node
        .child_by_field_name("return_type")
        .or_else(|| node.child_by_field_name("type"))
        .map(|t| node_text(t, source).trim_start_matches([':', ' ']).trim().to_string());

    let body_text = node
        .child_by_field_name("body")
        .map(|b| node_text(b, source))
        .unwrap_or_default();

    let qualified_name = enclosing_type_name(node, source)
        .map(|owner| format!("{owner}.{name}"))
        .unwrap_or_else(|| name.clone());

    Some(FunctionInfo {
        qualified_name,
        is_async: has_token(node, "async"),
        is_exported: is_exported(node, source, &name, language),
        return_type,
        parameters: params,
        decorators: leading_decorators(node, source),
        start_line: line_of(node),
        end_line: node.end_position().row as u32 + 1,
        column: node.start_position().column as u32,
        body_hash: span_hash(body_text.as_bytes()),
        name,
    })
}

fn extract_arrow_function(node: Node, source: &[u8]) -> Option<FunctionInfo> {
    // Only named arrows (assigned to a declarator or property) are kept;
    // anonymous inline callbacks would flood the function table.
    let parent = node.parent()?;
    let name = match parent.kind() {
        "variable_declarator" | "public_field_definition" | "pair" => {
            find_child_text(parent, source, &["identifier", "property_identifier"])?
        }
        _ => return None,
    };

    let body_text = node
        .child_by_field_name("body")
        .map(|b| node_text(b, source))
        .unwrap_or_default();

    let is_exported = ancestor_of_kind(node, "export_statement").is_some();

    Some(FunctionInfo {
        qualified_name: name.clone(),
        is_async: has_token(node, "async"),
        is_exported,
        return_type: None,
        parameters: node
            .child_by_field_name("parameters")
            .map(|p| extract_parameters(p, source))
            .unwrap_or_default(),
        decorators: Vec::new(),
        start_line: line_of(node),
        end_line: node.end_position().row as u32 + 1,
        column: node.start_position().column as u32,
        body_hash: span_hash(body_text.as_bytes()),
        name,
    })
}

fn extract_parameters(params_node: Node, source: &[u8]) -> Vec<Parameter> {
    let mut out = Vec::new();
    for i in 0..params_node.named_child_count() {
        let Some(param) = params_node.named_child(i) else {
            continue;
        };
        if param.kind() == "comment" {
            continue;
        }
        let name = param
            .child_by_field_name("pattern")
            .or_else(|| param.child_by_field_name("name"))
            .map(|n| node_text(n, source))
            .or_else(|| find_child_text(param, source, &["identifier"]))
            .unwrap_or_else(|| node_text(param, source));
        let type_annotation = param
            .child_by_field_name("type")
            .map(|t| node_text(t, source).trim_start_matches([':', ' ']).trim().to_string());
        out.push(Parameter {
            name: truncate(&name, 64),
            type_annotation,
        });
    }
    out
}

// ---- classes ----

fn extract_class(
    node: Node,
    source: &[u8],
    language: Language,
    kind: DeclKind,
) -> Option<ClassInfo> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .or_else(|| {
            find_child_text(node, source, &["identifier", "type_identifier", "constant"])
        })?;

    let extends = node
        .child_by_field_name("superclass")
        .map(|n| node_text(n, source).trim_start_matches("extends ").trim().to_string());

    let mut implements = drift_core::types::collections::SmallVec2::new();
    if let Some(heritage) = find_child_by_kind(node, "class_heritage")
        .or_else(|| find_child_by_kind(node, "implements_clause"))
        .or_else(|| find_child_by_kind(node, "super_interfaces"))
    {
        let text = node_text(heritage, source);
        for part in text
            .trim_start_matches("implements")
            .trim_start_matches("extends")
            .split(',')
        {
            let part = part.trim().trim_start_matches("implements ").trim();
            if !part.is_empty() && part.len() < 64 {
                implements.push(part.to_string());
            }
        }
    }

    let mut methods = Vec::new();
    let mut properties = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        for i in 0..body.named_child_count() {
            let Some(child) = body.named_child(i) else {
                continue;
            };
            match child.kind() {
                "method_definition" | "method_declaration" | "function_definition"
                | "function_item" | "constructor_declaration" => {
                    if let Some(mut func) = extract_function(child, source, language) {
                        func.qualified_name = format!("{}.{}", name, func.name);
                        methods.push(func);
                    }
                }
                "public_field_definition" | "field_declaration" | "property_declaration"
                | "property_signature" => {
                    if let Some(prop) =
                        find_child_text(child, source, &["identifier", "property_identifier", "field_identifier"])
                    {
                        properties.push(prop);
                    }
                }
                _ => {}
            }
        }
    }

    Some(ClassInfo {
        kind,
        extends,
        implements,
        is_exported: is_exported(node, source, &name, language),
        start_line: line_of(node),
        end_line: node.end_position().row as u32 + 1,
        methods,
        properties,
        decorators: leading_decorators(node, source),
        name,
    })
}

// ---- imports ----

fn extract_import(node: Node, source: &[u8], language: Language, out: &mut Vec<ImportInfo>) {
    let text = node_text(node, source);
    let line = line_of(node);

    match language {
        Language::TypeScript | Language::JavaScript => {
            let source_name = node
                .child_by_field_name("source")
                .map(|s| node_text(s, source).trim_matches(['"', '\'']).to_string())
                .or_else(|| first_string_in(node, source));
            let Some(source_name) = source_name else {
                return;
            };
            let is_type_only = text.starts_with("import type");
            out.push(ImportInfo {
                source: source_name,
                names: ts_import_names(&text),
                line,
                is_type_only,
            });
        }
        Language::Python => {
            if node.kind() == "import_from_statement" {
                let module = node
                    .child_by_field_name("module_name")
                    .map(|m| node_text(m, source))
                    .unwrap_or_default();
                let names = text
                    .split_once(" import ")
                    .map(|(_, rest)| rest)
                    .unwrap_or("")
                    .split(',')
                    .map(|n| n.trim())
                    .filter(|n| !n.is_empty())
                    .map(|n| {
                        let (imported, local) = match n.split_once(" as ") {
                            Some((i, l)) => (i.trim(), l.trim()),
                            None => (n, n),
                        };
                        ImportName {
                            imported: imported.to_string(),
                            local: local.to_string(),
                            is_default: false,
                        }
                    })
                    .collect();
                out.push(ImportInfo {
                    source: module,
                    names,
                    line,
                    is_type_only: false,
                });
            } else {
                for module in text.trim_start_matches("import ").split(',') {
                    let module = module.trim();
                    let (name, local) = match module.split_once(" as ") {
                        Some((m, a)) => (m.trim(), a.trim()),
                        None => (module, module),
                    };
                    if name.is_empty() {
                        continue;
                    }
                    out.push(ImportInfo {
                        source: name.to_string(),
                        names: vec![ImportName {
                            imported: name.to_string(),
                            local: local.to_string(),
                            is_default: false,
                        }],
                        line,
                        is_type_only: false,
                    });
                }
            }
        }
        Language::Go => {
            // Multi-spec import blocks contribute one entry per string.
            let mut found = false;
            collect_strings(node, source, &mut |value, spec_line| {
                found = true;
                out.push(ImportInfo {
                    source: value.to_string(),
                    names: Vec::new(),
                    line: spec_line,
                    is_type_only: false,
                });
            });
            if !found {
                return;
            }
        }
        _ => {
            // Java / C# / PHP / Rust: the statement text minus keyword noise.
            let source_name = text
                .trim_start_matches("import ")
                .trim_start_matches("using ")
                .trim_start_matches("use ")
                .trim_start_matches("static ")
                .trim_end_matches(';')
                .trim()
                .to_string();
            if source_name.is_empty() {
                return;
            }
            out.push(ImportInfo {
                source: source_name,
                names: Vec::new(),
                line,
                is_type_only: false,
            });
        }
    }
}

fn ts_import_names(text: &str) -> Vec<ImportName> {
    let mut names = Vec::new();

    let Some(clause) = text
        .strip_prefix("import type")
        .or_else(|| text.strip_prefix("import"))
    else {
        return names;
    };
    let clause = clause.split(" from ").next().unwrap_or("");

    if let Some(open) = clause.find('{') {
        // Default import before the brace, if any.
        let default_part = clause[..open].trim().trim_end_matches(',').trim();
        if !default_part.is_empty() && default_part != "*" {
            names.push(ImportName {
                imported: "default".to_string(),
                local: default_part.to_string(),
                is_default: true,
            });
        }
        if let Some(close) = clause.find('}') {
            for item in clause[open + 1..close].split(',') {
                let item = item.trim();
                if item.is_empty() {
                    continue;
                }
                let (imported, local) = match item.split_once(" as ") {
                    Some((i, l)) => (i.trim(), l.trim()),
                    None => (item, item),
                };
                names.push(ImportName {
                    imported: imported.to_string(),
                    local: local.to_string(),
                    is_default: false,
                });
            }
        }
    } else {
        let default_part = clause.trim();
        if !default_part.is_empty() && !default_part.starts_with('"') && !default_part.starts_with('\'') {
            names.push(ImportName {
                imported: "default".to_string(),
                local: default_part.split_whitespace().next().unwrap_or("").to_string(),
                is_default: true,
            });
        }
    }
    names
}

// ---- calls ----

fn extract_call(node: Node, source: &[u8], language: Language) -> Option<CallSite> {
    let args_node = node
        .child_by_field_name("arguments")
        .or_else(|| find_child_by_kind(node, "argument_list"))
        .or_else(|| find_child_by_kind(node, "arguments"));

    let callee_end = args_node.map(|a| a.start_byte()).unwrap_or(node.end_byte());
    if callee_end <= node.start_byte() {
        return None;
    }
    let callee_text = std::str::from_utf8(&source[node.start_byte()..callee_end])
        .ok()?
        .trim()
        .to_string();
    if callee_text.is_empty() || callee_text.len() > 256 {
        return None;
    }

    let separator = match language {
        Language::Rust => "::",
        Language::Php => "->",
        _ => ".",
    };

    let (receiver, callee_name) = match callee_text.rsplit_once(separator) {
        Some((recv, name)) => (Some(recv.to_string()), name.to_string()),
        None => match callee_text.rsplit_once('.') {
            Some((recv, name)) => (Some(recv.to_string()), name.to_string()),
            None => (None, callee_text.clone()),
        },
    };
    let callee_name: String = callee_name
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if callee_name.is_empty() {
        return None;
    }

    let mut args = Vec::new();
    if let Some(args_node) = args_node {
        for i in 0..args_node.named_child_count() {
            if let Some(arg) = args_node.named_child(i) {
                args.push(truncate(&node_text(arg, source), MAX_ARG_TEXT));
            }
        }
    }

    let is_await = ancestor_within(node, 2, |k| k == "await_expression" || k == "await");

    Some(CallSite {
        is_method_call: receiver.is_some(),
        receiver: receiver.map(|r| truncate(&r, MAX_ARG_TEXT)),
        callee_name,
        line: line_of(node),
        column: node.start_position().column as u32,
        args,
        is_await,
    })
}

// ---- shared helpers ----

pub(crate) fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut end = max;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        text[..end].to_string()
    }
}

fn find_child_text(node: Node, source: &[u8], kinds: &[&str]) -> Option<String> {
    for i in 0..node.child_count() {
        let child = node.child(i)?;
        if kinds.contains(&child.kind()) {
            return Some(node_text(child, source));
        }
    }
    None
}

fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                return Some(child);
            }
        }
    }
    None
}

fn has_token(node: Node, token: &str) -> bool {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == token {
                return true;
            }
        }
    }
    false
}

fn ancestor_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == kind {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

fn ancestor_within(node: Node, levels: usize, pred: impl Fn(&str) -> bool) -> bool {
    let mut current = node.parent();
    for _ in 0..levels {
        match current {
            Some(parent) => {
                if pred(parent.kind()) {
                    return true;
                }
                current = parent.parent();
            }
            None => return false,
        }
    }
    false
}

fn enclosing_type_name(node: Node, source: &[u8]) -> Option<String> {
    let mut current = node.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "class_declaration" | "class_definition" | "impl_item" | "interface_declaration" => {
                return parent
                    .child_by_field_name("name")
                    .or_else(|| parent.child_by_field_name("type"))
                    .map(|n| node_text(n, source));
            }
            _ => {}
        }
        current = parent.parent();
    }
    None
}

fn leading_decorators(node: Node, source: &[u8]) -> Vec<String> {
    let mut decorators = Vec::new();
    // Python wraps in decorated_definition; TS/Java put decorators as
    // preceding siblings.
    if let Some(parent) = node.parent() {
        if parent.kind() == "decorated_definition" {
            for i in 0..parent.named_child_count() {
                if let Some(child) = parent.named_child(i) {
                    if child.kind() == "decorator" {
                        decorators.push(
                            node_text(child, source)
                                .trim_start_matches('@')
                                .split('(')
                                .next()
                                .unwrap_or("")
                                .to_string(),
                        );
                    }
                }
            }
            return decorators;
        }
    }
    let mut sibling = node.prev_sibling();
    while let Some(prev) = sibling {
        match prev.kind() {
            "decorator" | "annotation" | "marker_annotation" | "attribute_item" => {
                decorators.push(
                    node_text(prev, source)
                        .trim_start_matches(['@', '#', '['])
                        .split(['(', ']'])
                        .next()
                        .unwrap_or("")
                        .to_string(),
                );
                sibling = prev.prev_sibling();
            }
            "comment" | "line_comment" | "block_comment" => sibling = prev.prev_sibling(),
            _ => break,
        }
    }
    decorators.reverse();
    decorators
}

fn is_exported(node: Node, source: &[u8], name: &str, language: Language) -> bool {
    match language {
        Language::TypeScript | Language::JavaScript => {
            ancestor_of_kind(node, "export_statement").is_some()
        }
        Language::Go => name.chars().next().is_some_and(|c| c.is_uppercase()),
        Language::Rust => has_token(node, "visibility_modifier")
            || find_child_by_kind(node, "visibility_modifier").is_some(),
        Language::Python => !name.starts_with('_'),
        Language::Java | Language::CSharp | Language::Php => {
            let text = node_text(node, source);
            text.split_whitespace().take(4).any(|t| t == "public")
        }
        _ => false,
    }
}

fn first_string_in(node: Node, source: &[u8]) -> Option<String> {
    for i in 0..node.child_count() {
        let child = node.child(i)?;
        if matches!(child.kind(), "string" | "string_literal" | "interpreted_string_literal") {
            return Some(node_text(child, source).trim_matches(['"', '\'']).to_string());
        }
    }
    None
}

fn collect_strings(node: Node, source: &[u8], f: &mut impl FnMut(&str, u32)) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if matches!(
            current.kind(),
            "interpreted_string_literal" | "string_literal" | "raw_string_literal"
        ) {
            let text = node_text(current, source);
            let value = text.trim_matches(['"', '`']);
            if !value.is_empty() {
                f(value, current.start_position().row as u32 + 1);
            }
            continue;
        }
        for i in (0..current.child_count()).rev() {
            if let Some(child) = current.child(i) {
                stack.push(child);
            }
        }
    }
}

fn exported_name(node: Node, source: &[u8]) -> Option<String> {
    for i in 0..node.named_child_count() {
        let child = node.named_child(i)?;
        if let Some(name) = child
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
        {
            return Some(name);
        }
    }
    None
}
