//! Impact simulation: blast radius of a change set over the call graph.

use drift_core::types::collections::FxHashSet;

use super::call_graph::CallGraph;

/// What a change to the given files would reach.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ImpactReport {
    pub changed_files: usize,
    /// Functions defined in the changed files.
    pub directly_changed_functions: usize,
    /// Functions transitively calling into the change set.
    pub impacted_functions: usize,
    /// Files containing impacted functions.
    pub impacted_files: usize,
    /// Impacted entry points (exported roots).
    pub impacted_entry_points: usize,
    /// 0–100; how much of the graph one change drags along.
    pub friction_score: f64,
}

/// Simulate the blast radius of changing `files`.
pub fn simulate_impact(graph: &CallGraph, files: &[String]) -> ImpactReport {
    let mut seeds = Vec::new();
    for file in files {
        seeds.extend(graph.functions_in_file(file));
    }

    let reached = graph.reverse_reachable(&seeds);
    let impacted_files: FxHashSet<&str> = reached
        .iter()
        .map(|idx| graph.node(*idx).file.as_str())
        .collect();

    let entry_points: FxHashSet<_> = graph.entry_points().into_iter().collect();
    let impacted_entry_points = reached
        .iter()
        .filter(|idx| entry_points.contains(idx))
        .count();

    let total = graph.node_count().max(1);
    let friction_score = (reached.len() as f64 / total as f64) * 100.0;

    ImpactReport {
        changed_files: files.len(),
        directly_changed_functions: seeds.len(),
        impacted_functions: reached.len(),
        impacted_files: impacted_files.len(),
        impacted_entry_points,
        friction_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::types::{CallSite, FunctionInfo, ParseResult};
    use crate::scanner::Language;

    fn func(name: &str, start: u32, end: u32, exported: bool) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            qualified_name: name.to_string(),
            start_line: start,
            end_line: end,
            column: 0,
            is_async: false,
            is_exported: exported,
            return_type: None,
            parameters: Vec::new(),
            decorators: Vec::new(),
            body_hash: 0,
        }
    }

    fn call(callee: &str, line: u32) -> CallSite {
        CallSite {
            callee_name: callee.to_string(),
            receiver: None,
            line,
            column: 0,
            is_method_call: false,
            args: Vec::new(),
            is_await: false,
        }
    }

    /// handler (exported, a.ts) calls helper (b.ts); changing b.ts
    /// impacts both and reaches the entry point.
    #[test]
    fn blast_radius_reaches_callers() {
        let mut a = ParseResult::empty("src/a.ts", Language::TypeScript);
        a.functions.push(func("handler", 1, 10, true));
        a.calls.push(call("helper", 5));

        let mut b = ParseResult::empty("src/b.ts", Language::TypeScript);
        b.functions.push(func("helper", 1, 5, false));

        let graph = CallGraph::build(&[a, b]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let report = simulate_impact(&graph, &["src/b.ts".to_string()]);
        assert_eq!(report.directly_changed_functions, 1);
        assert_eq!(report.impacted_functions, 2);
        assert_eq!(report.impacted_files, 2);
        assert_eq!(report.impacted_entry_points, 1);
        assert!(report.friction_score > 99.0);
    }

    #[test]
    fn unrelated_change_has_no_reach() {
        let mut a = ParseResult::empty("src/a.ts", Language::TypeScript);
        a.functions.push(func("handler", 1, 10, true));

        let mut c = ParseResult::empty("src/c.ts", Language::TypeScript);
        c.functions.push(func("standalone", 1, 4, false));

        let graph = CallGraph::build(&[a, c]);
        let report = simulate_impact(&graph, &["src/c.ts".to_string()]);
        assert_eq!(report.impacted_functions, 1);
        assert_eq!(report.impacted_entry_points, 0);
    }
}
