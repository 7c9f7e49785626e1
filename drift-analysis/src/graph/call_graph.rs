//! Call graph construction from parse results.
//!
//! Nodes are functions keyed `file::qualified_name`; edges point caller →
//! callee. Resolution is name-based: a call site links to every function
//! sharing the callee name, preferring same-file definitions.

use drift_core::types::collections::FxHashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::parsers::types::ParseResult;

/// One function node.
#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub file: String,
    pub name: String,
    pub qualified_name: String,
    pub is_exported: bool,
}

pub struct CallGraph {
    graph: DiGraph<FunctionNode, ()>,
    by_key: FxHashMap<String, NodeIndex>,
    by_name: FxHashMap<String, Vec<NodeIndex>>,
}

impl CallGraph {
    /// Build the graph from every parsed file.
    pub fn build(parses: &[ParseResult]) -> Self {
        let mut graph = DiGraph::new();
        let mut by_key: FxHashMap<String, NodeIndex> = FxHashMap::default();
        let mut by_name: FxHashMap<String, Vec<NodeIndex>> = FxHashMap::default();

        for parse in parses {
            let functions = parse
                .functions
                .iter()
                .chain(parse.classes.iter().flat_map(|c| c.methods.iter()));
            for func in functions {
                let key = format!("{}::{}", parse.file, func.qualified_name);
                if by_key.contains_key(&key) {
                    continue;
                }
                let idx = graph.add_node(FunctionNode {
                    file: parse.file.clone(),
                    name: func.name.clone(),
                    qualified_name: func.qualified_name.clone(),
                    is_exported: func.is_exported,
                });
                by_key.insert(key, idx);
                by_name.entry(func.name.clone()).or_default().push(idx);
            }
        }

        let mut edges: Vec<(NodeIndex, NodeIndex)> = Vec::new();
        for parse in parses {
            for call in &parse.calls {
                let Some(candidates) = by_name.get(&call.callee_name) else {
                    continue;
                };
                // The enclosing function is the caller: nearest function
                // whose span contains the call line.
                let caller = parse
                    .functions
                    .iter()
                    .chain(parse.classes.iter().flat_map(|c| c.methods.iter()))
                    .filter(|f| f.start_line <= call.line && call.line <= f.end_line)
                    .min_by_key(|f| f.end_line - f.start_line)
                    .map(|f| format!("{}::{}", parse.file, f.qualified_name))
                    .and_then(|key| by_key.get(&key).copied());
                let Some(caller) = caller else {
                    continue;
                };

                // Prefer a same-file definition; otherwise link every
                // candidate (over-approximation is fine for blast radius).
                let same_file: Vec<NodeIndex> = candidates
                    .iter()
                    .copied()
                    .filter(|idx| graph[*idx].file == parse.file)
                    .collect();
                let targets = if same_file.is_empty() {
                    candidates.clone()
                } else {
                    same_file
                };
                for target in targets {
                    if target != caller {
                        edges.push((caller, target));
                    }
                }
            }
        }
        for (from, to) in edges {
            graph.update_edge(from, to, ());
        }

        Self {
            graph,
            by_key,
            by_name,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Functions defined in the given file.
    pub fn functions_in_file(&self, file: &str) -> Vec<NodeIndex> {
        self.by_key
            .iter()
            .filter(|(key, _)| key.starts_with(file) && key[file.len()..].starts_with("::"))
            .map(|(_, idx)| *idx)
            .collect()
    }

    /// All callers (direct and transitive) of the given nodes.
    pub fn reverse_reachable(&self, seeds: &[NodeIndex]) -> Vec<NodeIndex> {
        let mut visited: drift_core::types::collections::FxHashSet<NodeIndex> =
            Default::default();
        let mut stack: Vec<NodeIndex> = seeds.to_vec();
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            for caller in self.graph.neighbors_directed(node, Direction::Incoming) {
                if !visited.contains(&caller) {
                    stack.push(caller);
                }
            }
        }
        let mut out: Vec<NodeIndex> = visited.into_iter().collect();
        out.sort_by_key(|idx| idx.index());
        out
    }

    pub fn node(&self, idx: NodeIndex) -> &FunctionNode {
        &self.graph[idx]
    }

    /// Exported functions with no callers — the graph's entry points.
    pub fn entry_points(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|idx| {
                self.graph[*idx].is_exported
                    && self
                        .graph
                        .neighbors_directed(*idx, Direction::Incoming)
                        .next()
                        .is_none()
            })
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Vec<NodeIndex> {
        self.by_name.get(name).cloned().unwrap_or_default()
    }
}
