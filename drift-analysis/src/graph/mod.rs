//! Function-level call graph and impact analysis.

pub mod call_graph;
pub mod impact;

pub use call_graph::CallGraph;
pub use impact::{simulate_impact, ImpactReport};
