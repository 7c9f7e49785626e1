//! Unified language provider — call-chain normalization plus framework
//! matchers that recognize data-access operations on the normalized shape.

pub mod chains;
pub mod matchers;
pub mod sql;
pub mod types;

pub use chains::extract_chains;
pub use matchers::MatcherEngine;
pub use types::{DataAccessMatch, DataOperation, NormalizedArg, UnifiedCallChain};
