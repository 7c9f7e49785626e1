//! BE↔FE contract extraction and matching.

pub mod extractors;
pub mod matching;

pub use extractors::{extract_backend_endpoints, extract_frontend_calls};
pub use matching::{match_contracts, MatchOutcome};
