//! User-authored custom rules.

pub mod evaluator;
pub mod loader;
pub mod types;

pub use evaluator::evaluate_rules;
pub use loader::load_rule_files;
pub use types::CustomRule;
