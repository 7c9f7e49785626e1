//! Decision mining — architectural signals from commit history.

pub mod categorizer;
pub mod commit_message;
pub mod history;
pub mod types;

pub use categorizer::categorize;
pub use commit_message::CommitMessage;
pub use history::HistoryMiner;
pub use types::{CommitSummary, Decision, DecisionCategory};
