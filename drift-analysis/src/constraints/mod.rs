//! Constraint synthesis and verification.

pub mod synthesizer;
pub mod verifier;

pub use synthesizer::{synthesize, SynthesisOutcome};
pub use verifier::{verify, ConstraintViolation};
