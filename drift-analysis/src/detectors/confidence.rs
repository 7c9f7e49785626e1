//! Pattern confidence scoring.
//!
//! Pattern-level score is the weighted mean of its observations'
//! intrinsic confidences plus a small bonus once the pattern has enough
//! occurrences to be trusted, capped at 1.0.

use drift_core::types::pattern::Confidence;

use super::traits::Observation;

/// Occurrence count at which the repetition bonus applies.
pub const BONUS_THRESHOLD: usize = 5;

/// Bonus added once a pattern clears [`BONUS_THRESHOLD`].
pub const REPETITION_BONUS: f64 = 0.05;

/// Score a pattern from its raw observations.
pub fn score(observations: &[Observation]) -> Confidence {
    if observations.is_empty() {
        return Confidence::from_score(0.0);
    }

    // Weighted mean: higher-confidence observations count more.
    let weight_sum: f64 = observations.iter().map(|o| o.confidence).sum();
    let weighted: f64 = observations.iter().map(|o| o.confidence * o.confidence).sum();
    let mean = if weight_sum > 0.0 {
        weighted / weight_sum
    } else {
        0.0
    };

    let bonus = if observations.len() >= BONUS_THRESHOLD {
        REPETITION_BONUS
    } else {
        0.0
    };

    Confidence::from_score((mean + bonus).min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::types::pattern::ConfidenceLevel;

    fn obs(confidence: f64) -> Observation {
        Observation {
            pattern_key: "k".to_string(),
            file: "f".to_string(),
            start_line: 1,
            start_column: 0,
            end_line: 1,
            signature: "s".to_string(),
            confidence,
        }
    }

    #[test]
    fn empty_is_uncertain() {
        let c = score(&[]);
        assert_eq!(c.level, ConfidenceLevel::Uncertain);
    }

    #[test]
    fn uniform_observations_keep_their_confidence() {
        let c = score(&[obs(0.8), obs(0.8)]);
        assert!((c.score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn repetition_bonus_applies_at_threshold() {
        let many: Vec<Observation> = (0..BONUS_THRESHOLD).map(|_| obs(0.8)).collect();
        let c = score(&many);
        assert!((c.score - 0.85).abs() < 1e-9);
        assert_eq!(c.level, ConfidenceLevel::High);
    }

    #[test]
    fn score_is_capped_at_one() {
        let many: Vec<Observation> = (0..10).map(|_| obs(1.0)).collect();
        assert!(score(&many).score <= 1.0);
    }
}
