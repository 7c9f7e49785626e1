//! Property tests for the pipeline's algebraic invariants.

use proptest::prelude::*;

use drift_analysis::decisions::CommitMessage;
use drift_analysis::detectors::outliers;
use drift_analysis::detectors::traits::Observation;
use drift_core::types::pattern::ConfidenceLevel;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,12}".prop_map(|s| s)
}

fn subject_line() -> impl Strategy<Value = String> {
    // No leading/trailing whitespace, no newlines, non-empty.
    "[a-zA-Z0-9][a-zA-Z0-9 _.-]{0,40}[a-zA-Z0-9]".prop_map(|s| s)
}

fn body_text() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-zA-Z0-9][a-zA-Z0-9 .,]{0,60}[a-zA-Z0-9]".prop_map(|s| s))
}

fn trailers() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec(
        ("[A-Z][a-z]{1,8}", "[a-zA-Z0-9][a-zA-Z0-9 -]{0,20}").prop_map(|(k, v)| (k, v)),
        0..3,
    )
}

proptest! {
    /// parse(render(m)) == m for canonical commit messages.
    #[test]
    fn commit_message_round_trip(
        commit_type in "[a-z]{1,10}",
        scope in proptest::option::of(identifier()),
        breaking in any::<bool>(),
        subject in subject_line(),
        body in body_text(),
        trailers in trailers(),
    ) {
        let message = CommitMessage {
            commit_type,
            scope,
            breaking,
            subject,
            body,
            trailers,
        };
        let rendered = message.render();
        let parsed = CommitMessage::parse(&rendered)
            .expect("canonical messages must parse");
        prop_assert_eq!(parsed, message);
    }

    /// Confidence level bucketing is total and consistent with the score.
    #[test]
    fn confidence_bucketing_is_total(score in 0.0f64..=1.0) {
        let level = ConfidenceLevel::from_score(score);
        match level {
            ConfidenceLevel::High => prop_assert!(score >= 0.85),
            ConfidenceLevel::Medium => prop_assert!((0.7..0.85).contains(&score)),
            ConfidenceLevel::Low => prop_assert!((0.5..0.7).contains(&score)),
            ConfidenceLevel::Uncertain => prop_assert!(score < 0.5),
        }
    }

    /// Outlier classification partitions observations exactly once.
    #[test]
    fn outlier_classification_is_a_partition(
        signatures in proptest::collection::vec("[ab]", 1..20),
    ) {
        let observations: Vec<Observation> = signatures
            .iter()
            .enumerate()
            .map(|(i, sig)| Observation {
                pattern_key: "k".to_string(),
                file: format!("src/f{i}.ts"),
                start_line: i as u32 + 1,
                start_column: 0,
                end_line: i as u32 + 1,
                signature: sig.clone(),
                confidence: 0.8,
            })
            .collect();

        let classified = outliers::classify(&observations, &|_| String::new());
        prop_assert_eq!(
            classified.locations.len() + classified.outliers.len(),
            observations.len()
        );

        // Below the floor nothing is an outlier.
        if observations.len() < outliers::MIN_OBSERVATIONS {
            prop_assert!(classified.outliers.is_empty());
        }

        // Every outlier differs from the majority signature.
        if let Some(majority) = classified.majority_signature {
            for outlier in &classified.outliers {
                prop_assert_ne!(&outlier.location.signature, &majority);
            }
        }
    }
}
