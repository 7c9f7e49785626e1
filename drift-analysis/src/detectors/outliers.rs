//! Outlier classification against a pattern's majority signature.
//!
//! For each pattern the engine computes the most common signature among
//! its observations. Once the pattern has enough coverage, observations
//! whose signature differs are reclassified as outliers with a
//! human-readable reason. Ties choose (a) the signature spanning the most
//! files, then (b) the lexicographically smallest signature.

use std::collections::BTreeMap;

use drift_core::types::collections::FxHashSet;
use drift_core::types::pattern::{PatternLocation, PatternOutlier};

use super::traits::Observation;

/// Policy-wide coverage floor: below this many observations every
/// occurrence is a location and no outlier is declared.
pub const MIN_OBSERVATIONS: usize = 3;

/// Result of splitting observations into conformers and outliers.
#[derive(Debug, Default)]
pub struct Classified {
    pub locations: Vec<PatternLocation>,
    pub outliers: Vec<PatternOutlier>,
    pub majority_signature: Option<String>,
}

/// Split one pattern's observations by majority signature.
///
/// `file_hashes` maps relative path → short content hash; observations on
/// unknown files get an empty hash.
pub fn classify(
    observations: &[Observation],
    file_hashes: &impl Fn(&str) -> String,
) -> Classified {
    if observations.is_empty() {
        return Classified::default();
    }

    let majority = majority_signature(observations);

    let to_location = |o: &Observation| PatternLocation {
        file: o.file.clone(),
        start_line: o.start_line,
        start_column: o.start_column,
        end_line: o.end_line,
        file_hash: file_hashes(&o.file),
        signature: o.signature.clone(),
    };

    if observations.len() < MIN_OBSERVATIONS {
        return Classified {
            locations: observations.iter().map(to_location).collect(),
            outliers: Vec::new(),
            majority_signature: Some(majority),
        };
    }

    let total = observations.len();
    let conforming = observations
        .iter()
        .filter(|o| o.signature == majority)
        .count();

    let mut classified = Classified {
        majority_signature: Some(majority.clone()),
        ..Default::default()
    };

    for obs in observations {
        if obs.signature == majority {
            classified.locations.push(to_location(obs));
        } else {
            classified.outliers.push(PatternOutlier {
                location: to_location(obs),
                reason: format!(
                    "signature `{}` diverges from the majority `{}` ({conforming} of {total} occurrences conform)",
                    obs.signature, majority
                ),
            });
        }
    }

    classified
}

/// The winning signature: most occurrences, ties broken by file coverage,
/// then lexicographic order.
fn majority_signature(observations: &[Observation]) -> String {
    let mut counts: BTreeMap<&str, (usize, FxHashSet<&str>)> = BTreeMap::new();
    for obs in observations {
        let entry = counts.entry(&obs.signature).or_default();
        entry.0 += 1;
        entry.1.insert(&obs.file);
    }

    counts
        .iter()
        .max_by(|(sig_a, (count_a, files_a)), (sig_b, (count_b, files_b))| {
            count_a
                .cmp(count_b)
                .then(files_a.len().cmp(&files_b.len()))
                // BTreeMap iterates ascending; prefer the smaller signature
                // on a full tie by making it compare greater.
                .then(sig_b.cmp(sig_a))
        })
        .map(|(sig, _)| sig.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(file: &str, line: u32, signature: &str) -> Observation {
        Observation {
            pattern_key: "k".to_string(),
            file: file.to_string(),
            start_line: line,
            start_column: 0,
            end_line: line,
            signature: signature.to_string(),
            confidence: 0.9,
        }
    }

    fn no_hash(_: &str) -> String {
        String::new()
    }

    #[test]
    fn below_floor_nothing_is_an_outlier() {
        let observations = vec![obs("a.ts", 1, "x"), obs("b.ts", 2, "y")];
        let classified = classify(&observations, &no_hash);
        assert_eq!(classified.locations.len(), 2);
        assert!(classified.outliers.is_empty());
    }

    #[test]
    fn minority_signature_becomes_outlier() {
        let observations = vec![
            obs("a.ts", 1, "envelope:{data}"),
            obs("b.ts", 2, "envelope:{data}"),
            obs("c.ts", 3, "bare"),
        ];
        let classified = classify(&observations, &no_hash);
        assert_eq!(classified.locations.len(), 2);
        assert_eq!(classified.outliers.len(), 1);
        assert_eq!(classified.outliers[0].location.file, "c.ts");
        assert!(classified.outliers[0].reason.contains("bare"));
        assert!(classified.outliers[0].reason.contains("envelope:{data}"));
        assert_eq!(
            classified.majority_signature.as_deref(),
            Some("envelope:{data}")
        );
    }

    #[test]
    fn tie_breaks_by_file_coverage_then_lexicographic() {
        // Two signatures with equal counts; `x` spans two files, `y` one.
        let observations = vec![
            obs("a.ts", 1, "x"),
            obs("b.ts", 2, "x"),
            obs("c.ts", 3, "y"),
            obs("c.ts", 4, "y"),
        ];
        let classified = classify(&observations, &no_hash);
        assert_eq!(classified.majority_signature.as_deref(), Some("x"));

        // Full tie: same count, same coverage — smaller signature wins.
        let observations = vec![
            obs("a.ts", 1, "beta"),
            obs("b.ts", 2, "beta"),
            obs("c.ts", 3, "alpha"),
            obs("d.ts", 4, "alpha"),
        ];
        let classified = classify(&observations, &no_hash);
        assert_eq!(classified.majority_signature.as_deref(), Some("alpha"));
    }

    #[test]
    fn locations_and_outliers_are_disjoint() {
        let observations = vec![
            obs("a.ts", 1, "x"),
            obs("b.ts", 2, "x"),
            obs("c.ts", 3, "x"),
            obs("d.ts", 4, "y"),
        ];
        let classified = classify(&observations, &no_hash);
        assert_eq!(
            classified.locations.len() + classified.outliers.len(),
            observations.len()
        );
        for outlier in &classified.outliers {
            assert!(!classified
                .locations
                .iter()
                .any(|l| l.file == outlier.location.file
                    && l.start_line == outlier.location.start_line));
        }
    }
}
