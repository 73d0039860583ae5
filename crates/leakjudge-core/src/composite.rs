//! Composite (G-Eval style) metrics derived from the primary judged scores.
//!
//! | composite   | formula                                                   |
//! |-------------|-----------------------------------------------------------|
//! | coherence   | `coherence_and_fluency`                                   |
//! | fluency     | `coherence_and_fluency`                                   |
//! | consistency | `round((data_type + data_propagation + leakage) / 3)`     |
//! | relevance   | `round((data_propagation + sink_match) / 2)`              |
//!
//! Rounding is half-to-even: `3.5 -> 4`, `2.5 -> 2`. Thirds never tie, so the
//! rule only matters for `relevance`.

use crate::domain::{CompositeScores, PrimaryScores};

/// Derive the four composite scores from one set of primary scores.
pub fn derive(primary: &PrimaryScores) -> CompositeScores {
    let co_flu = primary.coherence_and_fluency;
    CompositeScores {
        coherence: co_flu,
        consistency: rounded_mean(&[
            primary.data_type_identification,
            primary.data_propagation_accuracy,
            primary.leakage_inference,
        ]),
        relevance: rounded_mean(&[primary.data_propagation_accuracy, primary.sink_function_match]),
        fluency: co_flu,
    }
}

fn rounded_mean(values: &[u8]) -> u8 {
    if values.is_empty() {
        return 0;
    }
    let sum: u32 = values.iter().map(|&v| u32::from(v)).sum();
    let mean = f64::from(sum) / values.len() as f64;
    mean.round_ties_even() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary(dt: u8, dp: u8, sm: u8, li: u8, cf: u8) -> PrimaryScores {
        PrimaryScores {
            data_type_identification: dt,
            data_propagation_accuracy: dp,
            sink_function_match: sm,
            leakage_inference: li,
            coherence_and_fluency: cf,
        }
    }

    #[test]
    fn test_coherence_and_fluency_copy_co_flu() {
        let c = derive(&primary(1, 1, 1, 1, 4));
        assert_eq!(c.coherence, 4);
        assert_eq!(c.fluency, 4);
    }

    #[test]
    fn test_consistency_rounds_to_nearest() {
        // 4 + 4 + 5 = 13 -> 4.33
        assert_eq!(derive(&primary(4, 4, 0, 5, 0)).consistency, 4);
        // 4 + 5 + 5 = 14 -> 4.67
        assert_eq!(derive(&primary(4, 5, 0, 5, 0)).consistency, 5);
        assert_eq!(derive(&primary(3, 3, 0, 3, 0)).consistency, 3);
    }

    #[test]
    fn test_relevance_ties_round_half_to_even() {
        // (3 + 4) / 2 = 3.5 -> 4
        assert_eq!(derive(&primary(0, 3, 4, 0, 0)).relevance, 4);
        // (2 + 3) / 2 = 2.5 -> 2
        assert_eq!(derive(&primary(0, 2, 3, 0, 0)).relevance, 2);
        // (4 + 5) / 2 = 4.5 -> 4
        assert_eq!(derive(&primary(0, 4, 5, 0, 0)).relevance, 4);
        // (0 + 1) / 2 = 0.5 -> 0
        assert_eq!(derive(&primary(0, 0, 1, 0, 0)).relevance, 0);
    }

    #[test]
    fn test_all_missing_scores_derive_zeros() {
        assert_eq!(derive(&PrimaryScores::default()), CompositeScores::default());
    }

    #[test]
    fn test_derive_is_deterministic() {
        let p = primary(4, 3, 5, 4, 5);
        let first = derive(&p);
        for _ in 0..10 {
            assert_eq!(derive(&p), first);
        }
        assert_eq!(
            first,
            CompositeScores {
                coherence: 5,
                consistency: 4,
                relevance: 4,
                fluency: 5,
            }
        );
    }
}
