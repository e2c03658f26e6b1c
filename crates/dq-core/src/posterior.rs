//! Posterior computation P(y|x) over the fitted classes.
//!
//! Per class: multivariate Gaussian log-likelihood (singularity-tolerant
//! via `dq_math::GaussianDensity`) plus log-prior, then log-sum-exp
//! normalization back to probabilities. All arithmetic stays in log
//! space until the final normalization, so 784-dimensional likelihoods
//! that underflow `f64` by hundreds of orders of magnitude still yield
//! finite posteriors.

use dq_common::Label;
use dq_math::{normalize_log_probs, GaussianDensity};
use serde::Serialize;

use crate::stats::ClassStatistics;

/// One class's share of the posterior mass for a query sample.
#[derive(Debug, Clone, Serialize)]
pub struct ClassPosterior {
    pub label: Label,
    /// Normalized posterior probability, in [0, 1].
    pub probability: f64,
    /// Unnormalized log-posterior (log-likelihood + log-prior).
    pub log_posterior: f64,
}

/// Normalized posterior probabilities for one query sample.
///
/// Entries are in ascending label order and sum to 1 within
/// floating-point tolerance. Ephemeral: recomputed per prediction.
#[derive(Debug, Clone, Serialize)]
pub struct Posteriors {
    entries: Vec<ClassPosterior>,
}

impl Posteriors {
    pub fn entries(&self) -> &[ClassPosterior] {
        &self.entries
    }

    /// Posterior probability of a specific label, if present.
    pub fn probability(&self, label: Label) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.probability)
    }

    /// The most likely label.
    ///
    /// Entries are scanned in ascending label order on the raw
    /// log-posteriors, not the normalized probabilities: normalization
    /// divides through a rounded total and can nudge exactly tied
    /// classes apart by a few ulps. A candidate replaces the current
    /// best only when it exceeds it beyond round-off, so numerically
    /// tied maxima resolve to the smallest label.
    pub fn argmax(&self) -> Label {
        let mut best = &self.entries[0];
        for entry in &self.entries[1..] {
            if log_posterior_exceeds(entry.log_posterior, best.log_posterior) {
                best = entry;
            }
        }
        best.label
    }
}

/// Tie tolerance for the arg-max scan, relative to the log-posterior
/// magnitude. Eigendecompositions of equal-up-to-rotation covariances
/// agree only to a few ulps (~1e-16 relative); genuinely different
/// classes differ by many orders of magnitude more.
const LOG_POSTERIOR_TIE_TOLERANCE: f64 = 1e-12;

fn log_posterior_exceeds(candidate: f64, best: f64) -> bool {
    if candidate <= best {
        return false;
    }
    if best == f64::NEG_INFINITY {
        return true;
    }
    let scale = candidate.abs().max(best.abs()).max(1.0);
    candidate - best > LOG_POSTERIOR_TIE_TOLERANCE * scale
}

/// Precomputed per-class densities and log-priors for one statistics
/// snapshot. Immutable once built; safe to share across threads.
#[derive(Debug, Clone)]
pub struct PosteriorEngine {
    classes: Vec<(Label, f64, GaussianDensity)>,
    dim: usize,
}

impl PosteriorEngine {
    /// Decompose every class covariance once up front.
    ///
    /// The eigendecompositions dominate fitting cost; prediction after
    /// this is a rank-sized projection per class.
    pub fn new(stats: &ClassStatistics) -> Self {
        let classes = stats
            .classes()
            .map(|(label, params)| {
                let density =
                    GaussianDensity::new(params.mean.clone(), params.covariance.clone());
                (label, params.prior.ln(), density)
            })
            .collect();
        PosteriorEngine {
            classes,
            dim: stats.dim(),
        }
    }

    /// Normalized posterior probabilities for a query sample.
    ///
    /// The sample length must match the fitted dimensionality; the
    /// classifier enforces this before calling.
    pub fn posteriors(&self, sample: &[f64]) -> Posteriors {
        debug_assert_eq!(sample.len(), self.dim);
        let log_posteriors: Vec<f64> = self
            .classes
            .iter()
            .map(|(_, log_prior, density)| density.log_density(sample) + log_prior)
            .collect();
        let probabilities = normalize_log_probs(&log_posteriors);

        let entries = self
            .classes
            .iter()
            .zip(log_posteriors.iter().zip(probabilities))
            .map(|((label, _, _), (&log_posterior, probability))| ClassPosterior {
                label: *label,
                probability,
                log_posterior,
            })
            .collect();
        Posteriors { entries }
    }

    /// Labels the engine was fitted on, ascending.
    pub fn labels(&self) -> Vec<Label> {
        self.classes.iter().map(|(label, _, _)| *label).collect()
    }

    /// Feature dimensionality of the fitted statistics.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TrainingSet;
    use crate::stats::ClassStatistics;
    use nalgebra::DMatrix;

    fn engine(rows: &[&[f64]], labels: &[Label]) -> PosteriorEngine {
        let dim = rows[0].len();
        let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        let training =
            TrainingSet::new(DMatrix::from_row_slice(rows.len(), dim, &flat), labels.to_vec())
                .unwrap();
        PosteriorEngine::new(&ClassStatistics::fit(&training).unwrap())
    }

    fn two_cluster_engine() -> PosteriorEngine {
        engine(
            &[
                &[0.0, 0.0, 1.0],
                &[1.0, 0.5, 0.0],
                &[0.5, 1.0, 0.5],
                &[250.0, 255.0, 254.0],
                &[255.0, 253.0, 255.0],
                &[252.0, 254.0, 253.0],
            ],
            &[0, 0, 0, 1, 1, 1],
        )
    }

    #[test]
    fn posteriors_sum_to_one_and_lie_in_unit_interval() {
        let engine = two_cluster_engine();
        for sample in [&[0.0, 0.0, 0.0], &[255.0, 255.0, 255.0], &[128.0, 100.0, 40.0]] {
            let posteriors = engine.posteriors(sample);
            let total: f64 = posteriors.entries().iter().map(|e| e.probability).sum();
            assert!((total - 1.0).abs() < 1e-6);
            for entry in posteriors.entries() {
                assert!((0.0..=1.0).contains(&entry.probability));
                assert!(entry.probability.is_finite());
            }
        }
    }

    #[test]
    fn cluster_membership_dominates_the_posterior() {
        let engine = two_cluster_engine();
        assert_eq!(engine.posteriors(&[0.0, 0.0, 0.0]).argmax(), 0);
        assert_eq!(engine.posteriors(&[255.0, 255.0, 255.0]).argmax(), 1);
    }

    #[test]
    fn degenerate_constant_feature_stays_finite() {
        // Second feature constant in both classes: singular covariance,
        // pseudo-inverse path must carry it without error.
        let engine = engine(
            &[&[0.0, 5.0], &[1.0, 5.0], &[2.0, 5.0], &[10.0, 5.0], &[11.0, 5.0]],
            &[0, 0, 0, 1, 1],
        );
        let posteriors = engine.posteriors(&[1.0, 5.0]);
        let total: f64 = posteriors.entries().iter().map(|e| e.probability).sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(posteriors.argmax(), 0);
    }

    #[test]
    fn argmax_breaks_ties_toward_the_smaller_label() {
        // Identical rows for both labels: identical means, covariances,
        // and priors, hence exactly equal posteriors.
        let engine = engine(
            &[&[1.0, 2.0], &[3.0, 4.0], &[1.0, 2.0], &[3.0, 4.0]],
            &[7, 7, 3, 3],
        );
        let posteriors = engine.posteriors(&[2.0, 3.0]);
        let entries = posteriors.entries();
        assert_eq!(entries[0].log_posterior, entries[1].log_posterior);
        assert_eq!(posteriors.argmax(), 3);
    }

    #[test]
    fn equivalent_classes_from_distinct_rows_tie_to_the_smaller_label() {
        // The two labels are fitted from different row sets whose
        // covariances are rotations of each other: same rank, same
        // pseudo-determinant, same prior. At the shared mean the
        // log-posteriors agree only up to eigendecomposition round-off,
        // which must still count as a tie.
        let engine = engine(
            &[&[0.0, 0.0], &[2.0, 2.0], &[0.0, 2.0], &[2.0, 0.0]],
            &[8, 8, 2, 2],
        );
        let posteriors = engine.posteriors(&[1.0, 1.0]);
        let entries = posteriors.entries();
        assert!((entries[0].log_posterior - entries[1].log_posterior).abs() < 1e-12);
        assert_eq!(posteriors.argmax(), 2);
    }

    #[test]
    fn prior_shifts_the_posterior_for_an_ambiguous_sample() {
        use std::f64::consts::SQRT_2;
        // Both classes share mean 1 and sample variance 2; class 0 has
        // three rows to class 9's two, so the prior decides the center.
        let engine = engine(
            &[&[1.0 - SQRT_2], &[1.0], &[1.0 + SQRT_2], &[0.0], &[2.0]],
            &[0, 0, 0, 9, 9],
        );
        let posteriors = engine.posteriors(&[1.0]);
        assert!(posteriors.probability(0).unwrap() > posteriors.probability(9).unwrap());
    }
}
