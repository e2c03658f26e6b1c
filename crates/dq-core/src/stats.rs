//! Per-class Gaussian statistics fitted from a training set.
//!
//! For every distinct label in the training data: the empirical prior
//! (class frequency), the per-feature mean vector, and the unbiased
//! sample covariance matrix. Fitting is a pure, deterministic function
//! of the training set; the result is read-only afterwards. Singular
//! covariance matrices are legal outputs and are handled downstream by
//! the pseudo-inverse density.

use std::collections::BTreeMap;

use dq_common::{Error, Label, Result};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::corpus::TrainingSet;

/// Fitted parameters for one class.
#[derive(Debug, Clone)]
pub struct ClassParams {
    /// Empirical prior P(y): class row count over total rows.
    pub prior: f64,
    /// Per-feature arithmetic mean of the class rows.
    pub mean: DVector<f64>,
    /// Unbiased sample covariance ((n−1) divisor); possibly singular.
    pub covariance: DMatrix<f64>,
    /// Number of training rows in the class.
    pub count: usize,
}

/// The full set of per-class statistics for one training snapshot.
///
/// Classes iterate in ascending label order, which downstream arg-max
/// scans rely on for the deterministic smallest-label tie-break.
#[derive(Debug, Clone)]
pub struct ClassStatistics {
    classes: BTreeMap<Label, ClassParams>,
    dim: usize,
}

impl ClassStatistics {
    /// Fit priors, means, and covariances from a training set.
    ///
    /// Fails with `InsufficientClassSamples` when any class has fewer
    /// than 2 rows: the (n−1)-divisor covariance is undefined there,
    /// and failing loudly was chosen over substituting a fallback
    /// matrix that would silently reshape posterior rankings.
    pub fn fit(training: &TrainingSet) -> Result<Self> {
        let n_total = training.len();
        let dim = training.dim();
        let features = training.features();

        let mut rows_by_label: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
        for (row, &label) in training.labels().iter().enumerate() {
            rows_by_label.entry(label).or_default().push(row);
        }

        let mut classes = BTreeMap::new();
        for (label, rows) in rows_by_label {
            let n = rows.len();
            if n < 2 {
                return Err(Error::InsufficientClassSamples { label });
            }

            let mut mean = DVector::zeros(dim);
            for &row in &rows {
                for col in 0..dim {
                    mean[col] += features[(row, col)];
                }
            }
            mean /= n as f64;

            // Centered class matrix; covariance = Cᵀ C / (n−1).
            let centered = DMatrix::from_fn(n, dim, |r, c| features[(rows[r], c)] - mean[c]);
            let covariance = centered.tr_mul(&centered) / (n as f64 - 1.0);

            let prior = n as f64 / n_total as f64;
            debug!(label, count = n, prior, "fitted class statistics");
            classes.insert(
                label,
                ClassParams {
                    prior,
                    mean,
                    covariance,
                    count: n,
                },
            );
        }

        info!(
            classes = classes.len(),
            rows = n_total,
            dim,
            "fitted class statistics"
        );
        Ok(ClassStatistics { classes, dim })
    }

    /// Classes in ascending label order.
    pub fn classes(&self) -> impl Iterator<Item = (Label, &ClassParams)> {
        self.classes.iter().map(|(&label, params)| (label, params))
    }

    /// The labels observed in the training data, ascending.
    pub fn labels(&self) -> Vec<Label> {
        self.classes.keys().copied().collect()
    }

    pub fn params(&self, label: Label) -> Option<&ClassParams> {
        self.classes.get(&label)
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Feature dimensionality the statistics were fitted at.
    pub fn dim(&self) -> usize {
        self.dim
    }
}
