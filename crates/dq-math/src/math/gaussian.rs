//! Multivariate normal log-density tolerant of singular covariance.
//!
//! Class covariance matrices estimated from image data are routinely
//! rank-deficient (pixels constant across every example of a class), so
//! the density is evaluated through a symmetric eigendecomposition:
//! eigenvalues at or below a pinned cutoff are treated as exactly zero,
//! the determinant becomes the pseudo-determinant (product of retained
//! eigenvalues), and the Mahalanobis term uses the pseudo-inverse on
//! the retained eigenpairs. A naive Cholesky/inverse formulation would
//! fail outright on these matrices.
//!
//! Deviations in the null space are not ignored: the residual of
//! `x − μ` outside the retained eigenspace is charged at the cutoff
//! variance (the smallest variance the decomposition distinguishes from
//! zero). A query off a degenerate class's support plane is therefore
//! heavily penalized while the density stays finite for any finite `x`.

use nalgebra::{DMatrix, DVector};

const LN_2PI: f64 = 1.837_877_066_409_345_3; // ln(2*pi)

/// Eigenvalue cutoff relative to the largest eigenvalue.
///
/// An eigenvalue `λ` is treated as zero when
/// `λ <= dim * f64::EPSILON * λ_max`. This is the same relative
/// threshold scipy applies for `allow_singular` Gaussians; it is pinned
/// here because it directly affects log-likelihood magnitudes, and thus
/// posterior rankings, in near-degenerate cases.
fn eigenvalue_cutoff(dim: usize, max_eigenvalue: f64) -> f64 {
    dim as f64 * f64::EPSILON * max_eigenvalue
}

/// Precomputed multivariate normal density N(mean, covariance).
///
/// Construction performs the eigendecomposition once; evaluation is a
/// rank-sized projection plus a null-space residual. Immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct GaussianDensity {
    mean: DVector<f64>,
    /// dim x rank orthonormal basis of the retained eigenspace.
    basis: DMatrix<f64>,
    /// Retained eigenvalues, aligned with the basis columns.
    eigenvalues: Vec<f64>,
    /// Variance charged to null-space deviations: the eigenvalue
    /// cutoff, or `f64::EPSILON` for an all-zero covariance (where the
    /// cutoff itself degenerates to zero).
    floor: f64,
    /// Sum of logs of retained eigenvalues (log pseudo-determinant).
    log_pdet: f64,
}

impl GaussianDensity {
    /// Decompose a covariance matrix around the given mean.
    ///
    /// `covariance` must be square and symmetric with the same dimension
    /// as `mean`; singular and rank-zero matrices are accepted. Small
    /// negative eigenvalues produced by round-off fall below the cutoff
    /// and are discarded with the zeros.
    pub fn new(mean: DVector<f64>, covariance: DMatrix<f64>) -> Self {
        debug_assert_eq!(covariance.nrows(), covariance.ncols());
        debug_assert_eq!(covariance.nrows(), mean.len());

        let dim = mean.len();
        let eigen = covariance.symmetric_eigen();
        let max_eigenvalue = eigen
            .eigenvalues
            .iter()
            .cloned()
            .fold(0.0f64, f64::max);
        let cutoff = eigenvalue_cutoff(dim, max_eigenvalue);

        let retained: Vec<usize> = (0..dim)
            .filter(|&i| eigen.eigenvalues[i] > cutoff)
            .collect();

        let eigenvalues: Vec<f64> = retained.iter().map(|&i| eigen.eigenvalues[i]).collect();
        let log_pdet: f64 = eigenvalues.iter().map(|l| l.ln()).sum();
        let basis = DMatrix::from_fn(dim, retained.len(), |row, col| {
            eigen.eigenvectors[(row, retained[col])]
        });
        let floor = if cutoff > 0.0 { cutoff } else { f64::EPSILON };

        GaussianDensity {
            mean,
            basis,
            eigenvalues,
            floor,
            log_pdet,
        }
    }

    /// Log-density of `x` under this Gaussian.
    ///
    /// `-0.5 * (rank*ln(2π) + log_pdet + mahalanobis²)`, where the
    /// Mahalanobis term covers both the retained eigenspace (through
    /// the pseudo-inverse) and the null-space residual (at the cutoff
    /// variance). Finite for any finite `x`; identically 0 at the mean
    /// of a rank-zero covariance.
    pub fn log_density(&self, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), self.mean.len());
        let diff = DVector::from_column_slice(x) - &self.mean;
        let coords = self.basis.tr_mul(&diff);
        let mut mahalanobis: f64 = coords
            .iter()
            .zip(&self.eigenvalues)
            .map(|(c, lambda)| c * c / lambda)
            .sum();
        if self.rank() < self.mean.len() {
            // Explicit residual vector: its norm carries only
            // second-order round-off, which the tiny floor would
            // otherwise amplify for on-support queries.
            let residual = &diff - &self.basis * &coords;
            mahalanobis += residual.norm_squared() / self.floor;
        }
        -0.5 * (self.rank() as f64 * LN_2PI + self.log_pdet + mahalanobis)
    }

    /// Numerical rank of the covariance (retained eigenvalue count).
    pub fn rank(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Log pseudo-determinant of the covariance.
    pub fn log_pdet(&self) -> f64 {
        self.log_pdet
    }
}
