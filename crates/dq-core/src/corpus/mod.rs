//! Training corpus access.
//!
//! A [`TrainingCorpus`] produces the fixed `(features, labels)` pair the
//! classifier fits from. The core depends only on that shape: the
//! backing store may be a CSV table ([`CsvCorpus`]) or an in-memory
//! fixture ([`MemoryCorpus`]).

pub mod csv;
pub mod memory;

pub use csv::CsvCorpus;
pub use memory::MemoryCorpus;

use dq_common::{Error, Label, Result};
use nalgebra::DMatrix;
use sha2::{Digest, Sha256};

/// A source of labeled training data.
///
/// `load` has no side effects beyond reading and fails with
/// `DataUnavailable` when the backing source cannot be read or is
/// malformed.
pub trait TrainingCorpus {
    fn load(&self) -> Result<TrainingSet>;
}

/// A loaded training table: an N×D feature matrix and N labels.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    features: DMatrix<f64>,
    labels: Vec<Label>,
}

impl TrainingSet {
    /// Wrap a feature matrix and label vector, enforcing the corpus
    /// guarantees: at least one row, a nonzero feature dimension, and
    /// matching feature/label counts.
    pub fn new(features: DMatrix<f64>, labels: Vec<Label>) -> Result<Self> {
        if features.nrows() == 0 {
            return Err(Error::data_unavailable("training set has no rows"));
        }
        if features.ncols() == 0 {
            return Err(Error::data_unavailable("training set has no feature columns"));
        }
        if features.nrows() != labels.len() {
            return Err(Error::data_unavailable(format!(
                "feature/label count mismatch: {} rows vs {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(TrainingSet { features, labels })
    }

    /// Number of training rows.
    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.features.nrows() == 0
    }

    /// Feature dimensionality.
    pub fn dim(&self) -> usize {
        self.features.ncols()
    }

    /// The feature matrix (rows are samples).
    pub fn features(&self) -> &DMatrix<f64> {
        &self.features
    }

    /// The label vector, index-aligned with the feature rows.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// SHA-256 fingerprint of the training content.
    ///
    /// Used to key the fitted-statistics cache: identical content yields
    /// an identical fingerprint, so a refresh against unchanged data can
    /// skip the refit without any behavior change.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.features.nrows() as u64).to_le_bytes());
        hasher.update((self.features.ncols() as u64).to_le_bytes());
        for row in self.features.row_iter() {
            for value in row.iter() {
                hasher.update(value.to_le_bytes());
            }
        }
        for label in &self.labels {
            hasher.update(label.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_set() -> TrainingSet {
        let features = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        TrainingSet::new(features, vec![0, 1]).unwrap()
    }

    #[test]
    fn rejects_empty_features() {
        let err = TrainingSet::new(DMatrix::zeros(0, 3), vec![]).unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
    }

    #[test]
    fn rejects_count_mismatch() {
        let features = DMatrix::zeros(2, 3);
        let err = TrainingSet::new(features, vec![0]).unwrap_err();
        assert!(err.to_string().contains("mismatch"));
    }

    #[test]
    fn fingerprint_is_content_addressed() {
        let a = tiny_set();
        let b = tiny_set();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let features = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.5]);
        let c = TrainingSet::new(features, vec![0, 1]).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn fingerprint_covers_labels() {
        let features = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let relabeled = TrainingSet::new(features, vec![0, 2]).unwrap();
        assert_ne!(tiny_set().fingerprint(), relabeled.fingerprint());
    }
}
