//! In-memory training corpus for tests and benches.

use dq_common::{Error, Label, Result};
use nalgebra::DMatrix;

use super::{TrainingCorpus, TrainingSet};

/// A fixed training table held in memory.
///
/// Rows may have any (consistent) dimensionality, which keeps unit
/// tests of the fitting machinery cheap; only the sample validator pins
/// the production dimension.
#[derive(Debug, Clone)]
pub struct MemoryCorpus {
    rows: Vec<Vec<f64>>,
    labels: Vec<Label>,
}

impl MemoryCorpus {
    pub fn new(rows: Vec<Vec<f64>>, labels: Vec<Label>) -> Self {
        MemoryCorpus { rows, labels }
    }
}

impl TrainingCorpus for MemoryCorpus {
    fn load(&self) -> Result<TrainingSet> {
        let nrows = self.rows.len();
        let dim = self.rows.first().map(Vec::len).unwrap_or(0);
        if self.rows.iter().any(|row| row.len() != dim) {
            return Err(Error::data_unavailable(
                "in-memory corpus rows have inconsistent widths",
            ));
        }
        let flat: Vec<f64> = self.rows.iter().flatten().copied().collect();
        TrainingSet::new(DMatrix::from_row_slice(nrows, dim, &flat), self.labels.clone())
    }
}
