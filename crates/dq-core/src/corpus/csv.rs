//! CSV-backed training corpus.
//!
//! The training table is one row per sample: the class label in the
//! first column followed by exactly [`SAMPLE_DIM`] pixel columns. An
//! optional header row is detected by its non-numeric first field and
//! skipped. Any structural defect fails the whole load with a
//! row-numbered `DataUnavailable` detail.

use std::fs;
use std::path::{Path, PathBuf};

use dq_common::{Error, Label, Result, SAMPLE_DIM};
use nalgebra::DMatrix;
use tracing::info;

use super::{TrainingCorpus, TrainingSet};

/// Training corpus backed by a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvCorpus {
    path: PathBuf,
}

impl CsvCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvCorpus { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrainingCorpus for CsvCorpus {
    fn load(&self) -> Result<TrainingSet> {
        let content = fs::read_to_string(&self.path).map_err(|err| {
            Error::data_unavailable(format!("reading {}: {err}", self.path.display()))
        })?;

        let mut labels: Vec<Label> = Vec::new();
        let mut pixels: Vec<f64> = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split(',');
            let label_field = fields.next().unwrap_or("");

            // Header detection: a first row whose label column is not an
            // integer is treated as column names.
            let label: Label = match label_field.trim().parse() {
                Ok(label) => label,
                Err(_) if labels.is_empty() && line_no == 0 => continue,
                Err(_) => {
                    return Err(Error::data_unavailable(format!(
                        "{}: row {}: label {label_field:?} is not an integer",
                        self.path.display(),
                        line_no + 1
                    )))
                }
            };

            let start = pixels.len();
            for field in fields {
                let value: f64 = field.trim().parse().map_err(|_| {
                    Error::data_unavailable(format!(
                        "{}: row {}: pixel value {field:?} is not numeric",
                        self.path.display(),
                        line_no + 1
                    ))
                })?;
                pixels.push(value);
            }
            let width = pixels.len() - start;
            if width != SAMPLE_DIM {
                return Err(Error::data_unavailable(format!(
                    "{}: row {}: expected {SAMPLE_DIM} pixel columns, got {width}",
                    self.path.display(),
                    line_no + 1
                )));
            }
            labels.push(label);
        }

        if labels.is_empty() {
            return Err(Error::data_unavailable(format!(
                "{}: no training rows",
                self.path.display()
            )));
        }

        let rows = labels.len();
        info!(
            path = %self.path.display(),
            rows,
            "loaded training corpus"
        );
        TrainingSet::new(DMatrix::from_row_slice(rows, SAMPLE_DIM, &pixels), labels)
    }
}
