//! Classifier orchestration: validate, fit (or reuse), infer, arg-max.
//!
//! The classifier owns its training corpus collaborator and a cached
//! snapshot of fitted statistics. Snapshots are immutable and shared
//! behind an `Arc`; a refresh fits a whole new snapshot and swaps the
//! pointer, so concurrent in-flight predictions never observe a
//! partially updated mean/covariance pair. The cache is keyed by a
//! content fingerprint of the training data, which makes reuse a pure
//! optimization: fitting fresh on every call would produce identical
//! numbers.

use std::sync::{Arc, RwLock};

use dq_common::{Error, Label, Result, Sample};
use tracing::{debug, info};

use crate::corpus::TrainingCorpus;
use crate::posterior::{PosteriorEngine, Posteriors};
use crate::stats::ClassStatistics;

struct Snapshot {
    fingerprint: String,
    engine: PosteriorEngine,
}

/// A QDA classifier over a training corpus.
pub struct Classifier<C: TrainingCorpus> {
    corpus: C,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl<C: TrainingCorpus> Classifier<C> {
    /// Build a classifier over the given corpus. No data is read until
    /// the first prediction (or an explicit [`Classifier::refresh`]).
    pub fn new(corpus: C) -> Self {
        Classifier {
            corpus,
            snapshot: RwLock::new(None),
        }
    }

    /// Predict the most likely label for a raw pixel vector.
    ///
    /// Validation failures short-circuit before any statistical work;
    /// corpus and fitting errors propagate unchanged. Ties resolve to
    /// the smallest label.
    pub fn predict(&self, pixels: &[f64]) -> Result<Label> {
        Ok(self.posteriors(pixels)?.argmax())
    }

    /// Full posterior distribution for a raw pixel vector.
    pub fn posteriors(&self, pixels: &[f64]) -> Result<Posteriors> {
        let sample = Sample::new(pixels.to_vec())?;
        let snapshot = self.current_snapshot()?;
        if snapshot.engine.dim() != sample.len() {
            return Err(Error::data_unavailable(format!(
                "training data has {} feature columns but samples have {}",
                snapshot.engine.dim(),
                sample.len()
            )));
        }
        Ok(snapshot.engine.posteriors(sample.pixels()))
    }

    /// Reload the corpus and swap in a freshly fitted snapshot.
    ///
    /// If the training content is unchanged (same fingerprint) the
    /// existing snapshot is kept; otherwise the new one replaces it
    /// atomically.
    pub fn refresh(&self) -> Result<()> {
        self.fit_snapshot()?;
        Ok(())
    }

    fn current_snapshot(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.read_lock().as_ref() {
            return Ok(Arc::clone(snapshot));
        }
        self.fit_snapshot()
    }

    fn fit_snapshot(&self) -> Result<Arc<Snapshot>> {
        let training = self.corpus.load()?;
        let fingerprint = training.fingerprint();

        if let Some(current) = self.read_lock().as_ref() {
            if current.fingerprint == fingerprint {
                debug!(%fingerprint, "training data unchanged; keeping fitted snapshot");
                return Ok(Arc::clone(current));
            }
        }

        let stats = ClassStatistics::fit(&training)?;
        let engine = PosteriorEngine::new(&stats);
        info!(
            %fingerprint,
            classes = engine.labels().len(),
            rows = training.len(),
            "fitted classifier snapshot"
        );
        let snapshot = Arc::new(Snapshot {
            fingerprint,
            engine,
        });

        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<Snapshot>>> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
