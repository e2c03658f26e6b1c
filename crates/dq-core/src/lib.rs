//! digit-qda core: QDA classifier fitting and inference.
//!
//! The pipeline mirrors the data flow of the classifier:
//! raw sample → validation → [`classifier::Classifier`] →
//! [`stats::ClassStatistics`] (fitted from a [`corpus::TrainingCorpus`]) →
//! [`posterior::PosteriorEngine`] → predicted label.
//!
//! Transport layers (HTTP, queues) live outside this crate; they call
//! [`classifier::Classifier::predict`] and map the structured
//! `dq_common::Error` kinds to their own status codes.

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod logging;
pub mod posterior;
pub mod stats;

pub use classifier::Classifier;
pub use corpus::{CsvCorpus, MemoryCorpus, TrainingCorpus, TrainingSet};
pub use posterior::{PosteriorEngine, Posteriors};
pub use stats::{ClassParams, ClassStatistics};
