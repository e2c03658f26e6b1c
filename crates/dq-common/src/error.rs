//! Error types for digit-qda.
//!
//! Structured errors with:
//! - Stable kind strings for machine parsing
//! - Category classification so an outer transport layer can map
//!   validation failures and data failures to different status codes
//!   without string matching
//!
//! Errors serialize to JSON for agent-facing output:
//!
//! ```json
//! {
//!   "kind": "invalid_sample_length",
//!   "category": "validation",
//!   "message": "invalid sample length: expected 784 pixels, got 0"
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::sample::{Label, SAMPLE_DIM};

/// Result type alias for digit-qda operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
///
/// Validation errors are caller-correctable input defects; data errors
/// violate a precondition of the statistical model and are surfaced as
/// server-side failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Structural or value defects in a caller-supplied sample.
    Validation,
    /// Training data missing, malformed, or insufficient for fitting.
    Data,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Data => write!(f, "data"),
        }
    }
}

/// Unified error type for digit-qda.
///
/// Numerical edge cases (singular covariance matrices) are deliberately
/// absent: they are handled by the pseudo-inverse density formulation,
/// not reported as failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Sample does not have exactly [`SAMPLE_DIM`] entries.
    #[error("invalid sample length: expected {SAMPLE_DIM} pixels, got {actual}")]
    InvalidSampleLength { actual: usize },

    /// Some pixel intensity falls outside [0, 255].
    #[error("invalid sample: pixel values must lie in [0, 255]")]
    InvalidSamplePixelValue,

    /// The training corpus could not be read or is malformed.
    #[error("training data unavailable: {message}")]
    DataUnavailable { message: String },

    /// A class has too few rows for covariance estimation.
    #[error("class {label} has fewer than 2 training samples; covariance is undefined")]
    InsufficientClassSamples { label: Label },
}

impl Error {
    /// Stable machine-readable kind string.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidSampleLength { .. } => "invalid_sample_length",
            Error::InvalidSamplePixelValue => "invalid_sample_pixel_value",
            Error::DataUnavailable { .. } => "data_unavailable",
            Error::InsufficientClassSamples { .. } => "insufficient_class_samples",
        }
    }

    /// Category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidSampleLength { .. } | Error::InvalidSamplePixelValue => {
                ErrorCategory::Validation
            }
            Error::DataUnavailable { .. } | Error::InsufficientClassSamples { .. } => {
                ErrorCategory::Data
            }
        }
    }

    /// True when the caller can correct the input and retry.
    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    /// Convenience constructor for corpus read/parse failures.
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Error::DataUnavailable {
            message: message.into(),
        }
    }

    /// Serialize to the structured JSON shape consumed by outer layers.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind(),
            "category": self.category(),
            "message": self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_flagged() {
        assert!(Error::InvalidSampleLength { actual: 0 }.is_validation());
        assert!(Error::InvalidSamplePixelValue.is_validation());
        assert!(!Error::data_unavailable("gone").is_validation());
        assert!(!Error::InsufficientClassSamples { label: 7 }.is_validation());
    }

    #[test]
    fn length_error_carries_actual_length() {
        let err = Error::InvalidSampleLength { actual: 42 };
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("784"));
    }

    #[test]
    fn json_shape_is_stable() {
        let value = Error::InvalidSamplePixelValue.to_json();
        assert_eq!(value["kind"], "invalid_sample_pixel_value");
        assert_eq!(value["category"], "validation");
        assert!(value["message"].is_string());
    }
}
