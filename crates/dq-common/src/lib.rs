//! digit-qda common types and errors.
//!
//! This crate provides the foundational pieces shared across dq-core
//! modules:
//! - The validated [`Sample`] type and its dimension/range constants
//! - The [`Label`] alias for class identifiers
//! - The structured [`Error`] taxonomy

pub mod error;
pub mod sample;

pub use error::{Error, ErrorCategory, Result};
pub use sample::{validate_pixels, Label, Sample, PIXEL_MAX, PIXEL_MIN, SAMPLE_DIM};
