//! The query sample type and its structural constraints.
//!
//! A [`Sample`] is an ordered sequence of exactly [`SAMPLE_DIM`] pixel
//! intensities in `[PIXEL_MIN, PIXEL_MAX]`, immutable once validated.
//! Validation order is part of the contract: length is checked before
//! pixel ranges, and a length failure short-circuits without inspecting
//! any pixel.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fixed feature dimensionality: a 28x28 grayscale image flattened.
pub const SAMPLE_DIM: usize = 784;

/// Minimum legal pixel intensity.
pub const PIXEL_MIN: f64 = 0.0;

/// Maximum legal pixel intensity.
pub const PIXEL_MAX: f64 = 255.0;

/// A class identifier.
///
/// The label set is whatever distinct values appear in the training
/// data; nothing in the core assumes ten classes or contiguity.
pub type Label = u32;

/// A validated query sample.
///
/// The only way to construct one is [`Sample::new`], which enforces the
/// structural contract, so every `Sample` in flight is known-good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Sample(Vec<f64>);

impl Sample {
    /// Validate and wrap a pixel vector.
    pub fn new(pixels: Vec<f64>) -> Result<Self> {
        validate_pixels(&pixels)?;
        Ok(Sample(pixels))
    }

    /// Borrow the pixel data.
    pub fn pixels(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for Sample {
    type Error = Error;

    fn try_from(pixels: Vec<f64>) -> Result<Self> {
        Sample::new(pixels)
    }
}

impl From<Sample> for Vec<f64> {
    fn from(sample: Sample) -> Self {
        sample.0
    }
}

impl std::ops::Deref for Sample {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// Check the structural and value constraints on raw pixel data.
///
/// Fails with `InvalidSampleLength` when the length is not
/// [`SAMPLE_DIM`], then with `InvalidSamplePixelValue` when any entry is
/// outside `[PIXEL_MIN, PIXEL_MAX]` or NaN.
pub fn validate_pixels(pixels: &[f64]) -> Result<()> {
    if pixels.len() != SAMPLE_DIM {
        return Err(Error::InvalidSampleLength {
            actual: pixels.len(),
        });
    }
    // NaN fails the range comparison, which is the rejection we want.
    if !pixels.iter().all(|&p| (PIXEL_MIN..=PIXEL_MAX).contains(&p)) {
        return Err(Error::InvalidSamplePixelValue);
    }
    Ok(())
}
