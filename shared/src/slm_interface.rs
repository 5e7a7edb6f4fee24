//! Spatial light modulator abstraction
//!
//! A phase-only SLM is described by its pixel grid, its pixel pitch, the phase
//! pattern currently displayed and the amplitude profile of the illuminating
//! source. Simulated cameras read this state to compute the far-field that a
//! real camera behind the Fourier lens would record.

use crate::image_size::PixelShape;
use ndarray::Array2;
use thiserror::Error;

/// Errors raised when configuring or writing to an SLM
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SlmError {
    #[error("pattern shape {actual:?} does not match SLM shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("{0} contains NaN or infinite values")]
    NonFinite(&'static str),
    #[error("invalid SLM geometry: {0}")]
    InvalidGeometry(String),
}

/// Result type for SLM operations
pub type SlmResult<T> = Result<T, SlmError>;

/// Read access to the state of an SLM.
///
/// Pitches are expressed in wavelengths so that far-field coordinates come
/// out in normalized angle (k-space) units.
pub trait SlmInterface: Send + Sync {
    /// Modulator dimensions
    fn shape(&self) -> PixelShape;

    /// Pixel pitch along x (columns), in wavelengths
    fn dx(&self) -> f64;

    /// Pixel pitch along y (rows), in wavelengths
    fn dy(&self) -> f64;

    /// Phase currently displayed, radians, shape `(height, width)`
    fn phase(&self) -> &Array2<f64>;

    /// Fixed phase added to every displayed pattern (flatness correction,
    /// simulated aberration), radians
    fn phase_offset(&self) -> &Array2<f64>;

    /// Amplitude of the source illuminating the SLM
    fn amp_profile(&self) -> &Array2<f64>;

    /// Device name
    fn name(&self) -> &str;

    /// Phase seen by the optical train: displayed phase plus the fixed offset
    fn total_phase(&self) -> Array2<f64> {
        self.phase() + self.phase_offset()
    }
}

/// Check that a pattern matches the SLM shape and holds only finite values.
pub fn validate_pattern(
    shape: PixelShape,
    pattern: &Array2<f64>,
    what: &'static str,
) -> SlmResult<()> {
    if pattern.dim() != shape.dim() {
        return Err(SlmError::ShapeMismatch {
            expected: shape.dim(),
            actual: pattern.dim(),
        });
    }
    if !pattern.iter().all(|v| v.is_finite()) {
        return Err(SlmError::NonFinite(what));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pattern_shape() {
        let shape = PixelShape::new(4, 2);
        assert!(validate_pattern(shape, &Array2::zeros((2, 4)), "phase").is_ok());

        let err = validate_pattern(shape, &Array2::zeros((4, 2)), "phase").unwrap_err();
        assert_eq!(
            err,
            SlmError::ShapeMismatch {
                expected: (2, 4),
                actual: (4, 2)
            }
        );
    }

    #[test]
    fn test_validate_pattern_non_finite() {
        let shape = PixelShape::new(2, 2);
        let mut pattern = Array2::zeros((2, 2));
        pattern[[1, 0]] = f64::NAN;
        let err = validate_pattern(shape, &pattern, "phase offset").unwrap_err();
        assert_eq!(err.to_string(), "phase offset contains NaN or infinite values");
    }
}
