//! Far-field computation for a phase-only SLM.
//!
//! The SLM near field `amp * exp(i * phase)` is zero-padded into a larger
//! computational domain and Fourier transformed. Padding does not add
//! information but refines the angular sampling of the far-field: for a domain
//! of `N` pixels of pitch `d` (in wavelengths) neighbouring far-field bins are
//! separated by `1 / (N * d)` in normalized k-space. [`calculate_padded_shape`]
//! chooses `N` so that this step meets a requested precision.

use crate::algo::fft2::{fftshift, ifftshift, Fft2Plan, FftShapeError};
use crate::algo::padding::{pad, PaddingError};
use ndarray::{Array2, Zip};
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};
use shared::image_size::PixelShape;
use thiserror::Error;

/// Tolerance used when deciding whether a computed domain size is integral
const INTEGRAL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HologramError {
    #[error("precision must be finite and positive, got {0}")]
    InvalidPrecision(f64),
    #[error("pixel pitch must be finite and positive, got dx={dx}, dy={dy}")]
    InvalidPitch { dx: f64, dy: f64 },
    #[error("padded shape {required} exceeds the limit of {max_dim} pixels per axis")]
    PaddedShapeTooLarge { required: PixelShape, max_dim: usize },
    #[error("amplitude shape {amp:?} and phase shape {phase:?} differ")]
    ShapeMismatch {
        amp: (usize, usize),
        phase: (usize, usize),
    },
    #[error("{0} contains NaN or infinite values")]
    NonFinite(&'static str),
    #[error(transparent)]
    Padding(#[from] PaddingError),
    #[error(transparent)]
    Fft(#[from] FftShapeError),
}

/// Rules for growing the computational domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingOptions {
    /// Round each axis up to a power of two (fastest FFT sizes)
    pub power_of_two: bool,
    /// Use the larger axis for both dimensions
    pub square: bool,
    /// Refuse domains larger than this many pixels per axis
    pub max_dim: usize,
}

impl Default for PaddingOptions {
    fn default() -> Self {
        Self {
            power_of_two: true,
            square: true,
            max_dim: 8192,
        }
    }
}

/// Round up, treating values within floating point noise of an integer as that integer
fn ceil_tolerant(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= INTEGRAL_TOLERANCE * nearest.abs().max(1.0) {
        nearest
    } else {
        value.ceil()
    }
}

/// Compute the padded domain needed to sample the far-field with a given
/// angular precision.
///
/// # Arguments
/// * `slm_shape` - Native SLM dimensions; the result is never smaller
/// * `dx`, `dy` - SLM pixel pitch in wavelengths
/// * `precision` - Required far-field sampling step in normalized k-space
///   (for a simulated camera, `1 / f_eff`)
/// * `options` - Rounding rules
///
/// # Returns
/// The padded shape. Smaller `precision` (finer sampling) never produces a
/// smaller shape.
pub fn calculate_padded_shape(
    slm_shape: PixelShape,
    dx: f64,
    dy: f64,
    precision: f64,
    options: &PaddingOptions,
) -> Result<PixelShape, HologramError> {
    if !precision.is_finite() || precision <= 0.0 {
        return Err(HologramError::InvalidPrecision(precision));
    }
    if !(dx.is_finite() && dy.is_finite() && dx > 0.0 && dy > 0.0) {
        return Err(HologramError::InvalidPitch { dx, dy });
    }

    let pitch = dx.min(dy);
    let pixels = ceil_tolerant(1.0 / (precision * pitch));
    if pixels > options.max_dim as f64 {
        let required = PixelShape::new(pixels as usize, pixels as usize);
        return Err(HologramError::PaddedShapeTooLarge {
            required,
            max_dim: options.max_dim,
        });
    }
    let pixels = pixels as usize;

    let mut width = slm_shape.width.max(pixels);
    let mut height = slm_shape.height.max(pixels);
    if options.power_of_two {
        width = width.next_power_of_two();
        height = height.next_power_of_two();
    }
    if options.square {
        let largest = width.max(height);
        width = largest;
        height = largest;
    }

    let shape = PixelShape::new(width, height);
    if shape.max_dim() > options.max_dim {
        return Err(HologramError::PaddedShapeTooLarge {
            required: shape,
            max_dim: options.max_dim,
        });
    }
    Ok(shape)
}

/// A far-field engine: holds the SLM near field and produces its far-field.
pub trait FarFieldEngine: Send + Sync {
    /// Shape of the far-field arrays produced by [`FarFieldEngine::extract_farfield`]
    fn padded_shape(&self) -> PixelShape;

    /// Replace the near-field phase (radians, native SLM shape)
    fn reset_phase(&mut self, phase: &Array2<f64>) -> Result<(), HologramError>;

    /// Complex far-field of the current near field, zero order at
    /// `(rows / 2, cols / 2)`
    fn extract_farfield(&mut self) -> Result<Array2<Complex64>, HologramError>;
}

/// FFT-based far-field engine.
///
/// Computes `fftshift(fft2(ifftshift(pad(amp * exp(i * phase)))))` with
/// orthonormal scaling, so the total far-field power equals the total
/// near-field power `sum(amp^2)`.
#[derive(Debug, Clone)]
pub struct FftHologram {
    padded_shape: PixelShape,
    amp: Array2<f64>,
    phase: Array2<f64>,
    plan: Fft2Plan,
}

impl FftHologram {
    /// Create an engine for the given padded domain.
    ///
    /// Plans the FFT up front; this is the expensive step and should be done
    /// once per configuration.
    pub fn new(
        padded_shape: PixelShape,
        amp: Array2<f64>,
        phase: Array2<f64>,
    ) -> Result<Self, HologramError> {
        if amp.dim() != phase.dim() {
            return Err(HologramError::ShapeMismatch {
                amp: amp.dim(),
                phase: phase.dim(),
            });
        }
        if !amp.iter().all(|v| v.is_finite()) {
            return Err(HologramError::NonFinite("amplitude"));
        }
        if !phase.iter().all(|v| v.is_finite()) {
            return Err(HologramError::NonFinite("phase"));
        }
        let (rows, cols) = padded_shape.dim();
        if rows < amp.nrows() || cols < amp.ncols() {
            return Err(PaddingError::PadShrinks {
                from: amp.dim(),
                to: padded_shape.dim(),
            }
            .into());
        }

        let plan = Fft2Plan::new(rows, cols);
        Ok(Self {
            padded_shape,
            amp,
            phase,
            plan,
        })
    }

    /// Near-field amplitude (native SLM shape)
    pub fn amp(&self) -> &Array2<f64> {
        &self.amp
    }

    /// Near-field phase (native SLM shape)
    pub fn phase(&self) -> &Array2<f64> {
        &self.phase
    }

    fn nearfield(&self) -> Array2<Complex64> {
        let mut field = Array2::from_elem(self.amp.dim(), Complex64::new(0.0, 0.0));
        Zip::from(&mut field)
            .and(&self.amp)
            .and(&self.phase)
            .for_each(|f, &a, &p| *f = Complex64::from_polar(a, p));
        field
    }
}

impl FarFieldEngine for FftHologram {
    fn padded_shape(&self) -> PixelShape {
        self.padded_shape
    }

    fn reset_phase(&mut self, phase: &Array2<f64>) -> Result<(), HologramError> {
        if phase.dim() != self.amp.dim() {
            return Err(HologramError::ShapeMismatch {
                amp: self.amp.dim(),
                phase: phase.dim(),
            });
        }
        if !phase.iter().all(|v| v.is_finite()) {
            return Err(HologramError::NonFinite("phase"));
        }
        self.phase.assign(phase);
        Ok(())
    }

    fn extract_farfield(&mut self) -> Result<Array2<Complex64>, HologramError> {
        let padded = pad(&self.nearfield(), self.padded_shape.dim())?;
        let mut field = ifftshift(&padded);
        self.plan.process(&mut field)?;
        Ok(fftshift(&field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn square(n: usize) -> PixelShape {
        PixelShape::new(n, n)
    }

    #[test]
    fn test_padded_shape_matches_slm_at_native_precision() {
        let shape =
            calculate_padded_shape(square(512), 1.0, 1.0, 1.0 / 512.0, &PaddingOptions::default())
                .unwrap();
        assert_eq!(shape, square(512));
    }

    #[test]
    fn test_padded_shape_grows_with_precision() {
        let opts = PaddingOptions::default();
        let shape = calculate_padded_shape(square(256), 1.0, 1.0, 1.0 / 700.0, &opts).unwrap();
        assert_eq!(shape, square(1024));
    }

    #[test]
    fn test_padded_shape_exact_without_rounding() {
        let opts = PaddingOptions {
            power_of_two: false,
            square: false,
            ..Default::default()
        };
        // 1 / (1/300) is not exactly 300 in floating point
        let shape = calculate_padded_shape(PixelShape::new(300, 200), 1.0, 1.0, 1.0 / 300.0, &opts)
            .unwrap();
        assert_eq!(shape, PixelShape::new(300, 300));

        let shape = calculate_padded_shape(PixelShape::new(300, 200), 2.0, 2.0, 1.0 / 300.0, &opts)
            .unwrap();
        assert_eq!(shape, PixelShape::new(300, 200));
    }

    #[test]
    fn test_padded_shape_square_option() {
        let slm = PixelShape::new(1920, 1080);
        let square_opts = PaddingOptions::default();
        let shape = calculate_padded_shape(slm, 1.0, 1.0, 1.0 / 1920.0, &square_opts).unwrap();
        assert_eq!(shape, square(2048));

        let rect_opts = PaddingOptions {
            square: false,
            ..Default::default()
        };
        let shape = calculate_padded_shape(slm, 1.0, 1.0, 1.0 / 1000.0, &rect_opts).unwrap();
        assert_eq!(shape, PixelShape::new(2048, 2048));
        let shape = calculate_padded_shape(slm, 1.0, 1.0, 1.0 / 10.0, &rect_opts).unwrap();
        assert_eq!(shape, PixelShape::new(2048, 2048));

        let no_round = PaddingOptions {
            square: false,
            power_of_two: false,
            ..Default::default()
        };
        let shape = calculate_padded_shape(slm, 1.0, 1.0, 1.0 / 10.0, &no_round).unwrap();
        assert_eq!(shape, slm);
    }

    #[test]
    fn test_padded_shape_monotonic_in_focal_length() {
        let opts = PaddingOptions {
            power_of_two: false,
            ..Default::default()
        };
        let mut previous = 0;
        for f_eff in (1..200).map(|i| i as f64 * 13.7) {
            let shape = calculate_padded_shape(square(64), 0.8, 1.2, 1.0 / f_eff, &opts).unwrap();
            assert!(shape.width >= previous);
            previous = shape.width;
        }
    }

    #[test]
    fn test_padded_shape_rejects_bad_inputs() {
        let opts = PaddingOptions::default();
        assert!(matches!(
            calculate_padded_shape(square(8), 1.0, 1.0, 0.0, &opts),
            Err(HologramError::InvalidPrecision(_))
        ));
        assert!(matches!(
            calculate_padded_shape(square(8), 1.0, 1.0, f64::NAN, &opts),
            Err(HologramError::InvalidPrecision(_))
        ));
        assert!(matches!(
            calculate_padded_shape(square(8), 0.0, 1.0, 0.1, &opts),
            Err(HologramError::InvalidPitch { .. })
        ));
        assert!(matches!(
            calculate_padded_shape(square(8), 1.0, 1.0, 1e-9, &opts),
            Err(HologramError::PaddedShapeTooLarge { .. })
        ));
    }

    #[test]
    fn test_flat_phase_focuses_to_zero_order() {
        let amp = Array2::ones((16, 16));
        let phase = Array2::zeros((16, 16));
        let mut hologram = FftHologram::new(square(32), amp, phase).unwrap();
        let ff = hologram.extract_farfield().unwrap();

        assert_eq!(ff.dim(), (32, 32));
        // 256 unit amplitudes, orthonormal over 1024 samples
        assert_relative_eq!(ff[[16, 16]].norm_sqr(), 256.0 * 256.0 / 1024.0, epsilon = 1e-9);
    }

    #[test]
    fn test_power_conserved() {
        let amp = Array2::from_shape_fn((12, 10), |(r, c)| 0.5 + (r + c) as f64 * 0.05);
        let phase = Array2::from_shape_fn((12, 10), |(r, c)| (r * c) as f64 * 0.3);
        let total: f64 = amp.iter().map(|a| a * a).sum();
        let mut hologram = FftHologram::new(PixelShape::new(20, 24), amp, phase).unwrap();
        let power: f64 = hologram
            .extract_farfield()
            .unwrap()
            .iter()
            .map(|v| v.norm_sqr())
            .sum();
        assert_relative_eq!(power, total, max_relative = 1e-10);
    }

    #[test]
    fn test_reset_phase_steers_spot() {
        let n = 32;
        let amp = Array2::ones((n, n));
        let mut hologram = FftHologram::new(square(n), amp, Array2::zeros((n, n))).unwrap();

        // Four cycles across the aperture along x moves the spot four bins right
        let blaze = Array2::from_shape_fn((n, n), |(_, c)| 2.0 * PI * 4.0 * c as f64 / n as f64);
        hologram.reset_phase(&blaze).unwrap();
        let intensity = hologram.extract_farfield().unwrap().mapv(|v| v.norm_sqr());

        let (peak, _) = intensity
            .indexed_iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        assert_eq!(peak, (n / 2, n / 2 + 4));
    }

    #[test]
    fn test_reset_phase_validates() {
        let mut hologram =
            FftHologram::new(square(8), Array2::ones((4, 4)), Array2::zeros((4, 4))).unwrap();
        assert!(matches!(
            hologram.reset_phase(&Array2::zeros((4, 5))),
            Err(HologramError::ShapeMismatch { .. })
        ));
        let mut bad = Array2::zeros((4, 4));
        bad[[0, 0]] = f64::INFINITY;
        assert!(matches!(
            hologram.reset_phase(&bad),
            Err(HologramError::NonFinite("phase"))
        ));
    }

    #[test]
    fn test_new_rejects_small_domain() {
        let err = FftHologram::new(square(4), Array2::ones((8, 8)), Array2::zeros((8, 8)));
        assert!(matches!(err, Err(HologramError::Padding(_))));
    }
}
