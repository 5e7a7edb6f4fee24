//! In-memory spatial light modulator.
//!
//! Stores the displayed phase, a fixed phase offset and the amplitude of the
//! illuminating source, and exposes them through [`SlmInterface`] so that a
//! simulated camera can image the resulting far-field.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use shared::image_size::PixelShape;
use shared::slm_interface::{validate_pattern, SlmError, SlmInterface, SlmResult};
use std::f64::consts::TAU;

/// Amplitude of the beam illuminating the SLM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AmplitudeProfile {
    /// Flat illumination of every pixel
    Uniform,
    /// Gaussian beam centered on the SLM, `exp(-(x/wx)^2 - (y/wy)^2)` with
    /// waists in SLM pixels
    Gaussian { waist_x: f64, waist_y: f64 },
}

impl AmplitudeProfile {
    /// Render the profile on an SLM of the given shape.
    pub fn render(&self, shape: PixelShape) -> SlmResult<Array2<f64>> {
        match *self {
            AmplitudeProfile::Uniform => Ok(Array2::ones(shape.dim())),
            AmplitudeProfile::Gaussian { waist_x, waist_y } => {
                if !(waist_x.is_finite() && waist_y.is_finite() && waist_x > 0.0 && waist_y > 0.0)
                {
                    return Err(SlmError::InvalidGeometry(format!(
                        "gaussian waist must be positive, got ({waist_x}, {waist_y})"
                    )));
                }
                let cx = (shape.width as f64 - 1.0) / 2.0;
                let cy = (shape.height as f64 - 1.0) / 2.0;
                Ok(Array2::from_shape_fn(shape.dim(), |(r, c)| {
                    let x = (c as f64 - cx) / waist_x;
                    let y = (r as f64 - cy) / waist_y;
                    (-(x * x) - y * y).exp()
                }))
            }
        }
    }
}

/// Simulated phase-only SLM.
#[derive(Debug, Clone)]
pub struct SimulatedSlm {
    name: String,
    shape: PixelShape,
    dx: f64,
    dy: f64,
    phase: Array2<f64>,
    phase_offset: Array2<f64>,
    amp_profile: Array2<f64>,
}

impl SimulatedSlm {
    /// Create an SLM showing a flat phase under uniform illumination.
    ///
    /// # Arguments
    /// * `shape` - Pixel grid of the modulator
    /// * `dx`, `dy` - Pixel pitch in wavelengths
    pub fn new(shape: PixelShape, dx: f64, dy: f64) -> SlmResult<Self> {
        if shape.is_empty() {
            return Err(SlmError::InvalidGeometry(format!(
                "SLM shape must be non-zero, got {shape}"
            )));
        }
        if !(dx.is_finite() && dy.is_finite() && dx > 0.0 && dy > 0.0) {
            return Err(SlmError::InvalidGeometry(format!(
                "pixel pitch must be positive, got dx={dx}, dy={dy}"
            )));
        }
        Ok(Self {
            name: "SimulatedSLM".to_string(),
            shape,
            dx,
            dy,
            phase: Array2::zeros(shape.dim()),
            phase_offset: Array2::zeros(shape.dim()),
            amp_profile: Array2::ones(shape.dim()),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_amplitude(mut self, profile: AmplitudeProfile) -> SlmResult<Self> {
        self.amp_profile = profile.render(self.shape)?;
        Ok(self)
    }

    /// Display a phase pattern (radians). Values are wrapped into `[0, 2pi)`.
    pub fn write_phase(&mut self, phase: &Array2<f64>) -> SlmResult<()> {
        validate_pattern(self.shape, phase, "phase")?;
        self.phase = phase.mapv(|p| p.rem_euclid(TAU));
        Ok(())
    }

    /// Replace the fixed phase added to every displayed pattern.
    pub fn set_phase_offset(&mut self, offset: Array2<f64>) -> SlmResult<()> {
        validate_pattern(self.shape, &offset, "phase offset")?;
        self.phase_offset = offset;
        Ok(())
    }

    /// Replace the source amplitude with an arbitrary non-negative pattern.
    pub fn set_amp_profile(&mut self, amp: Array2<f64>) -> SlmResult<()> {
        validate_pattern(self.shape, &amp, "amplitude")?;
        if amp.iter().any(|&a| a < 0.0) {
            return Err(SlmError::InvalidGeometry(
                "amplitude must be non-negative".to_string(),
            ));
        }
        self.amp_profile = amp;
        Ok(())
    }
}

impl SlmInterface for SimulatedSlm {
    fn shape(&self) -> PixelShape {
        self.shape
    }

    fn dx(&self) -> f64 {
        self.dx
    }

    fn dy(&self) -> f64 {
        self.dy
    }

    fn phase(&self) -> &Array2<f64> {
        &self.phase
    }

    fn phase_offset(&self) -> &Array2<f64> {
        &self.phase_offset
    }

    fn amp_profile(&self) -> &Array2<f64> {
        &self.amp_profile
    }

    fn name(&self) -> &str {
        &self.name
    }
}
