//! Camera abstraction layer
//!
//! Provides a unified interface for camera operations so that SLM control
//! code can be exercised against a simulated camera (for testing) or a real
//! device (for production) without changes.

pub mod mock;

use crate::image_size::PixelShape;
use ndarray::Array2;
use std::error::Error;
use std::fmt;

/// Error type for camera operations
#[derive(Debug)]
pub enum CameraError {
    /// Hardware communication error (for simulated cameras: the backing device)
    HardwareError(String),
    /// Frame capture error
    CaptureError(String),
    /// Configuration error
    ConfigError(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CameraError::HardwareError(msg) => write!(f, "Hardware error: {msg}"),
            CameraError::CaptureError(msg) => write!(f, "Capture error: {msg}"),
            CameraError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl Error for CameraError {}

/// Result type for camera operations
pub type CameraResult<T> = Result<T, CameraError>;

/// Trait for unified camera interface
///
/// Images are returned as floating point intensity arrays of shape
/// `(height, width)`. Exposure is a unitless digital gain applied to the
/// captured intensity.
pub trait CameraInterface: Send + Sync {
    /// Drain any frames buffered by the device.
    ///
    /// Devices without a frame buffer implement this as a no-op.
    fn flush(&mut self) -> CameraResult<()>;

    /// Set exposure (digital gain)
    ///
    /// # Arguments
    /// * `exposure` - Gain applied to every captured frame; must be finite and non-negative
    fn set_exposure(&mut self, exposure: f64) -> CameraResult<()>;

    /// Get current exposure (digital gain)
    fn get_exposure(&self) -> f64;

    /// Capture a single image
    ///
    /// # Arguments
    /// * `plot` - Additionally render the image for inspection. Rendering is a
    ///   side effect only and never alters the returned array.
    ///
    /// # Returns
    /// * `Ok(image)` with shape `(height, width)` of [`CameraInterface::shape`]
    /// * `Err(CameraError)` if capture fails
    fn get_image(&mut self, plot: bool) -> CameraResult<Array2<f64>>;

    /// Sensor dimensions of captured images
    fn shape(&self) -> PixelShape;

    /// Get camera name/identifier
    fn name(&self) -> &str;
}

impl CameraInterface for Box<dyn CameraInterface> {
    fn flush(&mut self) -> CameraResult<()> {
        (**self).flush()
    }

    fn set_exposure(&mut self, exposure: f64) -> CameraResult<()> {
        (**self).set_exposure(exposure)
    }

    fn get_exposure(&self) -> f64 {
        (**self).get_exposure()
    }

    fn get_image(&mut self, plot: bool) -> CameraResult<Array2<f64>> {
        (**self).get_image(plot)
    }

    fn shape(&self) -> PixelShape {
        (**self).shape()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Validate a requested exposure gain.
///
/// Gain has no upper bound (the simulated sensor has unlimited dynamic range)
/// but must be a finite, non-negative number.
pub fn validate_exposure(exposure: f64) -> CameraResult<()> {
    if !exposure.is_finite() || exposure < 0.0 {
        return Err(CameraError::ConfigError(format!(
            "exposure must be finite and non-negative, got {exposure}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock::MockCameraInterface;

    #[test]
    fn test_error_display() {
        let err = CameraError::ConfigError("bad f_eff".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad f_eff");

        let err = CameraError::CaptureError("no frame".to_string());
        assert_eq!(err.to_string(), "Capture error: no frame");
    }

    #[test]
    fn test_validate_exposure() {
        assert!(validate_exposure(0.0).is_ok());
        assert!(validate_exposure(1.0e9).is_ok());
        assert!(validate_exposure(-0.5).is_err());
        assert!(validate_exposure(f64::NAN).is_err());
        assert!(validate_exposure(f64::INFINITY).is_err());
    }

    #[test]
    fn test_boxed_camera_forwards() {
        let shape = PixelShape::new(4, 3);
        let mut camera: Box<dyn CameraInterface> =
            Box::new(MockCameraInterface::new_zeros(shape));

        camera.set_exposure(2.5).unwrap();
        assert_eq!(camera.get_exposure(), 2.5);
        assert_eq!(camera.shape(), shape);
        assert_eq!(camera.name(), "MockCamera");
        assert!(camera.flush().is_ok());

        let image = camera.get_image(false).unwrap();
        assert_eq!(image.dim(), (3, 4));
    }
}
