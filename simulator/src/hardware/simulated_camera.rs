//! Simulated camera imaging the far-field of an SLM.
//!
//! The camera sits in the Fourier plane of the SLM behind an optical train of
//! effective focal length `f_eff`, possibly rotated by `theta` and displaced
//! by `offset`. Construction resolves this geometry once:
//!
//! 1. the camera pixel grid is expressed in SLM far-field coordinates
//!    ([`CameraGrid`]),
//! 2. `f_eff` is checked against (or defaulted to) the smallest value keeping
//!    the grid inside the SLM's accessible k-space,
//! 3. the FFT domain is padded until its angular sampling resolves one camera
//!    pixel, and a persistent [`FftHologram`] is planned for that domain.
//!
//! Each captured frame then refreshes the hologram phase from the SLM,
//! computes the far-field intensity and projects it onto the camera pixels.
//! When camera and padded domain share a pixel grid one-to-one the projection
//! is a centered crop; otherwise every pixel samples the nearest far-field bin.
//!
//! The simulated sensor is perfect: no noise, no quantization and unlimited
//! dynamic range. Exposure is a plain digital gain.
//!
//! # Examples
//!
//! ```rust
//! use shared::camera_interface::CameraInterface;
//! use shared::image_size::PixelShape;
//! use slm_simulator::config::SimulatedCameraConfig;
//! use slm_simulator::hardware::{SimulatedCamera, SimulatedSlm};
//! use std::sync::{Arc, RwLock};
//!
//! let slm = SimulatedSlm::new(PixelShape::new(64, 64), 1.0, 1.0).unwrap();
//! let slm = Arc::new(RwLock::new(slm));
//!
//! let config = SimulatedCameraConfig::new().with_resolution(PixelShape::new(32, 32));
//! let mut camera = SimulatedCamera::new(Arc::clone(&slm), config).unwrap();
//!
//! let image = camera.get_image(false).unwrap();
//! assert_eq!(image.dim(), (32, 32));
//! ```

use crate::algo::backend::{ArrayBackend, DefaultBackend};
use crate::algo::padding::unpad;
use crate::config::{ConfigError, SimulatedCameraConfig};
use crate::hardware::camera_grid::{CameraGrid, GridTransform};
use crate::hardware::focal_length::{minimum_focal_length, resolve_focal_length};
use crate::holography::{calculate_padded_shape, FarFieldEngine, FftHologram};
use crate::image_proc::save_intensity_image;
use log::{debug, info, warn};
use ndarray::Array2;
use shared::camera_interface::{validate_exposure, CameraError, CameraInterface, CameraResult};
use shared::image_size::PixelShape;
use shared::slm_interface::SlmInterface;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Relative tolerance when deciding whether padded bins coincide with camera pixels
const ONE_TO_ONE_TOLERANCE: f64 = 1e-9;

/// How far-field intensity is projected onto camera pixels.
///
/// The mode is fixed at construction. Besides a resolution mismatch, a
/// rotation or an offset, the camera also interpolates when the padded FFT
/// domain does not map one bin to one camera pixel (`P * pitch != f_eff`), as
/// happens when power-of-two or square padding enlarges a native-resolution
/// domain. A 48x48 SLM padded to 64x64 therefore interpolates by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Centered crop of the padded far-field
    DirectCrop,
    /// Nearest-neighbour sampling at each pixel's far-field coordinate
    Interpolate,
}

/// Fractional index into the padded domain for every grid coordinate along one axis.
///
/// `index = P / (f_eff / pitch) * coordinate + floor(P / 2)`, the zero order
/// sitting where `fftshift` leaves it.
fn padded_indices(coordinates: &Array2<f64>, padded_len: usize, f_eff: f64, pitch: f64) -> Array2<f64> {
    let scale = padded_len as f64 / (f_eff / pitch);
    let zero_order = (padded_len / 2) as f64;
    coordinates.mapv(|v| scale * v + zero_order)
}

/// True if one padded far-field bin spans exactly one camera pixel on both axes
fn maps_one_to_one(padded_shape: PixelShape, dx: f64, dy: f64, f_eff: f64) -> bool {
    let x_scale = padded_shape.width as f64 * dx / f_eff;
    let y_scale = padded_shape.height as f64 * dy / f_eff;
    (x_scale - 1.0).abs() <= ONE_TO_ONE_TOLERANCE && (y_scale - 1.0).abs() <= ONE_TO_ONE_TOLERANCE
}

/// Camera whose images are the simulated far-field of an SLM.
///
/// The SLM is shared with whatever code drives it; the camera only takes read
/// locks, once at construction and once per captured frame. The hologram
/// engine is owned exclusively by the camera.
pub struct SimulatedCamera<S: SlmInterface, B: ArrayBackend = DefaultBackend> {
    slm: Arc<RwLock<S>>,
    name: String,
    resolution: PixelShape,
    slm_shape: PixelShape,
    dx: f64,
    dy: f64,
    grid: CameraGrid,
    f_eff: f64,
    f_min: f64,
    padded_shape: PixelShape,
    mode: SamplingMode,
    /// Padded-domain row index sampled by each camera pixel
    sample_rows: Array2<f64>,
    /// Padded-domain column index sampled by each camera pixel
    sample_cols: Array2<f64>,
    hologram: FftHologram,
    backend: B,
    exposure: f64,
    plot_path: PathBuf,
}

impl<S: SlmInterface> SimulatedCamera<S, DefaultBackend> {
    /// Create a camera on the default array backend.
    pub fn new(slm: Arc<RwLock<S>>, config: SimulatedCameraConfig) -> Result<Self, ConfigError> {
        Self::with_backend(slm, config, DefaultBackend::default())
    }
}

impl<S: SlmInterface, B: ArrayBackend> SimulatedCamera<S, B> {
    /// Create a camera running its per-frame array work on `backend`.
    ///
    /// # Errors
    /// * [`ConfigError::UnsupportedBasis`] for any basis other than `"ij"`
    /// * [`ConfigError::FocalLengthTooShort`] if the requested `f_eff` would
    ///   place camera pixels outside the SLM's accessible k-space
    /// * [`ConfigError::Hologram`] if the required FFT domain is too large
    /// * other [`ConfigError`] variants for malformed options
    pub fn with_backend(
        slm: Arc<RwLock<S>>,
        config: SimulatedCameraConfig,
        backend: B,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let guard = slm
            .read()
            .map_err(|e| ConfigError::SlmUnavailable(e.to_string()))?;
        let slm_shape = guard.shape();
        let (dx, dy) = (guard.dx(), guard.dy());
        let resolution = config.resolution.unwrap_or(slm_shape);

        let transform = GridTransform::new(config.theta, config.offset);
        let grid = CameraGrid::new(resolution, &transform);

        let f_min = minimum_focal_length(&grid, dx, dy);
        let resolved = resolve_focal_length(config.f_eff, f_min)?;
        let f_eff = resolved.f_eff;
        if resolved.defaulted {
            info!(
                "Setting f_eff = f_min = {f_eff:.2} pix/rad to place camera within accessible SLM k-space"
            );
        }

        let padded_shape = calculate_padded_shape(slm_shape, dx, dy, 1.0 / f_eff, &config.padding)?;
        info!("Padded SLM k-space shape set to {padded_shape} to achieve required imaging resolution");

        let needs_resampling = resolution != slm_shape
            || !transform.is_identity()
            || config.force_interpolation;
        let mode = if needs_resampling {
            SamplingMode::Interpolate
        } else if !maps_one_to_one(padded_shape, dx, dy, f_eff) {
            debug!(
                "Padded domain {padded_shape} does not map one-to-one onto camera pixels at f_eff = {f_eff}; interpolating"
            );
            SamplingMode::Interpolate
        } else {
            SamplingMode::DirectCrop
        };

        let hologram = FftHologram::new(
            padded_shape,
            guard.amp_profile().clone(),
            guard.total_phase(),
        )?;
        let name = format!("SimulatedCamera({})", guard.name());
        drop(guard);

        let sample_rows = padded_indices(grid.y(), padded_shape.height, f_eff, dy);
        let sample_cols = padded_indices(grid.x(), padded_shape.width, f_eff, dx);

        debug!(
            "{name}: resolution {resolution}, theta {}, offset {:?}, mode {mode:?}, backend {}",
            transform.theta,
            transform.offset,
            backend.name()
        );

        Ok(Self {
            slm,
            name,
            resolution,
            slm_shape,
            dx,
            dy,
            grid,
            f_eff,
            f_min,
            padded_shape,
            mode,
            sample_rows,
            sample_cols,
            hologram,
            backend,
            exposure: config.exposure,
            plot_path: config.plot_path,
        })
    }

    /// Camera pixel grid in SLM far-field coordinates
    pub fn grid(&self) -> &CameraGrid {
        &self.grid
    }

    /// Effective focal length in use, pixels per radian
    pub fn f_eff(&self) -> f64 {
        self.f_eff
    }

    /// Smallest admissible focal length for this camera placement
    pub fn f_min(&self) -> f64 {
        self.f_min
    }

    /// FFT domain used for every far-field computation
    pub fn padded_shape(&self) -> PixelShape {
        self.padded_shape
    }

    pub fn sampling_mode(&self) -> SamplingMode {
        self.mode
    }

    /// True if frames are resampled rather than cropped
    pub fn is_interpolating(&self) -> bool {
        self.mode == SamplingMode::Interpolate
    }

    /// SLM pixel pitch `(dx, dy)` captured at construction
    pub fn slm_pitch(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shared handle to the imaged SLM
    pub fn slm(&self) -> &Arc<RwLock<S>> {
        &self.slm
    }

    pub fn plot_path(&self) -> &Path {
        &self.plot_path
    }

    pub fn set_plot_path(&mut self, path: impl Into<PathBuf>) {
        self.plot_path = path.into();
    }

    /// Far-field intensity over the whole padded domain for the current SLM
    /// phase, before projection onto the camera and before exposure gain.
    pub fn farfield_intensity(&mut self) -> CameraResult<Array2<f64>> {
        let phase = {
            let slm = self
                .slm
                .read()
                .map_err(|e| CameraError::HardwareError(format!("SLM lock poisoned: {e}")))?;
            if slm.shape() != self.slm_shape {
                return Err(CameraError::CaptureError(format!(
                    "SLM shape changed from {} to {} since the camera was configured",
                    self.slm_shape,
                    slm.shape()
                )));
            }
            slm.total_phase()
        };

        self.hologram
            .reset_phase(&phase)
            .map_err(|e| CameraError::CaptureError(e.to_string()))?;
        let farfield = self
            .hologram
            .extract_farfield()
            .map_err(|e| CameraError::CaptureError(e.to_string()))?;
        Ok(self.backend.intensity(&farfield))
    }

    /// Project padded-domain intensity onto camera pixels.
    fn project(&self, intensity: &Array2<f64>) -> CameraResult<Array2<f64>> {
        match self.mode {
            SamplingMode::DirectCrop => unpad(intensity, self.resolution.dim())
                .map_err(|e| CameraError::CaptureError(e.to_string())),
            SamplingMode::Interpolate => Ok(self.backend.sample_nearest(
                intensity,
                &self.sample_rows,
                &self.sample_cols,
            )),
        }
    }

    fn capture(&mut self) -> CameraResult<Array2<f64>> {
        let start = Instant::now();
        let intensity = self.farfield_intensity()?;
        let image = self.project(&intensity)?;
        let image = self.backend.scale(image, self.exposure);
        debug!(
            "{}: captured {} frame ({:?}) in {:?}",
            self.name,
            self.resolution,
            self.mode,
            start.elapsed()
        );
        Ok(image)
    }
}

impl<S: SlmInterface, B: ArrayBackend> CameraInterface for SimulatedCamera<S, B> {
    /// Nothing to drain; simulated frames are computed on demand.
    fn flush(&mut self) -> CameraResult<()> {
        Ok(())
    }

    fn set_exposure(&mut self, exposure: f64) -> CameraResult<()> {
        validate_exposure(exposure)?;
        self.exposure = exposure;
        Ok(())
    }

    fn get_exposure(&self) -> f64 {
        self.exposure
    }

    /// Compute the SLM far-field and sample it onto the camera pixels.
    ///
    /// With `plot` set, the frame is also written to [`SimulatedCamera::plot_path`].
    fn get_image(&mut self, plot: bool) -> CameraResult<Array2<f64>> {
        let image = self.capture()?;
        if plot {
            if let Err(e) = save_intensity_image(&image, &self.plot_path) {
                warn!(
                    "Failed to save simulated image {}: {}",
                    self.plot_path.display(),
                    e
                );
            }
        }
        Ok(image)
    }

    fn shape(&self) -> PixelShape {
        self.resolution
    }

    fn name(&self) -> &str {
        &self.name
    }
}
