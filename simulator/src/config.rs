//! Simulated camera configuration.
//!
//! A [`SimulatedCameraConfig`] holds every option recognised when building a
//! [`SimulatedCamera`](crate::hardware::simulated_camera::SimulatedCamera). It
//! can be assembled in code with the `with_*` builders or loaded from JSON.

use crate::holography::{HologramError, PaddingOptions};
use serde::{Deserialize, Serialize};
use shared::camera_interface::CameraError;
use shared::image_size::PixelShape;
use shared::slm_interface::SlmError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while configuring a simulated camera.
///
/// All of these are fatal to construction: no camera is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "camera extends beyond the SLM's accessible Fourier space: \
         f_eff = {f_eff} pix/rad is below the minimum {f_min} pix/rad"
    )]
    FocalLengthTooShort { f_eff: f64, f_min: f64 },
    #[error("effective focal length must be finite and positive, got {0}")]
    InvalidFocalLength(f64),
    #[error("unsupported basis '{0}' (supported: \"ij\")")]
    UnsupportedBasis(String),
    #[error("camera resolution must be non-zero, got {0}")]
    InvalidResolution(PixelShape),
    #[error("{0} must be finite")]
    NonFiniteParameter(&'static str),
    #[error("exposure must be finite and non-negative, got {0}")]
    InvalidExposure(f64),
    #[error("SLM unavailable: {0}")]
    SlmUnavailable(String),
    #[error(transparent)]
    Slm(#[from] SlmError),
    #[error(transparent)]
    Hologram(#[from] HologramError),
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for CameraError {
    fn from(err: ConfigError) -> Self {
        CameraError::ConfigError(err.to_string())
    }
}

/// Units of `f_eff` and `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Camera pixels; `f_eff` in pixels per radian of normalized angle
    Ij,
}

impl FromStr for Basis {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ij" => Ok(Basis::Ij),
            other => Err(ConfigError::UnsupportedBasis(other.to_string())),
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Ij => write!(f, "ij"),
        }
    }
}

fn default_basis() -> String {
    Basis::Ij.to_string()
}

fn default_exposure() -> f64 {
    1.0
}

fn default_plot_path() -> PathBuf {
    PathBuf::from("test_output/simulated_camera.png")
}

/// Options for constructing a simulated camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedCameraConfig {
    /// Camera pixel grid; defaults to the SLM shape
    #[serde(default)]
    pub resolution: Option<PixelShape>,
    /// Effective focal length in pixels per radian; defaults to the minimum
    /// that keeps the camera inside the SLM's accessible k-space
    #[serde(default)]
    pub f_eff: Option<f64>,
    /// Counter-clockwise rotation of the camera relative to the SLM, radians
    #[serde(default)]
    pub theta: f64,
    /// Lateral displacement of the camera center, in `basis` units
    #[serde(default)]
    pub offset: Option<(f64, f64)>,
    /// Units of `f_eff` and `offset`; only `"ij"` is supported
    #[serde(default = "default_basis")]
    pub basis: String,
    /// Rules for sizing the FFT domain
    #[serde(default)]
    pub padding: PaddingOptions,
    /// Initial digital gain
    #[serde(default = "default_exposure")]
    pub exposure: f64,
    /// Resample through the interpolation path even when a direct crop would do
    #[serde(default)]
    pub force_interpolation: bool,
    /// Where `get_image(true)` writes its rendering
    #[serde(default = "default_plot_path")]
    pub plot_path: PathBuf,
}

impl Default for SimulatedCameraConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            f_eff: None,
            theta: 0.0,
            offset: None,
            basis: default_basis(),
            padding: PaddingOptions::default(),
            exposure: default_exposure(),
            force_interpolation: false,
            plot_path: default_plot_path(),
        }
    }
}

impl SimulatedCameraConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, resolution: PixelShape) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_f_eff(mut self, f_eff: f64) -> Self {
        self.f_eff = Some(f_eff);
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_offset(mut self, offset: (f64, f64)) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_basis(mut self, basis: impl Into<String>) -> Self {
        self.basis = basis.into();
        self
    }

    pub fn with_padding(mut self, padding: PaddingOptions) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_exposure(mut self, exposure: f64) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn with_forced_interpolation(mut self, force: bool) -> Self {
        self.force_interpolation = force;
        self
    }

    pub fn with_plot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.plot_path = path.into();
        self
    }

    /// Parsed `basis`
    pub fn basis(&self) -> Result<Basis, ConfigError> {
        self.basis.parse()
    }

    /// Check the scalar options that do not depend on the SLM.
    pub fn validate(&self) -> Result<Basis, ConfigError> {
        let basis = self.basis()?;
        if let Some(resolution) = self.resolution {
            if resolution.is_empty() {
                return Err(ConfigError::InvalidResolution(resolution));
            }
        }
        if !self.theta.is_finite() {
            return Err(ConfigError::NonFiniteParameter("theta"));
        }
        if let Some((ox, oy)) = self.offset {
            if !(ox.is_finite() && oy.is_finite()) {
                return Err(ConfigError::NonFiniteParameter("offset"));
            }
        }
        if let Some(f_eff) = self.f_eff {
            if !f_eff.is_finite() || f_eff <= 0.0 {
                return Err(ConfigError::InvalidFocalLength(f_eff));
            }
        }
        if !self.exposure.is_finite() || self.exposure < 0.0 {
            return Err(ConfigError::InvalidExposure(self.exposure));
        }
        Ok(basis)
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON, creating parent directories.
    pub fn save_json_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
