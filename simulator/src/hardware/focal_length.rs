//! Effective focal length of the SLM-to-camera optical train.
//!
//! The far-field of an SLM with pitch `d` (in wavelengths) covers normalized
//! angles `[-1/(2d), 1/(2d))`. A camera pixel at grid coordinate `x` samples
//! angle `x / f_eff`, so every pixel stays inside the accessible range only if
//! `f_eff >= 2 * max|x| * d` on both axes.

use crate::config::ConfigError;
use crate::hardware::camera_grid::CameraGrid;

/// Outcome of focal length resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFocalLength {
    /// Focal length adopted by the camera, pixels per radian
    pub f_eff: f64,
    /// Smallest admissible focal length for this grid
    pub f_min: f64,
    /// True if no focal length was requested and `f_min` was adopted
    pub defaulted: bool,
}

/// Smallest focal length keeping every grid point inside the SLM's k-space.
pub fn minimum_focal_length(grid: &CameraGrid, dx: f64, dy: f64) -> f64 {
    2.0 * (grid.max_abs_x() * dx).max(grid.max_abs_y() * dy)
}

/// Validate a requested focal length against `f_min`, or adopt `f_min`.
///
/// The boundary is inclusive: requesting exactly `f_min` succeeds.
pub fn resolve_focal_length(
    requested: Option<f64>,
    f_min: f64,
) -> Result<ResolvedFocalLength, ConfigError> {
    match requested {
        None => {
            if !f_min.is_finite() || f_min <= 0.0 {
                return Err(ConfigError::InvalidFocalLength(f_min));
            }
            Ok(ResolvedFocalLength {
                f_eff: f_min,
                f_min,
                defaulted: true,
            })
        }
        Some(f_eff) if !f_eff.is_finite() || f_eff <= 0.0 => {
            Err(ConfigError::InvalidFocalLength(f_eff))
        }
        Some(f_eff) if f_eff < f_min => Err(ConfigError::FocalLengthTooShort { f_eff, f_min }),
        Some(f_eff) => Ok(ResolvedFocalLength {
            f_eff,
            f_min,
            defaulted: false,
        }),
    }
}
