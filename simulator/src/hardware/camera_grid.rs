//! Camera pixel grid expressed in SLM optical-angle units.
//!
//! Each camera pixel is assigned the coordinate at which it samples the SLM
//! far-field. The grid starts as a centered pixel index grid, is rotated by
//! the camera's orientation, then translated by its lateral offset:
//!
//! ```text
//! [x']   [cos θ  -sin θ] [c - W/2]   [ox]
//! [y'] = [sin θ   cos θ] [r - H/2] + [oy]
//! ```
//!
//! Rotating the camera frame by `θ` relative to the SLM frame is the same as
//! applying the inverse rotation `R(-θ)` to SLM coordinates, written here as
//! the forward rotation of camera pixel positions.

use nalgebra::{Rotation2, Vector2};
use ndarray::Array2;
use shared::image_size::PixelShape;

/// Rotation and translation placing the camera in the SLM far-field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridTransform {
    /// Counter-clockwise rotation, radians
    pub theta: f64,
    /// Lateral displacement of the camera center
    pub offset: (f64, f64),
}

impl GridTransform {
    pub fn new(theta: f64, offset: Option<(f64, f64)>) -> Self {
        Self {
            theta,
            offset: offset.unwrap_or((0.0, 0.0)),
        }
    }

    pub fn is_rotated(&self) -> bool {
        self.theta != 0.0
    }

    pub fn is_offset(&self) -> bool {
        self.offset != (0.0, 0.0)
    }

    /// True when the transform leaves every pixel where it is
    pub fn is_identity(&self) -> bool {
        !self.is_rotated() && !self.is_offset()
    }
}

/// Per-pixel far-field coordinates of a camera.
///
/// `x` and `y` both have shape `(height, width)` of the camera resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraGrid {
    x: Array2<f64>,
    y: Array2<f64>,
}

impl CameraGrid {
    /// Untransformed grid: pixel `(r, c)` at `(c - W/2, r - H/2)`, halves
    /// rounded down.
    ///
    /// Even sizes span `[-W/2, W/2)`, odd sizes `[-(W-1)/2, (W-1)/2]`. Either
    /// way the center pixel `(H/2, W/2)` sits exactly at the origin, matching
    /// the zero order of a centered FFT.
    pub fn centered(resolution: PixelShape) -> Self {
        let (cx, cy) = resolution.center();
        Self {
            x: Array2::from_shape_fn(resolution.dim(), |(_, c)| c as f64 - cx),
            y: Array2::from_shape_fn(resolution.dim(), |(r, _)| r as f64 - cy),
        }
    }

    /// Grid for a camera of `resolution` placed by `transform`.
    pub fn new(resolution: PixelShape, transform: &GridTransform) -> Self {
        let mut grid = Self::centered(resolution);
        if transform.is_rotated() {
            grid = grid.rotated(transform.theta);
        }
        if transform.is_offset() {
            grid = grid.translated(transform.offset);
        }
        grid
    }

    /// Rotate every point counter-clockwise by `theta` about the origin.
    pub fn rotated(self, theta: f64) -> Self {
        let rotation = Rotation2::new(theta);
        let mut x = self.x;
        let mut y = self.y;
        ndarray::Zip::from(&mut x).and(&mut y).for_each(|px, py| {
            let rotated = rotation * Vector2::new(*px, *py);
            *px = rotated.x;
            *py = rotated.y;
        });
        Self { x, y }
    }

    /// Shift every point by `(ox, oy)`.
    pub fn translated(self, offset: (f64, f64)) -> Self {
        Self {
            x: self.x + offset.0,
            y: self.y + offset.1,
        }
    }

    /// Column coordinate of every pixel
    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    /// Row coordinate of every pixel
    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    /// Camera resolution covered by the grid
    pub fn shape(&self) -> PixelShape {
        PixelShape::from_dim(self.x.dim())
    }

    /// Largest `|x|` over the grid
    pub fn max_abs_x(&self) -> f64 {
        self.x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    /// Largest `|y|` over the grid
    pub fn max_abs_y(&self) -> f64 {
        self.y.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}
