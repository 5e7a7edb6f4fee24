//! Analytic phase patterns for driving an SLM.
//!
//! Coordinates are measured from the SLM center in wavelengths (pixel index
//! times pitch), matching the normalized k-space units of the far-field: a
//! blaze with vector `(kx, ky)` sends light to normalized angle `(kx, ky)`,
//! which a simulated camera images at `f_eff * (kx, ky)` pixels from its center.

use ndarray::Array2;
use shared::image_size::PixelShape;
use std::f64::consts::PI;

/// Physical coordinate of every SLM pixel as `(x, y)` grids in wavelengths.
///
/// Pixel `(r, c)` sits at `((c - W/2) * dx, (r - H/2) * dy)`, so the zero-order
/// pixel of the centered Fourier transform is the origin.
pub fn slm_coordinates(shape: PixelShape, dx: f64, dy: f64) -> (Array2<f64>, Array2<f64>) {
    let (cx, cy) = shape.center();
    let x = Array2::from_shape_fn(shape.dim(), |(_, c)| (c as f64 - cx) * dx);
    let y = Array2::from_shape_fn(shape.dim(), |(r, _)| (r as f64 - cy) * dy);
    (x, y)
}

/// Linear phase ramp steering light to normalized angle `vector = (kx, ky)`.
pub fn blaze(shape: PixelShape, dx: f64, dy: f64, vector: (f64, f64)) -> Array2<f64> {
    let (x, y) = slm_coordinates(shape, dx, dy);
    let (kx, ky) = vector;
    (x * kx + y * ky) * (2.0 * PI)
}

/// Quadratic phase of a thin lens with focal length `focal` (in wavelengths).
///
/// Positive focal lengths focus (converging wavefront).
pub fn lens(shape: PixelShape, dx: f64, dy: f64, focal: f64) -> Array2<f64> {
    let (x, y) = slm_coordinates(shape, dx, dy);
    (&x * &x + &y * &y) * (-PI / focal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coordinates_centered() {
        let (x, y) = slm_coordinates(PixelShape::new(4, 2), 2.0, 0.5);
        assert_eq!(x.dim(), (2, 4));
        assert_relative_eq!(x[[0, 0]], -4.0);
        assert_relative_eq!(x[[1, 2]], 0.0);
        assert_relative_eq!(y[[0, 3]], -0.5);
        assert_relative_eq!(y[[1, 0]], 0.0);
    }

    #[test]
    fn test_blaze_gradient() {
        let shape = PixelShape::new(8, 8);
        let phase = blaze(shape, 1.0, 1.0, (0.125, -0.25));
        // One pixel step in x adds 2*pi*kx
        assert_relative_eq!(phase[[3, 5]] - phase[[3, 4]], 2.0 * PI * 0.125, epsilon = 1e-12);
        assert_relative_eq!(phase[[5, 3]] - phase[[4, 3]], -2.0 * PI * 0.25, epsilon = 1e-12);
        assert_relative_eq!(phase[[4, 4]], 0.0);
    }

    #[test]
    fn test_lens_radially_symmetric() {
        let phase = lens(PixelShape::new(9, 9), 1.0, 1.0, 1000.0);
        // Odd aperture: the center pixel is the lens axis
        assert_eq!(phase[[4, 4]], 0.0);
        assert_relative_eq!(phase[[0, 4]], phase[[4, 0]], epsilon = 1e-12);
        assert_relative_eq!(phase[[0, 4]], phase[[8, 4]], epsilon = 1e-12);
        assert_relative_eq!(phase[[4, 5]], -PI / 1000.0, epsilon = 1e-12);
        assert!(phase[[0, 0]] < phase[[4, 4]]);
    }
}
