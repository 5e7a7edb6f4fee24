//! Two-dimensional FFT over ndarray arrays.
//!
//! rustfft only provides 1-D transforms, so the 2-D transform is built from a
//! pass over rows followed by a pass over columns. Plans are created once and
//! reused, which matters because the far-field of a padded SLM is recomputed
//! for every captured frame.

use ndarray::Array2;
use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error raised when an array does not match the planned transform size
#[derive(Debug, Error, Clone, PartialEq)]
#[error("array shape {actual:?} does not match planned FFT shape {planned:?}")]
pub struct FftShapeError {
    pub planned: (usize, usize),
    pub actual: (usize, usize),
}

/// Forward 2-D FFT with orthonormal scaling (`1/sqrt(rows * cols)`).
///
/// The orthonormal convention conserves total power between the near field
/// and the far field (Parseval).
#[derive(Clone)]
pub struct Fft2Plan {
    rows: usize,
    cols: usize,
    row_fft: Arc<dyn Fft<f64>>,
    col_fft: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for Fft2Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft2Plan")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

impl Fft2Plan {
    /// Plan a forward transform for arrays of shape `(rows, cols)`.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::new();
        let row_fft = planner.plan_fft_forward(cols);
        let col_fft = planner.plan_fft_forward(rows);
        Self {
            rows,
            cols,
            row_fft,
            col_fft,
        }
    }

    /// Planned `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Transform `data` in place.
    pub fn process(&self, data: &mut Array2<Complex64>) -> Result<(), FftShapeError> {
        if data.dim() != self.dim() {
            return Err(FftShapeError {
                planned: self.dim(),
                actual: data.dim(),
            });
        }
        let (rows, cols) = self.dim();

        // Row pass: rustfft processes consecutive chunks of `cols` samples.
        let mut buffer: Vec<Complex64> = data.iter().copied().collect();
        self.row_fft.process(&mut buffer);

        // Column pass on the transpose so every column is contiguous.
        let mut transposed = vec![Complex64::new(0.0, 0.0); rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                transposed[c * rows + r] = buffer[r * cols + c];
            }
        }
        self.col_fft.process(&mut transposed);

        let scale = 1.0 / ((rows * cols) as f64).sqrt();
        for ((r, c), value) in data.indexed_iter_mut() {
            *value = transposed[c * rows + r] * scale;
        }
        Ok(())
    }
}

/// Circularly shift an array by `(row_shift, col_shift)`.
///
/// Element `[r, c]` of the input lands at `[(r + row_shift) % rows, (c + col_shift) % cols]`.
pub fn roll<T: Copy>(data: &Array2<T>, row_shift: usize, col_shift: usize) -> Array2<T> {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return data.clone();
    }
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let src_r = (r + rows - row_shift % rows) % rows;
        let src_c = (c + cols - col_shift % cols) % cols;
        data[[src_r, src_c]]
    })
}

/// Move the zero-frequency bin to the array center (`n / 2` on each axis).
pub fn fftshift<T: Copy>(data: &Array2<T>) -> Array2<T> {
    let (rows, cols) = data.dim();
    roll(data, rows / 2, cols / 2)
}

/// Inverse of [`fftshift`]; identical to it for even dimensions.
pub fn ifftshift<T: Copy>(data: &Array2<T>) -> Array2<T> {
    let (rows, cols) = data.dim();
    roll(data, rows - rows / 2, cols - cols / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_field_transforms_to_single_bin() {
        let plan = Fft2Plan::new(8, 4);
        let mut data = Array2::from_elem((8, 4), Complex64::new(1.0, 0.0));
        plan.process(&mut data).unwrap();

        // sum = 32, scaled by 1/sqrt(32)
        assert_relative_eq!(data[[0, 0]].re, 32.0_f64.sqrt(), epsilon = 1e-12);
        let rest: f64 = data.iter().skip(1).map(|v| v.norm()).sum();
        assert!(rest < 1e-10);
    }

    #[test]
    fn test_parseval_power_conserved() {
        let plan = Fft2Plan::new(6, 10);
        let mut data = Array2::from_shape_fn((6, 10), |(r, c)| {
            Complex64::new((r as f64 * 0.7).sin(), (c as f64 * 1.3).cos())
        });
        let power_in: f64 = data.iter().map(|v| v.norm_sqr()).sum();
        plan.process(&mut data).unwrap();
        let power_out: f64 = data.iter().map(|v| v.norm_sqr()).sum();
        assert_relative_eq!(power_in, power_out, max_relative = 1e-10);
    }

    #[test]
    fn test_plane_wave_lands_in_expected_bin() {
        let (rows, cols) = (16, 16);
        let plan = Fft2Plan::new(rows, cols);
        // exp(2*pi*i*(3c/cols + 5r/rows)) concentrates in bin (5, 3)
        let mut data = Array2::from_shape_fn((rows, cols), |(r, c)| {
            let cycles = 3.0 * c as f64 / cols as f64 + 5.0 * r as f64 / rows as f64;
            Complex64::from_polar(1.0, 2.0 * std::f64::consts::PI * cycles)
        });
        plan.process(&mut data).unwrap();
        assert_relative_eq!(data[[5, 3]].norm(), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_shape_mismatch() {
        let plan = Fft2Plan::new(4, 4);
        let mut data = Array2::from_elem((4, 5), Complex64::new(0.0, 0.0));
        let err = plan.process(&mut data).unwrap_err();
        assert_eq!(err.actual, (4, 5));
    }

    #[test]
    fn test_fftshift_moves_origin_to_center() {
        let mut data = Array2::<f64>::zeros((4, 6));
        data[[0, 0]] = 1.0;
        let shifted = fftshift(&data);
        assert_eq!(shifted[[2, 3]], 1.0);
        assert_eq!(shifted.sum(), 1.0);
    }

    #[test]
    fn test_ifftshift_inverts_fftshift_odd() {
        let data = Array2::from_shape_fn((5, 7), |(r, c)| (r * 7 + c) as f64);
        let restored = ifftshift(&fftshift(&data));
        assert_eq!(restored, data);
    }

    #[test]
    fn test_ifftshift_odd_center_to_origin() {
        let mut data = Array2::<f64>::zeros((5, 5));
        data[[2, 2]] = 1.0;
        assert_eq!(ifftshift(&data)[[0, 0]], 1.0);
    }
}
