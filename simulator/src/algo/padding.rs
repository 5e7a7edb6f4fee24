//! Centered zero-padding and cropping of 2-D arrays.
//!
//! Both operations use the same convention as a centered FFT: element
//! `inner / 2` of the smaller array sits at element `outer / 2` of the larger
//! one (integer division). `unpad(pad(a))` therefore returns `a` exactly.

use ndarray::{s, Array2};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PaddingError {
    #[error("cannot pad {from:?} to smaller shape {to:?}")]
    PadShrinks {
        from: (usize, usize),
        to: (usize, usize),
    },
    #[error("cannot crop {from:?} to larger shape {to:?}")]
    CropGrows {
        from: (usize, usize),
        to: (usize, usize),
    },
}

/// Offset of a centered `inner` span inside an `outer` span
fn leading_margin(outer: usize, inner: usize) -> usize {
    outer / 2 - inner / 2
}

/// Embed `data` in the center of a zero-filled array of shape `dim`.
pub fn pad<T: Copy + Default>(
    data: &Array2<T>,
    dim: (usize, usize),
) -> Result<Array2<T>, PaddingError> {
    let (rows, cols) = data.dim();
    if dim.0 < rows || dim.1 < cols {
        return Err(PaddingError::PadShrinks {
            from: data.dim(),
            to: dim,
        });
    }
    let r0 = leading_margin(dim.0, rows);
    let c0 = leading_margin(dim.1, cols);

    let mut padded = Array2::from_elem(dim, T::default());
    padded
        .slice_mut(s![r0..r0 + rows, c0..c0 + cols])
        .assign(data);
    Ok(padded)
}

/// Crop the centered region of shape `dim` out of `data`.
pub fn unpad<T: Copy>(data: &Array2<T>, dim: (usize, usize)) -> Result<Array2<T>, PaddingError> {
    let (rows, cols) = data.dim();
    if dim.0 > rows || dim.1 > cols {
        return Err(PaddingError::CropGrows {
            from: data.dim(),
            to: dim,
        });
    }
    let r0 = leading_margin(rows, dim.0);
    let c0 = leading_margin(cols, dim.1);
    Ok(data.slice(s![r0..r0 + dim.0, c0..c0 + dim.1]).to_owned())
}
