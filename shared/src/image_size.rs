//! Pixel grid dimensions shared by cameras and SLMs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of a pixel grid.
///
/// Cameras and SLMs both describe their sensor/modulator area with this type.
/// Note that ndarray stores images as `[row, col]`, so the array dimension of a
/// `PixelShape` is `(height, width)`; use [`PixelShape::dim`] rather than
/// building that tuple by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelShape {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl PixelShape {
    /// Create a new PixelShape
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Build from an ndarray dimension tuple `(rows, cols)`
    pub fn from_dim(dim: (usize, usize)) -> Self {
        Self::new(dim.1, dim.0)
    }

    /// ndarray dimension tuple `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// True if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Largest of the two dimensions
    pub fn max_dim(&self) -> usize {
        self.width.max(self.height)
    }

    /// Index of the center pixel as (x, y), `(width / 2, height / 2)` rounded down.
    ///
    /// This is also where a centered FFT puts the zero order, so grids built
    /// around it line up with the far-field bins for odd and even sizes alike.
    pub fn center(&self) -> (f64, f64) {
        ((self.width / 2) as f64, (self.height / 2) as f64)
    }

    /// Convert to u32 tuple for image/display APIs
    pub fn to_u32_tuple(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }
}

impl fmt::Display for PixelShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_is_rows_then_cols() {
        let shape = PixelShape::new(1920, 1080);
        assert_eq!(shape.dim(), (1080, 1920));
    }

    #[test]
    fn test_from_dim() {
        let shape = PixelShape::from_dim((480, 640));
        assert_eq!(shape.width, 640);
        assert_eq!(shape.height, 480);
        assert_eq!(PixelShape::from_dim(shape.dim()), shape);
    }

    #[test]
    fn test_is_empty() {
        assert!(PixelShape::new(0, 100).is_empty());
        assert!(PixelShape::new(100, 0).is_empty());
        assert!(!PixelShape::new(1, 1).is_empty());
    }

    #[test]
    fn test_max_dim() {
        assert_eq!(PixelShape::new(1920, 1200).max_dim(), 1920);
        assert_eq!(PixelShape::new(600, 800).max_dim(), 800);
    }

    #[test]
    fn test_center() {
        let size = PixelShape::new(100, 200);
        assert_eq!(size.center(), (50.0, 100.0));
    }

    #[test]
    fn test_center_of_odd_shape_is_a_pixel() {
        assert_eq!(PixelShape::new(63, 7).center(), (31.0, 3.0));
        assert_eq!(PixelShape::new(1, 1).center(), (0.0, 0.0));
    }

    #[test]
    fn test_to_u32_tuple_is_width_height() {
        assert_eq!(PixelShape::new(640, 480).to_u32_tuple(), (640, 480));
    }

    #[test]
    fn test_display() {
        let size = PixelShape::new(1272, 1024);
        assert_eq!(format!("{}", size), "1272x1024");
    }

    #[test]
    fn test_serde_roundtrip() {
        let original = PixelShape::new(512, 256);
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, r#"{"width":512,"height":256}"#);
        let recovered: PixelShape = serde_json::from_str(&json).unwrap();
        assert_eq!(original, recovered);
    }
}
