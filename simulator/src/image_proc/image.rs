//! Conversion of simulated intensity images to image crate types.
//!
//! # Coordinate System Conversions
//!
//! - **ndarray**: matrix indexing `[row, col]` = `[y, x]` with `(height, width)` dimensions
//! - **image crate**: graphics indexing `(x, y)` with `(width, height)` dimensions

use image::{GrayImage, Luma};
use ndarray::Array2;
use shared::image_size::PixelShape;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageSaveError {
    #[error("failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Map an intensity image linearly from `[0, max]` onto 8-bit grayscale.
///
/// The simulated camera has unlimited dynamic range, so the color scale is
/// set by the brightest pixel of each frame. An all-dark frame renders black.
/// Negative and NaN values render black.
pub fn intensity_to_gray_image(image: &Array2<f64>) -> GrayImage {
    let shape = PixelShape::from_dim(image.dim());
    let max = image
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };

    let (img_width, img_height) = shape.to_u32_tuple();
    let mut img = GrayImage::new(img_width, img_height);
    for y in 0..shape.height {
        for x in 0..shape.width {
            let value = (image[[y, x]] * scale).round().clamp(0.0, 255.0);
            // NaN survives clamp; treat as dark
            let level = if value.is_nan() { 0 } else { value as u8 };
            img.put_pixel(x as u32, y as u32, Luma([level]));
        }
    }
    img
}

/// Render an intensity image to a PNG (or any format implied by the extension).
///
/// Parent directories are created as needed.
pub fn save_intensity_image(image: &Array2<f64>, path: &Path) -> Result<(), ImageSaveError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    intensity_to_gray_image(image).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scales_to_brightest_pixel() {
        let mut data = Array2::zeros((2, 3));
        data[[0, 2]] = 4.0;
        data[[1, 0]] = 2.0;
        let img = intensity_to_gray_image(&data);

        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 0)[0], 255);
        assert_eq!(img.get_pixel(0, 1)[0], 128);
        assert_eq!(img.get_pixel(1, 1)[0], 0);
    }

    #[test]
    fn test_dark_frame_is_black() {
        let img = intensity_to_gray_image(&Array2::zeros((4, 4)));
        assert!(img.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_nan_renders_black() {
        let mut data = Array2::from_elem((1, 2), 1.0);
        data[[0, 0]] = f64::NAN;
        let img = intensity_to_gray_image(&data);
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plots").join("frame.png");
        let data = Array2::from_shape_fn((8, 16), |(r, c)| (r * c) as f64);

        save_intensity_image(&data, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded.dimensions(), (16, 8));
        assert_eq!(loaded.get_pixel(15, 7)[0], 255);
    }
}
