//! Image output for simulated frames

pub mod image;

pub use self::image::{intensity_to_gray_image, save_intensity_image, ImageSaveError};
