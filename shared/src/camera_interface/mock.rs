use super::{validate_exposure, CameraError, CameraInterface, CameraResult};
use crate::image_size::PixelShape;
use ndarray::Array2;

/// Camera that replays prerecorded frames.
///
/// A single frame repeats forever; a sequence of frames is served in order and
/// capture fails once it is exhausted. Exposure scales every frame, matching
/// the simulated camera's digital gain.
pub struct MockCameraInterface {
    shape: PixelShape,
    frames: Vec<Array2<f64>>,
    frame_index: usize,
    frame_count: u64,
    exposure: f64,
    flush_count: u64,
}

impl MockCameraInterface {
    pub fn new(shape: PixelShape, frames: Vec<Array2<f64>>) -> Self {
        Self {
            shape,
            frames,
            frame_index: 0,
            frame_count: 0,
            exposure: 1.0,
            flush_count: 0,
        }
    }

    pub fn new_repeating(frame: Array2<f64>) -> Self {
        let shape = PixelShape::from_dim(frame.dim());
        Self::new(shape, vec![frame])
    }

    pub fn new_zeros(shape: PixelShape) -> Self {
        Self::new_repeating(Array2::zeros(shape.dim()))
    }

    /// Number of frames served so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of times `flush` has been called
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }

    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.frame_count = 0;
    }

    fn next_frame(&mut self) -> CameraResult<&Array2<f64>> {
        let frame_idx = if self.frames.len() == 1 {
            0
        } else {
            if self.frame_index >= self.frames.len() {
                return Err(CameraError::CaptureError("No more frames".to_string()));
            }
            let current = self.frame_index;
            self.frame_index += 1;
            current
        };

        let frame = &self.frames[frame_idx];
        if frame.dim() != self.shape.dim() {
            return Err(CameraError::CaptureError(format!(
                "frame {frame_idx} has shape {:?}, camera is {}",
                frame.dim(),
                self.shape
            )));
        }
        Ok(frame)
    }
}

impl CameraInterface for MockCameraInterface {
    fn flush(&mut self) -> CameraResult<()> {
        self.flush_count += 1;
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

    fn get_image(&mut self, _plot: bool) -> CameraResult<Array2<f64>> {
        let exposure = self.exposure;
        let image = self.next_frame()?.mapv(|v| v * exposure);
        self.frame_count += 1;
        Ok(image)
    }

    fn shape(&self) -> PixelShape {
        self.shape
    }

    fn name(&self) -> &str {
        "MockCamera"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_repeating_frame_scaled_by_exposure() {
        let frame = Array2::from_shape_fn((2, 3), |(r, c)| (r * 3 + c) as f64);
        let mut camera = MockCameraInterface::new_repeating(frame.clone());
        camera.set_exposure(3.0).unwrap();

        for _ in 0..3 {
            let image = camera.get_image(false).unwrap();
            for (a, b) in image.iter().zip(frame.iter()) {
                assert_relative_eq!(*a, 3.0 * b);
            }
        }
        assert_eq!(camera.frame_count(), 3);
    }

    #[test]
    fn test_sequence_exhausts() {
        let shape = PixelShape::new(2, 2);
        let frames = vec![Array2::zeros((2, 2)), Array2::ones((2, 2))];
        let mut camera = MockCameraInterface::new(shape, frames);

        assert_eq!(camera.get_image(false).unwrap().sum(), 0.0);
        assert_eq!(camera.get_image(false).unwrap().sum(), 4.0);
        assert!(matches!(
            camera.get_image(false),
            Err(CameraError::CaptureError(_))
        ));

        camera.reset();
        assert!(camera.get_image(false).is_ok());
    }

    #[test]
    fn test_rejects_negative_exposure() {
        let mut camera = MockCameraInterface::new_zeros(PixelShape::new(8, 8));
        assert!(camera.set_exposure(-1.0).is_err());
        assert_eq!(camera.get_exposure(), 1.0);
    }

    #[test]
    fn test_mismatched_frame_shape_is_capture_error() {
        let shape = PixelShape::new(4, 4);
        let frames = vec![Array2::zeros((4, 4)), Array2::zeros((2, 2))];
        let mut camera = MockCameraInterface::new(shape, frames);
        assert!(camera.get_image(false).is_ok());
        assert!(camera.get_image(false).is_err());
    }

    #[test]
    fn test_flush_counts() {
        let mut camera = MockCameraInterface::new_zeros(PixelShape::new(1, 1));
        camera.flush().unwrap();
        camera.flush().unwrap();
        assert_eq!(camera.flush_count(), 2);
    }
}
