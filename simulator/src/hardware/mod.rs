//! Simulated SLM, camera geometry and the camera that images the SLM far-field

pub mod camera_grid;
pub mod focal_length;
pub mod simulated_camera;
pub mod slm;

pub use camera_grid::{CameraGrid, GridTransform};
pub use focal_length::{minimum_focal_length, resolve_focal_length, ResolvedFocalLength};
pub use simulated_camera::{SamplingMode, SimulatedCamera};
pub use slm::{AmplitudeProfile, SimulatedSlm};
