//! Simulated camera for spatial light modulator holography
//!
//! This crate images the far-field of a phase-only SLM onto a virtual camera
//! placed in its Fourier plane. The camera may be rotated, offset and sized
//! independently of the SLM; its images follow the SLM phase frame by frame.

pub mod algo;
pub mod config;
pub mod hardware;
pub mod holography;
pub mod image_proc;

// Re-exports for easier access
pub use config::{Basis, ConfigError, SimulatedCameraConfig};
pub use hardware::simulated_camera::{SamplingMode, SimulatedCamera};
pub use hardware::slm::{AmplitudeProfile, SimulatedSlm};
pub use holography::{calculate_padded_shape, FarFieldEngine, FftHologram, PaddingOptions};
