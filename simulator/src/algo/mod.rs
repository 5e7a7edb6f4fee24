//! Numeric building blocks for far-field simulation
//!
//! This module provides the 2-D FFT used by the hologram engine, centered
//! padding helpers, and the array backends that carry the per-frame work.

pub mod backend;
pub mod fft2;
pub mod padding;

pub use backend::{ArrayBackend, DefaultBackend, ParallelBackend, SerialBackend};
pub use fft2::{fftshift, ifftshift, Fft2Plan};
pub use padding::{pad, unpad, PaddingError};
