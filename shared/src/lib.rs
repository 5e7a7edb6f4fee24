//! Shared components for the SLM far-field simulator.
//!
//! This crate holds the hardware-neutral types and traits (pixel shapes,
//! camera and SLM interfaces) used by both simulated and real devices.

pub mod camera_interface;
pub mod image_size;
pub mod slm_interface;
