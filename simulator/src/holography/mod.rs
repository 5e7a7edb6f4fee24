//! Holography: far-field computation and SLM phase patterns

pub mod hologram;
pub mod phase_patterns;

pub use hologram::{
    calculate_padded_shape, FarFieldEngine, FftHologram, HologramError, PaddingOptions,
};
