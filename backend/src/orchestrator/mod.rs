//! Orchestrator - material effects of a layer crossing
//!
//! See `engine.rs` for the interaction sequence, `thickness.rs` for the
//! effective thickness and `config.rs` for the job options.

pub mod config;
pub mod engine;
pub mod thickness;

// Re-export main types for convenience
pub use config::{ConfigError, MaterialEffectsConfig, DEFAULT_PT_MIN};
pub use engine::{Fate, MaterialEffects, MaterialError, SimulatorSet};
pub use thickness::{
    compute_effective_thickness, correction_factor, normal_vector, nuclear_scale_factor,
    CorrectionZone, EffectiveThickness, GeometryError, MIN_COS_THETA,
};
