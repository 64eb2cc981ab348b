//! Material Effects Core - Rust Engine
//!
//! Interactions of particles with the material of a layered tracker, with
//! deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Kinematics (three- and four-vectors)
//! - **models**: Domain types (tracks, vertices, layers, event history)
//! - **simulators**: One simulator per physical process
//! - **orchestrator**: Effective thickness and process dispatch
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. A destructive interaction (conversion, nuclear absorption) ends the
//!    processing of the track in that layer
//! 2. A vertex exists only if at least one secondary was produced
//! 3. Effective thickness is always finite and non-negative
//! 4. All randomness is deterministic (seeded RNG)
//!
//! # Example
//!
//! ```rust
//! use material_effects_core_rs::rng;
//! use material_effects_core_rs::{
//!     Daughter, FourVector, MaterialEffects, MaterialEffectsConfig, ParticleTrack, SimEvent,
//!     TrackerLayer,
//! };
//!
//! let config = MaterialEffectsConfig::from_json_str(r#"{
//!     "PairProduction": true,
//!     "Bremsstrahlung": false,
//!     "EnergyLoss": false,
//!     "MultipleScattering": false,
//!     "NuclearInteraction": false,
//!     "photonEnergy": 0.1
//! }"#).unwrap();
//! let mut effects = MaterialEffects::new(&config, rng::shared(7)).unwrap();
//!
//! let momentum = FourVector::new(0.0, 10.0, 0.0, 10.0);
//! let mut photon = ParticleTrack::new(momentum, FourVector::new(0.0, 30.0, 0.0, 0.0), 22, 0.0);
//! let mut event = SimEvent::new();
//! let index = event.add_primary(Daughter::new(momentum, 22, 0.0), FourVector::default());
//!
//! // 50 radiation lengths: the photon converts
//! let layer = TrackerLayer::barrel(1, 50.0, false);
//! let fate = effects.interact(&mut event, &layer, &mut photon, index).unwrap();
//!
//! let vertex = fate.vertex().unwrap();
//! assert_eq!(event.daughters_of(vertex).count(), 2);
//! ```

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod simulators;

// Re-exports for convenience
pub use crate::core::{FourVector, Vector3};
pub use models::{
    Daughter, EventSink, Interaction, InteractionLog, Layer, ParticleTrack, SimEvent, SimTrack,
    SimVertex, TrackIndex, TrackerLayer, VertexIndex,
};
pub use orchestrator::{
    compute_effective_thickness, ConfigError, EffectiveThickness, Fate, GeometryError,
    MaterialEffects, MaterialEffectsConfig, MaterialError, SimulatorSet,
};
pub use rng::{RngManager, SharedRng};
pub use simulators::{MaterialEffectsSimulator, Process, SimulatorError};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn material_effects_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::orchestrator::PyMaterialEffects>()?;
    Ok(())
}
