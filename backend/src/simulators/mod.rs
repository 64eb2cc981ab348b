//! Material Effects Simulator Module
//!
//! One simulator per physical process. The orchestrator owns each enabled
//! simulator as a boxed [`MaterialEffectsSimulator`] and drives it through the
//! same contract:
//!
//! 1. `update_state(track, radiation_lengths)` mutates the track in place and
//!    refills the daughter buffer
//! 2. `n_daughters()` / `daughters()` inspect the secondaries
//! 3. `take_daughters()` drains them, handing ownership to the event
//!
//! The daughter buffer is only valid until the next `update_state` call.
//!
//! # Simulator Interface
//!
//! ```rust
//! use material_effects_core_rs::simulators::{MaterialEffectsSimulator, SimulatorError};
//! use material_effects_core_rs::{Daughter, ParticleTrack};
//!
//! struct Transparent {
//!     daughters: Vec<Daughter>,
//! }
//!
//! impl MaterialEffectsSimulator for Transparent {
//!     fn compute(
//!         &mut self,
//!         _track: &mut ParticleTrack,
//!         _radiation_lengths: f64,
//!     ) -> Result<(), SimulatorError> {
//!         Ok(())
//!     }
//!
//!     fn daughters(&self) -> &[Daughter] {
//!         &self.daughters
//!     }
//!
//!     fn daughter_buffer(&mut self) -> &mut Vec<Daughter> {
//!         &mut self.daughters
//!     }
//! }
//! ```
//!
//! Available simulators:
//! 1. **PairProduction**: photon conversion into e+e-
//! 2. **Bremsstrahlung**: photon radiation off electrons
//! 3. **EnergyLoss**: ionization energy loss
//! 4. **MultipleScattering**: small-angle deflection
//! 5. **NuclearInteraction**: hadron absorption, secondaries from a cascade library
//! 6. **Mock**: scripted simulator for tests

use crate::core::Vector3;
use crate::models::{Daughter, ParticleTrack};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod bremsstrahlung;
pub mod energy_loss;
pub mod mock;
pub mod multiple_scattering;
pub mod nuclear;
pub mod pair_production;

pub use bremsstrahlung::BremsstrahlungSimulator;
pub use energy_loss::EnergyLossSimulator;
pub use mock::{MockCall, MockProbe, MockSimulator};
pub use multiple_scattering::MultipleScatteringSimulator;
pub use nuclear::{CascadeLibrary, NuclearInteractionSimulator};
pub use pair_production::PairProductionSimulator;

/// Physical process handled by one simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Process {
    PairProduction,
    Bremsstrahlung,
    EnergyLoss,
    MultipleScattering,
    NuclearInteraction,
}

impl Process {
    /// Configuration flag enabling the process
    pub fn name(&self) -> &'static str {
        match self {
            Process::PairProduction => "PairProduction",
            Process::Bremsstrahlung => "Bremsstrahlung",
            Process::EnergyLoss => "EnergyLoss",
            Process::MultipleScattering => "MultipleScattering",
            Process::NuclearInteraction => "NuclearInteraction",
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure inside a simulator
///
/// Simulators are deterministic given their inputs, so none of these is
/// retried: the orchestrator aborts the current interaction.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    #[error("Cascade library error: {0}")]
    Library(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Uniform contract of the process simulators
pub trait MaterialEffectsSimulator {
    /// Apply the process to `track` crossing `radiation_lengths` of material
    ///
    /// Called by [`update_state`](Self::update_state) with a cleared
    /// daughter buffer and a strictly positive thickness.
    fn compute(
        &mut self,
        track: &mut ParticleTrack,
        radiation_lengths: f64,
    ) -> Result<(), SimulatorError>;

    /// Secondaries produced by the last update
    fn daughters(&self) -> &[Daughter];

    /// Mutable access to the daughter buffer
    fn daughter_buffer(&mut self) -> &mut Vec<Daughter>;

    /// Run the process for one layer crossing
    ///
    /// Clears the previous daughters; material-free crossings
    /// (`radiation_lengths <= 0`) leave the track untouched.
    fn update_state(
        &mut self,
        track: &mut ParticleTrack,
        radiation_lengths: f64,
    ) -> Result<(), SimulatorError> {
        self.daughter_buffer().clear();
        if radiation_lengths > 0.0 && radiation_lengths.is_finite() {
            self.compute(track, radiation_lengths)
        } else {
            Ok(())
        }
    }

    fn n_daughters(&self) -> usize {
        self.daughters().len()
    }

    /// Drain the secondaries of the last update
    fn take_daughters(&mut self) -> std::vec::Drain<'_, Daughter> {
        self.daughter_buffer().drain(..)
    }

    /// Reference direction for the scattering plane (multiple scattering)
    fn set_normal_vector(&mut self, _normal: Vector3) {}

    /// Flush job-wide state (nuclear cascade library)
    fn save(&mut self) -> Result<(), SimulatorError> {
        Ok(())
    }
}

/// Unit vector orthogonal to `direction`, preferring the plane containing
/// `reference`
///
/// Falls back to an arbitrary orthogonal axis when `reference` is parallel
/// to `direction` or null.
pub(crate) fn orthogonal_axis(direction: &Vector3, reference: &Vector3) -> Vector3 {
    if let Some(axis) = direction.cross(reference).unit() {
        return axis;
    }
    let helper = if direction.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    direction
        .cross(&helper)
        .unit()
        .unwrap_or(Vector3::new(0.0, 0.0, 1.0))
}
