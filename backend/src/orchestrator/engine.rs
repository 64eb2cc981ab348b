//! Material Effects Engine
//!
//! Applies the material of one tracker layer to one track:
//! - Effective thickness (layer budget, crossing angle, material map)
//! - Process dispatch (particle type and kinematics)
//! - Secondary recording (vertices and tracks in the event history)
//! - Fate of the primary (survives, converted, absorbed)
//!
//! # Architecture
//!
//! ```text
//! For each track crossing a layer:
//! 1. Compute normal vector and effective thickness
//! 2. Photons: pair production (destructive), then stop
//! 3. Hadrons: nuclear interaction (destructive)
//! 4. Neutral particles: stop
//! 5. Electrons: bremsstrahlung (photons recorded, electron continues)
//! 6. Energy loss
//! 7. Multiple scattering above the pT threshold
//! ```
//!
//! A destructive process that produces secondaries ends the call: no other
//! process runs on that track.
//!
//! # Example
//!
//! ```rust
//! use material_effects_core_rs::rng;
//! use material_effects_core_rs::{
//!     Daughter, Fate, FourVector, MaterialEffects, MaterialEffectsConfig, ParticleTrack,
//!     SimEvent, TrackerLayer,
//! };
//!
//! let mut config = MaterialEffectsConfig::disabled();
//! config.energy_loss = true;
//! config.pt_min = Some(0.2);
//!
//! let mut effects = MaterialEffects::new(&config, rng::shared(12345)).unwrap();
//! let mut event = SimEvent::new();
//!
//! let momentum = FourVector::new(2.0, 0.0, 0.0, 2.005);
//! let mut track = ParticleTrack::new(momentum, FourVector::new(30.0, 0.0, 0.0, 0.0), 13, -1.0);
//! let index = event.add_primary(Daughter::new(momentum, 13, -1.0), FourVector::default());
//!
//! let layer = TrackerLayer::barrel(4, 0.05, true);
//! let fate = effects.interact(&mut event, &layer, &mut track, index).unwrap();
//!
//! assert_eq!(fate, Fate::Survives);
//! assert!(effects.energy_loss() > 0.0);
//! ```

use crate::core::{FourVector, Vector3};
use crate::models::{EventSink, Interaction, InteractionLog, Layer, ParticleTrack, TrackIndex, VertexIndex};
use crate::orchestrator::config::{require, ConfigError, MaterialEffectsConfig};
use crate::orchestrator::thickness::{compute_effective_thickness, nuclear_scale_factor, GeometryError};
use crate::rng::SharedRng;
use crate::simulators::{
    BremsstrahlungSimulator, EnergyLossSimulator, MaterialEffectsSimulator,
    MultipleScatteringSimulator, NuclearInteractionSimulator, PairProductionSimulator, Process,
    SimulatorError,
};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

// ============================================================================
// Result and Error Types
// ============================================================================

/// Outcome of one layer crossing for the primary track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    /// The track continues (possibly degraded, deflected, having radiated)
    Survives,
    /// Photon converted; the vertex holds the pair
    Converted(VertexIndex),
    /// Hadron absorbed by a nuclear interaction; the vertex holds the secondaries
    Absorbed(VertexIndex),
}

impl Fate {
    pub fn survives(&self) -> bool {
        matches!(self, Fate::Survives)
    }

    /// End vertex of a destroyed track
    pub fn vertex(&self) -> Option<VertexIndex> {
        match self {
            Fate::Survives => None,
            Fate::Converted(vertex) | Fate::Absorbed(vertex) => Some(*vertex),
        }
    }
}

impl fmt::Display for Fate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fate::Survives => write!(f, "survives"),
            Fate::Converted(vertex) => write!(f, "converted at vertex {}", vertex),
            Fate::Absorbed(vertex) => write!(f, "absorbed at vertex {}", vertex),
        }
    }
}

#[derive(Debug, Error)]
pub enum MaterialError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("{process} simulator failed: {source}")]
    Simulator {
        process: Process,
        #[source]
        source: SimulatorError,
    },
}

impl MaterialError {
    fn simulator(process: Process) -> impl FnOnce(SimulatorError) -> MaterialError {
        move |source| MaterialError::Simulator { process, source }
    }
}

// ============================================================================
// Simulator Set
// ============================================================================

/// Process simulators owned by the engine; `None` disables a process
#[derive(Default)]
pub struct SimulatorSet {
    pub pair_production: Option<Box<dyn MaterialEffectsSimulator>>,
    pub bremsstrahlung: Option<Box<dyn MaterialEffectsSimulator>>,
    pub energy_loss: Option<Box<dyn MaterialEffectsSimulator>>,
    pub multiple_scattering: Option<Box<dyn MaterialEffectsSimulator>>,
    pub nuclear_interaction: Option<Box<dyn MaterialEffectsSimulator>>,
}

impl SimulatorSet {
    /// Build the simulators enabled by `config`, all drawing from `rng`
    pub fn from_config(
        config: &MaterialEffectsConfig,
        rng: &SharedRng,
    ) -> Result<Self, MaterialError> {
        config.validate()?;
        let mut set = SimulatorSet::default();

        if config.pair_production {
            let photon_energy = require(Process::PairProduction, "photonEnergy", config.photon_energy)?;
            set.pair_production = Some(Box::new(PairProductionSimulator::new(
                photon_energy,
                Rc::clone(rng),
            )));
        }

        if config.bremsstrahlung {
            let energy = require(Process::Bremsstrahlung, "bremEnergy", config.brem_energy)?;
            let fraction = require(
                Process::Bremsstrahlung,
                "bremEnergyFraction",
                config.brem_energy_fraction,
            )?;
            set.bremsstrahlung = Some(Box::new(BremsstrahlungSimulator::new(
                energy,
                fraction,
                Rc::clone(rng),
            )));
        }

        if config.energy_loss {
            set.energy_loss = Some(Box::new(EnergyLossSimulator::new(Rc::clone(rng))));
        }

        if config.multiple_scattering {
            set.multiple_scattering = Some(Box::new(MultipleScatteringSimulator::new(Rc::clone(rng))));
        }

        if config.nuclear_interaction {
            let process = Process::NuclearInteraction;
            let file_names = require(process, "fileNames", config.file_names.as_ref())?;
            let energies = require(process, "pionEnergies", config.pion_energies.as_ref())?;
            let ratios = require(process, "ratioRatio", config.ratio_ratio.as_ref())?;
            let pion_energy = require(process, "pionEnergy", config.pion_energy)?;
            let length_ratio = require(process, "lengthRatio", config.length_ratio)?;
            let input_file = require(process, "inputFile", config.input_file.as_ref())?;

            let simulator = NuclearInteractionSimulator::from_files(
                file_names.as_slice(),
                energies.as_slice(),
                pion_energy,
                length_ratio,
                ratios.clone(),
                input_file.as_str(),
                Rc::clone(rng),
            )
            .map_err(MaterialError::simulator(process))?;
            set.nuclear_interaction = Some(Box::new(simulator));
        }

        Ok(set)
    }

    fn enabled(&self) -> Vec<Process> {
        [
            (Process::PairProduction, self.pair_production.is_some()),
            (Process::Bremsstrahlung, self.bremsstrahlung.is_some()),
            (Process::EnergyLoss, self.energy_loss.is_some()),
            (Process::MultipleScattering, self.multiple_scattering.is_some()),
            (Process::NuclearInteraction, self.nuclear_interaction.is_some()),
        ]
        .into_iter()
        .filter_map(|(process, on)| on.then_some(process))
        .collect()
    }
}

// ============================================================================
// Material Effects
// ============================================================================

/// Material effects orchestrator
///
/// Owns the enabled simulators and applies them, in a fixed order, to each
/// track crossing a layer. One instance serves one processing unit: the
/// random engine it shares with its simulators is not thread-safe.
pub struct MaterialEffects {
    simulators: SimulatorSet,

    /// Multiple scattering only applies above this transverse momentum (GeV)
    pt_min: f64,

    /// Corrected nominal thickness of the last crossing
    thickness: f64,

    /// Energy lost by ionization in the last crossing (GeV)
    energy_loss: f64,

    /// Layer normal of the last crossing
    normal_vector: Vector3,

    /// Processes that fired, in order
    interaction_log: InteractionLog,
}

impl MaterialEffects {
    /// Create the orchestrator from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Process flags and options
    /// * `rng` - Random engine shared by every simulator
    ///
    /// # Returns
    ///
    /// * `Ok(MaterialEffects)` - All enabled simulators built
    /// * `Err(MaterialError::Config)` - An enabled process lacks an option
    /// * `Err(MaterialError::Simulator)` - The nuclear cascade library failed to load
    pub fn new(config: &MaterialEffectsConfig, rng: SharedRng) -> Result<Self, MaterialError> {
        let simulators = SimulatorSet::from_config(config, &rng)?;
        let effects = Self::with_simulators(simulators, config.pt_min());

        log::info!(
            "material effects: enabled {:?}, pT min {} GeV",
            effects.simulators.enabled(),
            effects.pt_min
        );
        Ok(effects)
    }

    /// Create the orchestrator around externally built simulators
    pub fn with_simulators(simulators: SimulatorSet, pt_min: f64) -> Self {
        Self {
            simulators,
            pt_min,
            thickness: 0.0,
            energy_loss: 0.0,
            normal_vector: Vector3::ZERO,
            interaction_log: InteractionLog::new(),
        }
    }

    // ========================================================================
    // Interaction
    // ========================================================================

    /// Apply the material of `layer` to `track`
    ///
    /// `track` is updated in place; secondaries are added to `event` under a
    /// new vertex parented to `track_index`.
    ///
    /// # Errors
    ///
    /// * `MaterialError::Geometry` - forward layer without disk normal
    /// * `MaterialError::Simulator` - a simulator failed; the call is aborted
    pub fn interact<E, L>(
        &mut self,
        event: &mut E,
        layer: &L,
        track: &mut ParticleTrack,
        track_index: TrackIndex,
    ) -> Result<Fate, MaterialError>
    where
        E: EventSink + ?Sized,
        L: Layer + ?Sized,
    {
        self.energy_loss = 0.0;

        let crossing = compute_effective_thickness(layer, track)?;
        self.normal_vector = crossing.normal;
        self.thickness = crossing.thickness;
        let radiation_lengths = crossing.radiation_lengths;
        let layer_number = layer.layer_number();

        // Pair production
        if track.is_photon() {
            if let Some(simulator) = self.simulators.pair_production.as_mut() {
                simulator
                    .update_state(track, radiation_lengths)
                    .map_err(MaterialError::simulator(Process::PairProduction))?;

                let n_daughters = simulator.n_daughters();
                if n_daughters > 0 {
                    let vertex = record_secondaries(event, simulator.as_mut(), track, track_index);
                    log::debug!(
                        "layer {}: track {} converted into {} particles",
                        layer_number,
                        track_index,
                        n_daughters
                    );
                    self.interaction_log.log(Interaction::PairConversion {
                        track: track_index,
                        layer: layer_number,
                        vertex,
                        n_daughters,
                    });
                    return Ok(Fate::Converted(vertex));
                }
            }
            return Ok(Fate::Survives);
        }

        // Nuclear interactions
        if track.is_hadron() {
            if let Some(simulator) = self.simulators.nuclear_interaction.as_mut() {
                let scale = nuclear_scale_factor(layer, track);
                simulator
                    .update_state(track, radiation_lengths * scale)
                    .map_err(MaterialError::simulator(Process::NuclearInteraction))?;

                let n_daughters = simulator.n_daughters();
                if n_daughters > 0 {
                    let vertex = record_secondaries(event, simulator.as_mut(), track, track_index);
                    log::debug!(
                        "layer {}: track {} absorbed, {} secondaries (scale {})",
                        layer_number,
                        track_index,
                        n_daughters,
                        scale
                    );
                    self.interaction_log.log(Interaction::NuclearInteraction {
                        track: track_index,
                        layer: layer_number,
                        vertex,
                        n_daughters,
                        scale,
                    });
                    return Ok(Fate::Absorbed(vertex));
                }
            }
        }

        if track.is_neutral() {
            return Ok(Fate::Survives);
        }

        if self.simulators.bremsstrahlung.is_none()
            && self.simulators.energy_loss.is_none()
            && self.simulators.multiple_scattering.is_none()
        {
            return Ok(Fate::Survives);
        }

        // Bremsstrahlung
        if track.is_electron() {
            if let Some(simulator) = self.simulators.bremsstrahlung.as_mut() {
                simulator
                    .update_state(track, radiation_lengths)
                    .map_err(MaterialError::simulator(Process::Bremsstrahlung))?;

                let n_photons = simulator.n_daughters();
                if n_photons > 0 {
                    let vertex = record_secondaries(event, simulator.as_mut(), track, track_index);
                    log::debug!(
                        "layer {}: track {} radiated {} photons",
                        layer_number,
                        track_index,
                        n_photons
                    );
                    self.interaction_log.log(Interaction::Bremsstrahlung {
                        track: track_index,
                        layer: layer_number,
                        vertex,
                        n_photons,
                    });
                }
            }
        }

        // Energy loss
        if let Some(simulator) = self.simulators.energy_loss.as_mut() {
            let energy_before = track.e();
            simulator
                .update_state(track, radiation_lengths)
                .map_err(MaterialError::simulator(Process::EnergyLoss))?;
            self.energy_loss = energy_before - track.e();

            if self.energy_loss != 0.0 {
                self.interaction_log.log(Interaction::EnergyLoss {
                    track: track_index,
                    layer: layer_number,
                    delta: self.energy_loss,
                });
            }
        }

        // Multiple scattering
        if let Some(simulator) = self.simulators.multiple_scattering.as_mut() {
            if track.pt() > self.pt_min {
                let before = track.momentum().vect();
                simulator.set_normal_vector(self.normal_vector);
                simulator
                    .update_state(track, radiation_lengths)
                    .map_err(MaterialError::simulator(Process::MultipleScattering))?;

                let deflection = opening_angle(&before, &track.momentum().vect());
                if deflection > 0.0 {
                    self.interaction_log.log(Interaction::MultipleScattering {
                        track: track_index,
                        layer: layer_number,
                        deflection,
                    });
                }
            }
        }

        Ok(Fate::Survives)
    }

    /// Flush job-wide simulator state
    ///
    /// Forwards to the nuclear interaction simulator, which persists its
    /// cascade library cursors. Call once at the end of a job.
    pub fn save(&mut self) -> Result<(), MaterialError> {
        match self.simulators.nuclear_interaction.as_mut() {
            Some(simulator) => simulator
                .save()
                .map_err(MaterialError::simulator(Process::NuclearInteraction)),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Corrected nominal thickness of the last crossing
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Ionization energy loss of the last crossing (GeV)
    pub fn energy_loss(&self) -> f64 {
        self.energy_loss
    }

    pub fn normal_vector(&self) -> Vector3 {
        self.normal_vector
    }

    pub fn pt_min(&self) -> f64 {
        self.pt_min
    }

    pub fn is_enabled(&self, process: Process) -> bool {
        match process {
            Process::PairProduction => self.simulators.pair_production.is_some(),
            Process::Bremsstrahlung => self.simulators.bremsstrahlung.is_some(),
            Process::EnergyLoss => self.simulators.energy_loss.is_some(),
            Process::MultipleScattering => self.simulators.multiple_scattering.is_some(),
            Process::NuclearInteraction => self.simulators.nuclear_interaction.is_some(),
        }
    }

    pub fn interaction_log(&self) -> &InteractionLog {
        &self.interaction_log
    }

    pub fn clear_interaction_log(&mut self) {
        self.interaction_log.clear();
    }
}

/// Move the secondaries of `simulator` into `event` under a new vertex at
/// the position of `track`
fn record_secondaries<E: EventSink + ?Sized>(
    event: &mut E,
    simulator: &mut dyn MaterialEffectsSimulator,
    track: &ParticleTrack,
    parent: TrackIndex,
) -> VertexIndex {
    let position: FourVector = *track.position();
    let vertex = event.add_vertex(position, parent);
    for daughter in simulator.take_daughters() {
        let index = event.add_track(daughter, vertex);
        log::trace!("vertex {}: added track {}", vertex, index);
    }
    vertex
}

/// Angle between two directions (rad); zero when either is null
fn opening_angle(a: &Vector3, b: &Vector3) -> f64 {
    let norm = a.mag() * b.mag();
    if norm > 0.0 {
        (a.dot(b) / norm).clamp(-1.0, 1.0).acos()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Daughter, SimEvent, TrackerLayer};
    use crate::rng;
    use crate::simulators::MockSimulator;

    fn electron_at(r: f64) -> ParticleTrack {
        ParticleTrack::new(
            FourVector::from_momentum(Vector3::new(5.0, 0.0, 0.0), 0.000_511),
            FourVector::new(r, 0.0, 0.0, 0.0),
            11,
            -1.0,
        )
    }

    #[test]
    fn test_opening_angle() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 2.0, 0.0);
        assert!((opening_angle(&x, &y) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(opening_angle(&x, &x), 0.0);
        assert_eq!(opening_angle(&x, &Vector3::ZERO), 0.0);
    }

    #[test]
    fn test_fate_vertex() {
        assert_eq!(Fate::Survives.vertex(), None);
        assert_eq!(Fate::Absorbed(VertexIndex(3)).vertex(), Some(VertexIndex(3)));
        assert!(!Fate::Converted(VertexIndex(1)).survives());
    }

    #[test]
    fn test_missing_option_is_fatal() {
        let mut config = MaterialEffectsConfig::disabled();
        config.bremsstrahlung = true;
        config.brem_energy = Some(0.1);
        let result = MaterialEffects::new(&config, rng::shared(1));
        assert!(matches!(
            result,
            Err(MaterialError::Config(ConfigError::MissingOption {
                option: "bremEnergyFraction",
                ..
            }))
        ));
    }

    #[test]
    fn test_state_is_reset_per_call() {
        let mut effects = MaterialEffects::with_simulators(
            SimulatorSet {
                energy_loss: Some(Box::new(MockSimulator::new().with_energy_loss(0.1))),
                ..Default::default()
            },
            999.0,
        );
        let mut event = SimEvent::new();
        let index = event.add_primary(
            Daughter::new(FourVector::new(5.0, 0.0, 0.0, 5.0), 11, -1.0),
            FourVector::default(),
        );

        let layer = TrackerLayer::barrel(2, 0.01, true);
        let mut track = electron_at(40.0);
        effects.interact(&mut event, &layer, &mut track, index).unwrap();
        assert!((effects.energy_loss() - 0.1).abs() < 1e-12);

        // zero material: the mock is not called and the loss resets
        let empty = TrackerLayer::barrel(3, 0.0, true);
        effects.interact(&mut event, &empty, &mut track, index).unwrap();
        assert_eq!(effects.energy_loss(), 0.0);
        assert_eq!(effects.normal_vector(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_simulator_failure_aborts_call() {
        let mut effects = MaterialEffects::with_simulators(
            SimulatorSet {
                bremsstrahlung: Some(Box::new(MockSimulator::new().failing("corrupt state"))),
                energy_loss: Some(Box::new(MockSimulator::new().with_energy_loss(0.1))),
                ..Default::default()
            },
            999.0,
        );
        let mut event = SimEvent::new();
        let layer = TrackerLayer::barrel(2, 0.01, true);
        let mut track = electron_at(40.0);
        let before = track.clone();

        let result = effects.interact(&mut event, &layer, &mut track, TrackIndex(0));
        assert!(matches!(
            result,
            Err(MaterialError::Simulator {
                process: Process::Bremsstrahlung,
                ..
            })
        ));
        assert_eq!(track, before);
        assert!(effects.interaction_log().is_empty());
    }
}
