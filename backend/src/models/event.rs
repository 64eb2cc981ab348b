//! Interaction history for diagnostics and auditing.
//!
//! Every process that fires during an `interact` call is recorded as an
//! [`Interaction`]. The log complements the event history (which only sees
//! vertices and secondaries) with the non-destructive effects: energy loss
//! and multiple scattering leave no vertex behind but are still logged here.
//!
//! # Example
//!
//! ```rust
//! use material_effects_core_rs::models::{Interaction, InteractionLog};
//! use material_effects_core_rs::TrackIndex;
//!
//! let mut log = InteractionLog::new();
//! log.log(Interaction::EnergyLoss {
//!     track: TrackIndex(0),
//!     layer: 5,
//!     delta: 0.0012,
//! });
//!
//! assert_eq!(log.len(), 1);
//! assert_eq!(log.events()[0].interaction_type(), "EnergyLoss");
//! ```

use crate::models::track::TrackIndex;
use crate::models::vertex::VertexIndex;
use serde::{Deserialize, Serialize};

/// Material effect applied to a track in one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Interaction {
    /// Photon converted into an electron-positron pair
    PairConversion {
        track: TrackIndex,
        layer: u32,
        vertex: VertexIndex,
        n_daughters: usize,
    },

    /// Hadron absorbed by a nuclear interaction
    NuclearInteraction {
        track: TrackIndex,
        layer: u32,
        vertex: VertexIndex,
        n_daughters: usize,
        /// Layer-specific scale applied to the radiation length
        scale: f64,
    },

    /// Electron radiated photons and continues
    Bremsstrahlung {
        track: TrackIndex,
        layer: u32,
        vertex: VertexIndex,
        n_photons: usize,
    },

    /// Ionization energy loss (GeV)
    EnergyLoss {
        track: TrackIndex,
        layer: u32,
        delta: f64,
    },

    /// Direction perturbed by multiple scattering
    MultipleScattering {
        track: TrackIndex,
        layer: u32,
        /// Angle between incoming and outgoing direction (rad)
        deflection: f64,
    },
}

impl Interaction {
    /// Track the interaction applied to
    pub fn track(&self) -> TrackIndex {
        match self {
            Interaction::PairConversion { track, .. } => *track,
            Interaction::NuclearInteraction { track, .. } => *track,
            Interaction::Bremsstrahlung { track, .. } => *track,
            Interaction::EnergyLoss { track, .. } => *track,
            Interaction::MultipleScattering { track, .. } => *track,
        }
    }

    /// Layer where the interaction happened
    pub fn layer(&self) -> u32 {
        match self {
            Interaction::PairConversion { layer, .. } => *layer,
            Interaction::NuclearInteraction { layer, .. } => *layer,
            Interaction::Bremsstrahlung { layer, .. } => *layer,
            Interaction::EnergyLoss { layer, .. } => *layer,
            Interaction::MultipleScattering { layer, .. } => *layer,
        }
    }

    /// Vertex created by the interaction, if any
    pub fn vertex(&self) -> Option<VertexIndex> {
        match self {
            Interaction::PairConversion { vertex, .. } => Some(*vertex),
            Interaction::NuclearInteraction { vertex, .. } => Some(*vertex),
            Interaction::Bremsstrahlung { vertex, .. } => Some(*vertex),
            _ => None,
        }
    }

    /// Short name of the interaction type
    pub fn interaction_type(&self) -> &'static str {
        match self {
            Interaction::PairConversion { .. } => "PairConversion",
            Interaction::NuclearInteraction { .. } => "NuclearInteraction",
            Interaction::Bremsstrahlung { .. } => "Bremsstrahlung",
            Interaction::EnergyLoss { .. } => "EnergyLoss",
            Interaction::MultipleScattering { .. } => "MultipleScattering",
        }
    }
}

/// Ordered record of interactions
#[derive(Debug, Clone, Default)]
pub struct InteractionLog {
    events: Vec<Interaction>,
}

impl InteractionLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an interaction
    pub fn log(&mut self, event: Interaction) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Interaction] {
        &self.events
    }

    /// Interactions that applied to a given track
    pub fn events_for_track(&self, track: TrackIndex) -> Vec<&Interaction> {
        self.events.iter().filter(|e| e.track() == track).collect()
    }

    /// Interactions of a given type
    pub fn events_of_type(&self, interaction_type: &str) -> Vec<&Interaction> {
        self.events
            .iter()
            .filter(|e| e.interaction_type() == interaction_type)
            .collect()
    }

    /// Total ionization loss recorded for a track
    pub fn total_energy_loss(&self, track: TrackIndex) -> f64 {
        self.events
            .iter()
            .filter_map(|e| match e {
                Interaction::EnergyLoss { track: t, delta, .. } if *t == track => Some(*delta),
                _ => None,
            })
            .sum()
    }

    /// Clear all entries (typically between events)
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
