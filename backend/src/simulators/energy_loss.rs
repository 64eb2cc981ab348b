//! Ionization energy loss
//!
//! Mean loss per radiation length of silicon at minimum ionization, scaled
//! by `1/beta^2` and smeared by a Gaussian fluctuation. The particle keeps
//! its direction; the energy never drops below the mass.

use super::{MaterialEffectsSimulator, SimulatorError};
use crate::models::{Daughter, ParticleTrack};
use crate::rng::SharedRng;

/// Minimum-ionizing loss in silicon per radiation length (GeV)
pub const DEDX_PER_RADIATION_LENGTH: f64 = 0.0362;

/// Relative width of the loss fluctuation
const RELATIVE_FLUCTUATION: f64 = 0.1;

/// Below this velocity the 1/beta^2 scaling is frozen
const BETA_MIN: f64 = 0.1;

pub struct EnergyLossSimulator {
    rng: SharedRng,
    daughters: Vec<Daughter>,
}

impl EnergyLossSimulator {
    pub fn new(rng: SharedRng) -> Self {
        Self {
            rng,
            daughters: Vec::new(),
        }
    }

    /// Mean ionization loss over `radiation_lengths` for velocity `beta`
    pub fn mean_loss(radiation_lengths: f64, beta: f64) -> f64 {
        let beta = beta.clamp(BETA_MIN, 1.0);
        DEDX_PER_RADIATION_LENGTH * radiation_lengths / (beta * beta)
    }
}

impl MaterialEffectsSimulator for EnergyLossSimulator {
    fn compute(
        &mut self,
        track: &mut ParticleTrack,
        radiation_lengths: f64,
    ) -> Result<(), SimulatorError> {
        let energy = track.e();
        let mass = track.mass();
        if energy <= mass || energy <= 0.0 {
            return Ok(());
        }

        let beta = track.p() / energy;
        let mean = Self::mean_loss(radiation_lengths, beta);
        let loss = self
            .rng
            .borrow_mut()
            .gaussian(mean, RELATIVE_FLUCTUATION * mean)
            .clamp(0.0, energy - mass);

        track.set_energy(energy - loss);
        Ok(())
    }

    fn daughters(&self) -> &[Daughter] {
        &self.daughters
    }

    fn daughter_buffer(&mut self) -> &mut Vec<Daughter> {
        &mut self.daughters
    }
}
