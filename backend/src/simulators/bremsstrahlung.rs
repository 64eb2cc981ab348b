//! Photon radiation off electrons and positrons
//!
//! # Behavior
//!
//! - Photons softer than `max(brem_energy / E, brem_energy_fraction) * E`
//!   are not simulated
//! - The number of radiated photons is Poisson distributed with mean
//!   `X * (4/3 ln(1/x_min) - 4/3 (1 - x_min) + 1/2 (1 - x_min^2))`
//! - Photon energy fractions follow `x = x_min^u`, accepted with weight
//!   `1 - x + 3/4 x^2`
//! - Photons leave along the electron direction; the electron keeps its
//!   direction and loses the radiated energy (never going below its mass)

use super::{MaterialEffectsSimulator, SimulatorError};
use crate::core::FourVector;
use crate::models::track::PHOTON_PID;
use crate::models::{Daughter, ParticleTrack};
use crate::rng::SharedRng;

pub struct BremsstrahlungSimulator {
    /// Minimum photon energy (GeV)
    photon_energy_min: f64,
    /// Minimum photon energy as a fraction of the electron energy
    photon_fraction_min: f64,
    rng: SharedRng,
    daughters: Vec<Daughter>,
}

impl BremsstrahlungSimulator {
    pub fn new(photon_energy_min: f64, photon_fraction_min: f64, rng: SharedRng) -> Self {
        Self {
            photon_energy_min,
            photon_fraction_min,
            rng,
            daughters: Vec::new(),
        }
    }

    /// Mean number of photons above `x_min` radiated over `radiation_lengths`
    pub fn mean_photon_count(radiation_lengths: f64, x_min: f64) -> f64 {
        radiation_lengths
            * (4.0 / 3.0 * (1.0 / x_min).ln() - 4.0 / 3.0 * (1.0 - x_min)
                + 0.5 * (1.0 - x_min * x_min))
    }

    fn photon_fraction(&self, x_min: f64) -> f64 {
        let mut rng = self.rng.borrow_mut();
        loop {
            let x = x_min * (-x_min.ln() * rng.next_f64()).exp();
            let weight = 1.0 - x + 0.75 * x * x;
            if weight >= rng.next_f64() {
                return x;
            }
        }
    }
}

impl MaterialEffectsSimulator for BremsstrahlungSimulator {
    fn compute(
        &mut self,
        track: &mut ParticleTrack,
        radiation_lengths: f64,
    ) -> Result<(), SimulatorError> {
        let energy = track.e();
        if energy <= 0.0 {
            return Ok(());
        }

        let x_min = (self.photon_energy_min / energy).max(self.photon_fraction_min);
        if x_min >= 1.0 || x_min <= 0.0 {
            return Ok(());
        }

        let n_photons = self
            .rng
            .borrow_mut()
            .poisson(Self::mean_photon_count(radiation_lengths, x_min));

        let mass = track.mass();
        for _ in 0..n_photons {
            let current = track.e();
            let Some(direction) = track.momentum().vect().unit() else {
                break;
            };

            let available = current - mass;
            let photon_energy = (self.photon_fraction(x_min) * current).min(available);
            if photon_energy <= 0.0 {
                break;
            }

            let p = direction * photon_energy;
            self.daughters.push(Daughter::new(
                FourVector::new(p.x, p.y, p.z, photon_energy),
                PHOTON_PID,
                0.0,
            ));
            track.set_energy(current - photon_energy);
        }

        Ok(())
    }

    fn daughters(&self) -> &[Daughter] {
        &self.daughters
    }

    fn daughter_buffer(&mut self) -> &mut Vec<Daughter> {
        &mut self.daughters
    }
}
