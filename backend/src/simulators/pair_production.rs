//! Photon conversion into an electron-positron pair
//!
//! # Behavior
//!
//! - Photons below the configured energy threshold never convert
//! - Conversion probability over `X` radiation lengths is `1 - exp(-7/9 X)`
//! - The photon energy is shared uniformly between the two leptons, which
//!   leave along the photon direction with an opening angle of `m_e / E`
//!
//! The photon itself is not modified: the orchestrator terminates it when
//! daughters are produced.

use super::{orthogonal_axis, MaterialEffectsSimulator, SimulatorError};
use crate::core::{FourVector, Vector3};
use crate::models::track::{ELECTRON_MASS, ELECTRON_PID};
use crate::models::{Daughter, ParticleTrack};
use crate::rng::SharedRng;

/// Mean free path for conversion, in radiation lengths, is 9/7
const CONVERSION_PER_RADIATION_LENGTH: f64 = 7.0 / 9.0;

pub struct PairProductionSimulator {
    /// Minimum photon energy for a conversion (GeV)
    photon_energy_min: f64,
    rng: SharedRng,
    daughters: Vec<Daughter>,
}

impl PairProductionSimulator {
    pub fn new(photon_energy_min: f64, rng: SharedRng) -> Self {
        Self {
            photon_energy_min,
            rng,
            daughters: Vec::new(),
        }
    }

    /// Probability that a photon converts within `radiation_lengths`
    pub fn conversion_probability(radiation_lengths: f64) -> f64 {
        1.0 - (-CONVERSION_PER_RADIATION_LENGTH * radiation_lengths).exp()
    }
}

impl MaterialEffectsSimulator for PairProductionSimulator {
    fn compute(
        &mut self,
        track: &mut ParticleTrack,
        radiation_lengths: f64,
    ) -> Result<(), SimulatorError> {
        let energy = track.e();
        if energy < self.photon_energy_min || energy <= 2.0 * ELECTRON_MASS {
            return Ok(());
        }

        let direction = track
            .momentum()
            .vect()
            .unit()
            .ok_or_else(|| SimulatorError::InvalidTrack("photon without direction".to_string()))?;

        let mut rng = self.rng.borrow_mut();
        if rng.next_f64() >= Self::conversion_probability(radiation_lengths) {
            return Ok(());
        }

        let fraction_min = ELECTRON_MASS / energy;
        let fraction = rng.flat(fraction_min, 1.0 - fraction_min);
        let phi = rng.flat(0.0, 2.0 * std::f64::consts::PI);
        drop(rng);

        let axis = orthogonal_axis(&direction, &Vector3::new(0.0, 0.0, 1.0));
        let binormal = direction.cross(&axis);
        let theta = ELECTRON_MASS / energy;

        for (share, sign, azimuth) in [
            (fraction, 1.0, phi),
            (1.0 - fraction, -1.0, phi + std::f64::consts::PI),
        ] {
            let lepton_energy = share * energy;
            let p = (lepton_energy * lepton_energy - ELECTRON_MASS * ELECTRON_MASS)
                .max(0.0)
                .sqrt();
            let transverse = axis * azimuth.cos() + binormal * azimuth.sin();
            let lepton_direction = (direction * theta.cos() + transverse * theta.sin())
                .unit()
                .unwrap_or(direction);
            let momentum = lepton_direction * p;
            // sign +1: electron (pid 11, charge -1); sign -1: positron
            self.daughters.push(Daughter::new(
                FourVector::new(momentum.x, momentum.y, momentum.z, lepton_energy),
                ELECTRON_PID * sign as i32,
                -sign,
            ));
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
