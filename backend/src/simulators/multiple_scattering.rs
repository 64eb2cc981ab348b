//! Multiple Coulomb scattering
//!
//! Gaussian approximation with the Highland width
//! `theta0 = 0.0136 / (beta p) * |q| * sqrt(X) * (1 + 0.038 ln X)`.
//! Two independent projected angles are drawn in the plane transverse to
//! the momentum. The first axis of that plane is built from the layer normal
//! set by the orchestrator before each update.

use super::{orthogonal_axis, MaterialEffectsSimulator, SimulatorError};
use crate::core::Vector3;
use crate::models::{Daughter, ParticleTrack};
use crate::rng::SharedRng;

/// Highland scale (GeV)
const HIGHLAND_SCALE: f64 = 0.0136;

/// Logarithmic correction coefficient
const HIGHLAND_LOG_TERM: f64 = 0.038;

pub struct MultipleScatteringSimulator {
    normal: Vector3,
    rng: SharedRng,
    daughters: Vec<Daughter>,
}

impl MultipleScatteringSimulator {
    pub fn new(rng: SharedRng) -> Self {
        Self {
            normal: Vector3::new(0.0, 0.0, 1.0),
            rng,
            daughters: Vec::new(),
        }
    }

    /// Reference normal currently in use
    pub fn normal_vector(&self) -> Vector3 {
        self.normal
    }

    /// RMS projected scattering angle (rad)
    pub fn highland_width(p: f64, beta: f64, charge: f64, radiation_lengths: f64) -> f64 {
        if p <= 0.0 || beta <= 0.0 || radiation_lengths <= 0.0 {
            return 0.0;
        }
        let correction = (1.0 + HIGHLAND_LOG_TERM * radiation_lengths.ln()).max(0.0);
        HIGHLAND_SCALE / (beta * p) * charge.abs() * radiation_lengths.sqrt() * correction
    }
}

impl MaterialEffectsSimulator for MultipleScatteringSimulator {
    fn compute(
        &mut self,
        track: &mut ParticleTrack,
        radiation_lengths: f64,
    ) -> Result<(), SimulatorError> {
        let p = track.p();
        let energy = track.e();
        let Some(direction) = track.momentum().vect().unit() else {
            return Ok(());
        };

        let theta0 = Self::highland_width(p, p / energy, track.charge(), radiation_lengths);
        if theta0 <= 0.0 {
            return Ok(());
        }

        let (theta_u, theta_v) = {
            let mut rng = self.rng.borrow_mut();
            (rng.gaussian(0.0, theta0), rng.gaussian(0.0, theta0))
        };

        let u = orthogonal_axis(&direction, &self.normal);
        let v = direction.cross(&u);
        let deflected = direction + u * theta_u.tan() + v * theta_v.tan();
        track.set_direction(deflected);
        Ok(())
    }

    fn daughters(&self) -> &[Daughter] {
        &self.daughters
    }

    fn daughter_buffer(&mut self) -> &mut Vec<Daughter> {
        &mut self.daughters
    }

    fn set_normal_vector(&mut self, normal: Vector3) {
        self.normal = normal;
    }
}
