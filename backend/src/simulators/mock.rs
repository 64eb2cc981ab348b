//! Scripted simulator for tests
//!
//! Emits a fixed set of daughters on every update, optionally removes a
//! fixed amount of energy, and records every call through a [`MockProbe`]
//! that stays readable after the simulator has been boxed and handed to the
//! orchestrator.
//!
//! # Example
//!
//! ```rust
//! use material_effects_core_rs::simulators::{MaterialEffectsSimulator, MockSimulator};
//! use material_effects_core_rs::{FourVector, ParticleTrack};
//!
//! let mut sim = MockSimulator::new().with_energy_loss(0.25);
//! let probe = sim.probe();
//!
//! let mut track = ParticleTrack::new(
//!     FourVector::new(0.0, 0.0, 2.0, 2.0),
//!     FourVector::default(),
//!     13,
//!     -1.0,
//! );
//! sim.update_state(&mut track, 0.1).unwrap();
//!
//! assert_eq!(probe.n_calls(), 1);
//! assert!((track.e() - 1.75).abs() < 1e-12);
//! ```

use super::{MaterialEffectsSimulator, SimulatorError};
use crate::core::Vector3;
use crate::models::{Daughter, ParticleTrack};
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded update
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub pid: i32,
    pub radiation_lengths: f64,
    /// Normal vector set before the update, if any
    pub normal: Option<Vector3>,
}

/// Shared view on the calls received by a [`MockSimulator`]
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    calls: Rc<RefCell<Vec<MockCall>>>,
}

impl MockProbe {
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.borrow().clone()
    }

    pub fn n_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last(&self) -> Option<MockCall> {
        self.calls.borrow().last().cloned()
    }
}

#[derive(Debug, Default)]
pub struct MockSimulator {
    template: Vec<Daughter>,
    energy_loss: f64,
    failure: Option<String>,
    normal: Option<Vector3>,
    probe: MockProbe,
    daughters: Vec<Daughter>,
}

impl MockSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `daughters` on every update
    pub fn with_daughters(mut self, daughters: Vec<Daughter>) -> Self {
        self.template = daughters;
        self
    }

    /// Remove `energy` GeV from the track on every update
    pub fn with_energy_loss(mut self, energy: f64) -> Self {
        self.energy_loss = energy;
        self
    }

    /// Fail every update with `message`
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }
}

impl MaterialEffectsSimulator for MockSimulator {
    fn compute(
        &mut self,
        track: &mut ParticleTrack,
        radiation_lengths: f64,
    ) -> Result<(), SimulatorError> {
        self.probe.calls.borrow_mut().push(MockCall {
            pid: track.pid(),
            radiation_lengths,
            normal: self.normal,
        });

        if let Some(message) = &self.failure {
            return Err(SimulatorError::InvalidTrack(message.clone()));
        }

        if self.energy_loss > 0.0 {
            track.set_energy(track.e() - self.energy_loss);
        }
        self.daughters.extend(self.template.iter().cloned());
        Ok(())
    }

    fn daughters(&self) -> &[Daughter] {
        &self.daughters
    }

    fn daughter_buffer(&mut self) -> &mut Vec<Daughter> {
        &mut self.daughters
    }

    fn set_normal_vector(&mut self, normal: Vector3) {
        self.normal = Some(normal);
    }
}
