//! Particle tracks
//!
//! Three flavours of track appear in the engine:
//!
//! - [`ParticleTrack`]: the in-flight particle being propagated through a
//!   layer. Borrowed mutably by the orchestrator for one `interact` call.
//! - [`Daughter`]: a secondary candidate produced by a simulator, handed
//!   over to the event sink.
//! - [`SimTrack`]: a track as stored in the event history.

use crate::core::{FourVector, Vector3};
use crate::models::vertex::VertexIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PDG code of the photon
pub const PHOTON_PID: i32 = 22;

/// PDG code of the electron (positron is `-ELECTRON_PID`)
pub const ELECTRON_PID: i32 = 11;

/// Electron mass (GeV)
pub const ELECTRON_MASS: f64 = 0.000_510_998_95;

/// Lower bound (exclusive) of the hadron PDG code range
pub const HADRON_PID_MIN: i32 = 100;

/// Upper bound (exclusive) of the hadron PDG code range
pub const HADRON_PID_MAX: i32 = 1_000_000;

/// Index of a track in the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackIndex(pub usize);

impl fmt::Display for TrackIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Particle crossing the detector
///
/// # Example
///
/// ```rust
/// use material_effects_core_rs::{FourVector, ParticleTrack};
///
/// let track = ParticleTrack::new(
///     FourVector::new(3.0, 4.0, 0.0, 5.0),
///     FourVector::new(30.0, 40.0, 10.0, 0.0),
///     211,
///     1.0,
/// );
/// assert_eq!(track.pt(), 5.0);
/// assert_eq!(track.r(), 50.0);
/// assert!(track.is_hadron());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleTrack {
    momentum: FourVector,
    position: FourVector,
    pid: i32,
    charge: f64,
}

impl ParticleTrack {
    pub fn new(momentum: FourVector, position: FourVector, pid: i32, charge: f64) -> Self {
        Self {
            momentum,
            position,
            pid,
            charge,
        }
    }

    pub fn momentum(&self) -> &FourVector {
        &self.momentum
    }

    /// Current space-time position
    pub fn position(&self) -> &FourVector {
        &self.position
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Energy
    pub fn e(&self) -> f64 {
        self.momentum.t
    }

    /// Momentum magnitude
    pub fn p(&self) -> f64 {
        self.momentum.p()
    }

    /// Transverse momentum
    pub fn pt(&self) -> f64 {
        self.momentum.perp()
    }

    pub fn mass(&self) -> f64 {
        self.momentum.mass()
    }

    /// Distance of the current position from the beam axis
    pub fn r(&self) -> f64 {
        self.position.perp()
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// Pseudorapidity of the current position seen from the origin
    pub fn position_eta(&self) -> f64 {
        self.position.eta()
    }

    pub fn is_photon(&self) -> bool {
        self.pid == PHOTON_PID
    }

    pub fn is_electron(&self) -> bool {
        self.pid.abs() == ELECTRON_PID
    }

    /// PDG code magnitude strictly inside (100, 1 000 000)
    pub fn is_hadron(&self) -> bool {
        let code = self.pid.abs();
        code > HADRON_PID_MIN && code < HADRON_PID_MAX
    }

    pub fn is_neutral(&self) -> bool {
        self.charge == 0.0
    }

    pub fn set_momentum(&mut self, momentum: FourVector) {
        self.momentum = momentum;
    }

    pub fn set_position(&mut self, position: FourVector) {
        self.position = position;
    }

    /// Set the energy, keeping the mass and the direction of flight
    ///
    /// Energies below the mass leave the particle at rest.
    pub fn set_energy(&mut self, energy: f64) {
        let mass = self.mass();
        let energy = energy.max(mass);
        let p_new = (energy * energy - mass * mass).max(0.0).sqrt();
        let direction = self.momentum.vect().unit().unwrap_or(Vector3::ZERO);
        let p = direction * p_new;
        self.momentum = FourVector::new(p.x, p.y, p.z, energy);
    }

    /// Replace the direction of flight, keeping |p| and the energy
    pub fn set_direction(&mut self, direction: Vector3) {
        if let Some(unit) = direction.unit() {
            let p = unit * self.p();
            self.momentum = FourVector::new(p.x, p.y, p.z, self.momentum.t);
        }
    }
}

impl fmt::Display for ParticleTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pid {} q {} p {} at {}",
            self.pid, self.charge, self.momentum, self.position
        )
    }
}

/// Secondary particle produced by a simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Daughter {
    pub momentum: FourVector,
    pub pid: i32,
    pub charge: f64,
}

impl Daughter {
    pub fn new(momentum: FourVector, pid: i32, charge: f64) -> Self {
        Self {
            momentum,
            pid,
            charge,
        }
    }
}

/// Track stored in the event history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimTrack {
    pub id: TrackIndex,
    pub momentum: FourVector,
    pub pid: i32,
    pub charge: f64,
    /// Vertex the track starts from
    pub origin: Option<VertexIndex>,
}

impl fmt::Display for SimTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            Some(origin) => write!(
                f,
                "track {} pid {} q {} p {} from vertex {}",
                self.id, self.pid, self.charge, self.momentum, origin
            ),
            None => write!(
                f,
                "track {} pid {} q {} p {} (no origin)",
                self.id, self.pid, self.charge, self.momentum
            ),
        }
    }
}
