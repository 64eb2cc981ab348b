//! Three- and four-vectors for particle kinematics
//!
//! Units follow the tracker convention: positions in cm, momenta and
//! energies in GeV. A `FourVector` is used both for momenta
//! (`x, y, z, t` = `px, py, pz, E`) and for space-time positions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Cartesian three-vector
///
/// # Example
/// ```
/// use material_effects_core_rs::Vector3;
///
/// let a = Vector3::new(3.0, 4.0, 0.0);
/// assert_eq!(a.mag(), 5.0);
/// assert_eq!(a.perp(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// Transverse component (distance from the z axis)
    pub fn perp(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector along `self`, or `None` for the null vector
    pub fn unit(&self) -> Option<Vector3> {
        let mag = self.mag();
        if mag > 0.0 && mag.is_finite() {
            Some(*self * (1.0 / mag))
        } else {
            None
        }
    }

    /// Pseudorapidity of the direction, `-ln tan(theta/2)`
    ///
    /// Vectors along the z axis return `±f64::MAX`-like large values
    /// rather than infinities; the null vector has eta 0.
    pub fn eta(&self) -> f64 {
        let perp = self.perp();
        if perp == 0.0 {
            return if self.z > 0.0 {
                1.0e10
            } else if self.z < 0.0 {
                -1.0e10
            } else {
                0.0
            };
        }
        (self.z / perp).asinh()
    }

    /// Rotate a vector expressed in the frame whose z axis is `direction`
    /// back into the lab frame
    ///
    /// `direction` must be a unit vector. Mirrors the usual "rotate u to z"
    /// construction: the local z axis maps onto `direction`, the local x
    /// axis stays in the plane spanned by `direction` and the lab z axis.
    pub fn rotate_uz(&self, direction: &Vector3) -> Vector3 {
        let (u1, u2, u3) = (direction.x, direction.y, direction.z);
        let up = u1 * u1 + u2 * u2;
        if up > 0.0 {
            let up = up.sqrt();
            let (px, py, pz) = (self.x, self.y, self.z);
            Vector3::new(
                (u1 * u3 * px - u2 * py) / up + u1 * pz,
                (u2 * u3 * px + u1 * py) / up + u2 * pz,
                -up * px + u3 * pz,
            )
        } else if u3 < 0.0 {
            Vector3::new(-self.x, self.y, -self.z)
        } else {
            *self
        }
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}

/// Lorentz four-vector `(x, y, z, t)`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FourVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
}

impl FourVector {
    pub const fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }

    /// Four-momentum of a particle of mass `mass` moving along `momentum`
    pub fn from_momentum(momentum: Vector3, mass: f64) -> Self {
        let e = (momentum.mag2() + mass * mass).sqrt();
        Self::new(momentum.x, momentum.y, momentum.z, e)
    }

    /// Spatial part
    pub fn vect(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Magnitude of the spatial part
    pub fn p(&self) -> f64 {
        self.vect().mag()
    }

    /// Transverse magnitude of the spatial part
    pub fn perp(&self) -> f64 {
        self.vect().perp()
    }

    pub fn eta(&self) -> f64 {
        self.vect().eta()
    }

    /// Invariant mass, clamped at zero for slightly space-like vectors
    pub fn mass(&self) -> f64 {
        let m2 = self.t * self.t - self.vect().mag2();
        if m2 > 0.0 {
            m2.sqrt()
        } else {
            0.0
        }
    }

    /// Scale all four components
    pub fn scaled(&self, factor: f64) -> FourVector {
        FourVector::new(
            self.x * factor,
            self.y * factor,
            self.z * factor,
            self.t * factor,
        )
    }
}

impl fmt::Display for FourVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.4}, {:.4}, {:.4}; {:.4})",
            self.x, self.y, self.z, self.t
        )
    }
}
