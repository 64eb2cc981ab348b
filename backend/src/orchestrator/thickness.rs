//! Effective thickness of a layer crossing
//!
//! Converts the nominal material budget of a layer into the radiation
//! lengths actually traversed by a track:
//!
//! ```text
//! radiation_lengths = nominal * |P| / |P . n| * correction(R, z, sensitive)
//! ```
//!
//! `n` is the disk normal for forward layers and the radial unit vector at
//! the track position for barrel layers. The correction factor is a
//! calibration map of the tracker material, selected by disjoint zones in
//! `(R, |z|)` (cm).
//!
//! # Degenerate geometry
//!
//! `|P . n|` is clamped from below to `MIN_COS_THETA * |P|`. Grazing
//! crossings and tracks sitting on the beam axis (no radial direction)
//! therefore get a large but finite thickness. A track at rest crosses no
//! material.

use crate::core::Vector3;
use crate::models::{Layer, ParticleTrack};
use thiserror::Error;

/// Lower bound on the cosine between momentum and layer normal
pub const MIN_COS_THETA: f64 = 1e-3;

/// Corrections apply beyond this radius (cm)
const CORRECTION_R_MIN: f64 = 16.0;

/// Corrections apply below this |z| (cm)
const CORRECTION_Z_MAX: f64 = 299.0;

/// Insensitive layers carrying a nuclear-interaction correction
const NUCLEAR_LAYER_ENDCAP_SUPPORT: u32 = 107;
const NUCLEAR_LAYER_BARREL_SUPPORT: u32 = 113;
const NUCLEAR_LAYER_NO_INTERACTION: u32 = 115;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Forward layer {layer} has no disk normal")]
    MissingDiskNormal { layer: u32 },
}

/// Result of the thickness calculation for one track-layer pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveThickness {
    /// Radiation lengths traversed along the track
    pub radiation_lengths: f64,
    /// Nominal thickness times the correction factor
    pub thickness: f64,
    /// Layer normal used for the path length
    pub normal: Vector3,
}

/// Calibration zone of the tracker material map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionZone {
    /// Endcap cables and services, sensitive layers beyond |z| = 122
    EndcapCables,
    /// Central tracker barrel, sensitive layers within |z| < 20
    TrackerBarrel,
    /// Outer barrel cables, R > 118
    OuterCables,
    /// Pixel barrel, R < 18 and |z| < 26
    PixelBarrel,
}

impl CorrectionZone {
    /// First matching zone, in priority order
    pub fn classify(r: f64, z: f64, sensitive: bool) -> Option<CorrectionZone> {
        let z = z.abs();
        if r <= CORRECTION_R_MIN || z >= CORRECTION_Z_MAX {
            return None;
        }

        if z > 122.0 && sensitive {
            Some(CorrectionZone::EndcapCables)
        } else if z < 20.0 && sensitive {
            Some(CorrectionZone::TrackerBarrel)
        } else if r > 118.0 && z < 250.0 {
            Some(CorrectionZone::OuterCables)
        } else if r < 18.0 && z < 26.0 {
            Some(CorrectionZone::PixelBarrel)
        } else {
            None
        }
    }

    /// Factor applied inside the zone; 1 where the zone has no entry
    pub fn factor(&self, r: f64, z: f64) -> f64 {
        let z = z.abs();
        match self {
            CorrectionZone::EndcapCables => {
                if z < 165.0 {
                    if r < 24.0 {
                        3.0
                    } else {
                        1.0
                    }
                } else if r < 32.5 {
                    3.0
                } else if (z > 220.0 && r < 45.0) || (z > 250.0 && r < 54.0) {
                    0.3
                } else {
                    1.0
                }
            }
            CorrectionZone::TrackerBarrel => {
                if r > 55.0 {
                    0.50
                } else if z < 10.0 {
                    0.77
                } else {
                    1.0
                }
            }
            CorrectionZone::OuterCables => {
                if z < 116.0 {
                    0.225 * 0.75
                } else {
                    0.75
                }
            }
            CorrectionZone::PixelBarrel => 0.08,
        }
    }
}

/// Correction factor at `(r, z)` for a layer of the given sensitivity
pub fn correction_factor(r: f64, z: f64, sensitive: bool) -> f64 {
    CorrectionZone::classify(r, z, sensitive).map_or(1.0, |zone| zone.factor(r, z))
}

/// Normal of `layer` at the position of `track`
///
/// Barrel layers on the beam axis have no radial direction and yield the
/// null vector.
pub fn normal_vector<L: Layer + ?Sized>(
    layer: &L,
    track: &ParticleTrack,
) -> Result<Vector3, GeometryError> {
    if layer.is_forward() {
        return layer.disk_normal().ok_or(GeometryError::MissingDiskNormal {
            layer: layer.layer_number(),
        });
    }

    let position = track.position().vect();
    let r = position.perp();
    if r > 0.0 {
        Ok(Vector3::new(position.x / r, position.y / r, 0.0))
    } else {
        Ok(Vector3::ZERO)
    }
}

/// Radiation lengths traversed by `track` crossing `layer`
///
/// # Errors
///
/// `GeometryError::MissingDiskNormal` for a forward layer without normal.
pub fn compute_effective_thickness<L: Layer + ?Sized>(
    layer: &L,
    track: &ParticleTrack,
) -> Result<EffectiveThickness, GeometryError> {
    let nominal = layer.radiation_length();
    let normal = normal_vector(layer, track)?;
    let factor = correction_factor(track.r(), track.z(), layer.is_sensitive());
    let thickness = nominal * factor;

    let momentum = track.momentum().vect();
    let p = momentum.mag();
    if p <= 0.0 || !p.is_finite() {
        log::debug!(
            "layer {}: track at rest crosses no material",
            layer.layer_number()
        );
        return Ok(EffectiveThickness {
            radiation_lengths: 0.0,
            thickness,
            normal,
        });
    }

    let cos_p = momentum.dot(&normal).abs();
    let floor = MIN_COS_THETA * p;
    if cos_p < floor {
        log::debug!(
            "layer {}: grazing crossing (|P.n| = {:.3e}, |P| = {:.3e}), path length clamped",
            layer.layer_number(),
            cos_p,
            p
        );
    }

    let radiation_lengths = (nominal / cos_p.max(floor) * p * factor).max(0.0);
    Ok(EffectiveThickness {
        radiation_lengths,
        thickness,
        normal,
    })
}

/// Scale applied to the radiation length seen by nuclear interactions
///
/// Only insensitive support layers carry a correction:
/// - layer 107: `1 + max(0, eta - 2.2) * 3`
/// - layer 113: 1.4 beyond |z| = 116, 0.6 otherwise
/// - layer 115: 0
pub fn nuclear_scale_factor<L: Layer + ?Sized>(layer: &L, track: &ParticleTrack) -> f64 {
    if layer.is_sensitive() {
        return 1.0;
    }

    match layer.layer_number() {
        NUCLEAR_LAYER_ENDCAP_SUPPORT => 1.0 + (track.position_eta() - 2.2).max(0.0) * 3.0,
        NUCLEAR_LAYER_BARREL_SUPPORT => {
            // the larger scale belongs to the outer |z| region
            if track.z().abs() > 116.0 {
                1.4
            } else {
                0.6
            }
        }
        NUCLEAR_LAYER_NO_INTERACTION => 0.0,
        _ => 1.0,
    }
}
