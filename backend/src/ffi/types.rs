//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and Python dicts. Four-vectors cross the
//! boundary as `(x, y, z, t)` tuples, three-vectors as `(x, y, z)`.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::core::{FourVector, Vector3};
use crate::models::{Daughter, Interaction, ParticleTrack, SimTrack, SimVertex, TrackerLayer};
use crate::orchestrator::MaterialEffectsConfig;

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a required field from a Python dict.
///
/// # Errors
/// Returns PyValueError if the field is missing, or the conversion error.
fn extract_required<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<T>
where
    for<'py> T: pyo3::FromPyObject<'py, 'py, Error = PyErr>,
{
    dict.get_item(key)?
        .ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Missing required field '{}'", key))
        })?
        .extract()
}

/// Extract an optional field from a Python dict.
///
/// A missing key and an explicit `None` both give `Ok(None)`.
fn extract_optional<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    for<'py> T: pyo3::FromPyObject<'py, 'py, Error = PyErr>,
{
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

/// Extract a field with a default value if missing.
fn extract_with_default<T>(dict: &Bound<'_, PyDict>, key: &str, default: T) -> PyResult<T>
where
    for<'py> T: pyo3::FromPyObject<'py, 'py, Error = PyErr>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

fn four_vector(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<FourVector> {
    let (x, y, z, t): (f64, f64, f64, f64) = extract_required(dict, key)?;
    Ok(FourVector::new(x, y, z, t))
}

fn four_vector_tuple(v: &FourVector) -> (f64, f64, f64, f64) {
    (v.x, v.y, v.z, v.t)
}

// ========================================================================
// Parsers
// ========================================================================

/// Convert Python dict to MaterialEffectsConfig
///
/// Keys are the job option names (`PairProduction`, `photonEnergy`, ...).
/// The five process flags are required, as in the JSON job file. Option
/// consistency is checked when the orchestrator is built.
pub fn parse_material_config(py_config: &Bound<'_, PyDict>) -> PyResult<MaterialEffectsConfig> {
    Ok(MaterialEffectsConfig {
        pair_production: extract_required(py_config, "PairProduction")?,
        bremsstrahlung: extract_required(py_config, "Bremsstrahlung")?,
        energy_loss: extract_required(py_config, "EnergyLoss")?,
        multiple_scattering: extract_required(py_config, "MultipleScattering")?,
        nuclear_interaction: extract_required(py_config, "NuclearInteraction")?,
        photon_energy: extract_optional(py_config, "photonEnergy")?,
        brem_energy: extract_optional(py_config, "bremEnergy")?,
        brem_energy_fraction: extract_optional(py_config, "bremEnergyFraction")?,
        pt_min: extract_optional(py_config, "pTmin")?,
        pion_energy: extract_optional(py_config, "pionEnergy")?,
        length_ratio: extract_optional(py_config, "lengthRatio")?,
        file_names: extract_optional(py_config, "fileNames")?,
        pion_energies: extract_optional(py_config, "pionEnergies")?,
        ratio_ratio: extract_optional(py_config, "ratioRatio")?,
        input_file: extract_optional(py_config, "inputFile")?,
    })
}

/// Convert Python dict to TrackerLayer
///
/// Required: `layer_number`, `radiation_length`. Optional: `sensitive`,
/// `forward`, `disk_normal` (3-tuple).
pub fn parse_layer(py_layer: &Bound<'_, PyDict>) -> PyResult<TrackerLayer> {
    let disk_normal: Option<(f64, f64, f64)> = extract_optional(py_layer, "disk_normal")?;
    Ok(TrackerLayer {
        layer_number: extract_required(py_layer, "layer_number")?,
        radiation_length: extract_required(py_layer, "radiation_length")?,
        sensitive: extract_with_default(py_layer, "sensitive", false)?,
        forward: extract_with_default(py_layer, "forward", false)?,
        disk_normal: disk_normal.map(|(x, y, z)| Vector3::new(x, y, z)),
    })
}

/// Convert Python dict to ParticleTrack
///
/// Required: `momentum`, `position` (4-tuples), `pid`. Optional: `charge`.
pub fn parse_track(py_track: &Bound<'_, PyDict>) -> PyResult<ParticleTrack> {
    Ok(ParticleTrack::new(
        four_vector(py_track, "momentum")?,
        four_vector(py_track, "position")?,
        extract_required(py_track, "pid")?,
        extract_with_default(py_track, "charge", 0.0)?,
    ))
}

/// Convert Python dict to Daughter (primary particle)
pub fn parse_daughter(py_particle: &Bound<'_, PyDict>) -> PyResult<Daughter> {
    Ok(Daughter::new(
        four_vector(py_particle, "momentum")?,
        extract_required(py_particle, "pid")?,
        extract_with_default(py_particle, "charge", 0.0)?,
    ))
}

// ========================================================================
// Converters
// ========================================================================

pub fn track_to_py<'py>(py: Python<'py>, track: &ParticleTrack) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("momentum", four_vector_tuple(track.momentum()))?;
    dict.set_item("position", four_vector_tuple(track.position()))?;
    dict.set_item("pid", track.pid())?;
    dict.set_item("charge", track.charge())?;
    Ok(dict)
}

pub fn sim_track_to_py<'py>(py: Python<'py>, track: &SimTrack) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("id", track.id.0)?;
    dict.set_item("momentum", four_vector_tuple(&track.momentum))?;
    dict.set_item("pid", track.pid)?;
    dict.set_item("charge", track.charge)?;
    dict.set_item("origin", track.origin.map(|v| v.0))?;
    Ok(dict)
}

pub fn vertex_to_py<'py>(py: Python<'py>, vertex: &SimVertex) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("id", vertex.id().0)?;
    dict.set_item("position", four_vector_tuple(vertex.position()))?;
    dict.set_item("parent", vertex.parent().map(|t| t.0))?;
    let daughters: Vec<usize> = vertex.daughters().iter().map(|t| t.0).collect();
    dict.set_item("daughters", daughters)?;
    Ok(dict)
}

/// Convert an interaction record to a Python dict
///
/// Always carries `type`, `track` and `layer`; the remaining keys depend on
/// the interaction type.
pub fn interaction_to_py<'py>(
    py: Python<'py>,
    interaction: &Interaction,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("type", interaction.interaction_type())?;
    dict.set_item("track", interaction.track().0)?;
    dict.set_item("layer", interaction.layer())?;
    if let Some(vertex) = interaction.vertex() {
        dict.set_item("vertex", vertex.0)?;
    }

    match interaction {
        Interaction::PairConversion { n_daughters, .. } => {
            dict.set_item("n_daughters", *n_daughters)?;
        }
        Interaction::NuclearInteraction {
            n_daughters, scale, ..
        } => {
            dict.set_item("n_daughters", *n_daughters)?;
            dict.set_item("scale", *scale)?;
        }
        Interaction::Bremsstrahlung { n_photons, .. } => {
            dict.set_item("n_photons", *n_photons)?;
        }
        Interaction::EnergyLoss { delta, .. } => {
            dict.set_item("delta", *delta)?;
        }
        Interaction::MultipleScattering { deflection, .. } => {
            dict.set_item("deflection", *deflection)?;
        }
    }

    Ok(dict)
}

/// Collect converted items into a Python list
pub fn to_py_list<'py, T, F>(py: Python<'py>, items: &[T], convert: F) -> PyResult<Bound<'py, PyList>>
where
    F: Fn(Python<'py>, &T) -> PyResult<Bound<'py, PyDict>>,
{
    let py_list = PyList::empty(py);
    for item in items {
        py_list.append(convert(py, item)?)?;
    }
    Ok(py_list)
}
