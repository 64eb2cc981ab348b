//! PyO3 wrapper for MaterialEffects
//!
//! Python drives the engine one layer crossing at a time. The wrapper owns
//! the event history the secondaries are written into.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{
    interaction_to_py, parse_daughter, parse_layer, parse_material_config, parse_track,
    sim_track_to_py, to_py_list, track_to_py, vertex_to_py,
};
use crate::models::{SimEvent, TrackIndex};
use crate::orchestrator::{Fate, MaterialEffects as RustMaterialEffects};
use crate::rng;

/// Python wrapper for the material effects orchestrator
///
/// # Example (from Python)
///
/// ```python
/// from material_effects_core_rs import MaterialEffects
///
/// flags = {"PairProduction": True, "Bremsstrahlung": False, "EnergyLoss": False,
///          "MultipleScattering": False, "NuclearInteraction": False}
/// effects = MaterialEffects.new({**flags, "photonEnergy": 0.1}, seed=42)
/// photon = {"momentum": (0.0, 5.0, 0.0, 5.0), "position": (0.0, 30.0, 0.0, 0.0), "pid": 22}
/// index = effects.add_primary(photon)
///
/// layer = {"layer_number": 4, "radiation_length": 0.05, "sensitive": True}
/// result = effects.interact(layer, photon, index)
/// print(result["fate"], len(effects.tracks()))
/// ```
#[pyclass(name = "MaterialEffects", unsendable)]
pub struct PyMaterialEffects {
    inner: RustMaterialEffects,
    event: SimEvent,
}

#[pymethods]
impl PyMaterialEffects {
    /// Create the orchestrator from a configuration dict and a seed
    ///
    /// # Errors
    ///
    /// Raises ValueError if an enabled process lacks an option, and
    /// RuntimeError if the nuclear cascade library cannot be loaded.
    #[staticmethod]
    fn new(config: &Bound<'_, PyDict>, seed: u64) -> PyResult<Self> {
        let rust_config = parse_material_config(config)?;

        let inner = RustMaterialEffects::new(&rust_config, rng::shared(seed)).map_err(|e| match e {
            crate::orchestrator::MaterialError::Config(_) => {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid configuration: {}", e))
            }
            _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Failed to create material effects: {}",
                e
            )),
        })?;

        Ok(PyMaterialEffects {
            inner,
            event: SimEvent::new(),
        })
    }

    /// Start a new event; the interaction history is cleared too
    fn new_event(&mut self) {
        self.event = SimEvent::new();
        self.inner.clear_interaction_log();
    }

    /// Identifier of the current event
    fn event_id(&self) -> String {
        self.event.id().to_string()
    }

    /// Add a primary particle and return its track index
    fn add_primary(&mut self, particle: &Bound<'_, PyDict>) -> PyResult<usize> {
        let daughter = parse_daughter(particle)?;
        let position = *parse_track(particle)?.position();
        Ok(self.event.add_primary(daughter, position).0)
    }

    /// Apply one layer to one track
    ///
    /// # Returns
    ///
    /// Dictionary with:
    /// - `fate`: "survives", "converted" or "absorbed"
    /// - `vertex`: end vertex index for destroyed tracks, else None
    /// - `track`: updated track dict
    /// - `energy_loss`: ionization loss in this crossing (GeV)
    /// - `thickness`: corrected nominal thickness
    fn interact(
        &mut self,
        py: Python,
        layer: &Bound<'_, PyDict>,
        track: &Bound<'_, PyDict>,
        track_index: usize,
    ) -> PyResult<Py<PyDict>> {
        let layer = parse_layer(layer)?;
        let mut particle = parse_track(track)?;

        let fate = self
            .inner
            .interact(&mut self.event, &layer, &mut particle, TrackIndex(track_index))
            .map_err(|e| {
                PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("Interaction failed: {}", e))
            })?;

        let dict = PyDict::new(py);
        let fate_name = match fate {
            Fate::Survives => "survives",
            Fate::Converted(_) => "converted",
            Fate::Absorbed(_) => "absorbed",
        };
        dict.set_item("fate", fate_name)?;
        dict.set_item("vertex", fate.vertex().map(|v| v.0))?;
        dict.set_item("track", track_to_py(py, &particle)?)?;
        dict.set_item("energy_loss", self.inner.energy_loss())?;
        dict.set_item("thickness", self.inner.thickness())?;
        Ok(dict.into())
    }

    /// All tracks of the current event
    fn tracks(&self, py: Python) -> PyResult<Py<PyList>> {
        Ok(to_py_list(py, self.event.tracks(), sim_track_to_py)?.into())
    }

    /// All vertices of the current event
    fn vertices(&self, py: Python) -> PyResult<Py<PyList>> {
        Ok(to_py_list(py, self.event.vertices(), vertex_to_py)?.into())
    }

    /// Processes that fired since the last `new_event`
    fn interactions(&self, py: Python) -> PyResult<Py<PyList>> {
        Ok(to_py_list(py, self.inner.interaction_log().events(), interaction_to_py)?.into())
    }

    /// Persist the nuclear cascade library cursors
    fn save(&mut self) -> PyResult<()> {
        self.inner.save().map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyIOError, _>(format!("Save failed: {}", e))
        })
    }

    fn energy_loss(&self) -> f64 {
        self.inner.energy_loss()
    }

    fn thickness(&self) -> f64 {
        self.inner.thickness()
    }

    fn pt_min(&self) -> f64 {
        self.inner.pt_min()
    }
}
