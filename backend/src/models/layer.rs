//! Tracker layer description
//!
//! The engine needs very little from the geometry: the nominal material
//! budget of the layer, whether it is a forward disk or a barrel cylinder,
//! whether it is instrumented, and its numeric identifier (some layers carry
//! dedicated nuclear-interaction corrections).

use crate::core::Vector3;
use serde::{Deserialize, Serialize};

/// Geometry contract consumed by the thickness calculator and orchestrator
pub trait Layer {
    /// Nominal thickness in radiation lengths
    fn radiation_length(&self) -> f64;

    /// Instrumented (sensitive) layer
    fn is_sensitive(&self) -> bool;

    /// Forward disk (`true`) or barrel cylinder (`false`)
    fn is_forward(&self) -> bool;

    /// Numeric layer identifier
    fn layer_number(&self) -> u32;

    /// Normal vector of a forward disk; `None` for barrel layers
    fn disk_normal(&self) -> Option<Vector3>;
}

/// Concrete layer description, loadable from JSON
///
/// # Example
///
/// ```rust
/// use material_effects_core_rs::{Layer, TrackerLayer, Vector3};
///
/// let barrel = TrackerLayer::barrel(5, 0.02, true);
/// assert!(!barrel.is_forward());
///
/// let disk = TrackerLayer::forward(107, 0.05, false, Vector3::new(0.0, 0.0, 1.0));
/// assert_eq!(disk.disk_normal(), Some(Vector3::new(0.0, 0.0, 1.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerLayer {
    pub layer_number: u32,
    pub radiation_length: f64,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub forward: bool,
    #[serde(default)]
    pub disk_normal: Option<Vector3>,
}

impl TrackerLayer {
    pub fn barrel(layer_number: u32, radiation_length: f64, sensitive: bool) -> Self {
        Self {
            layer_number,
            radiation_length,
            sensitive,
            forward: false,
            disk_normal: None,
        }
    }

    pub fn forward(
        layer_number: u32,
        radiation_length: f64,
        sensitive: bool,
        disk_normal: Vector3,
    ) -> Self {
        Self {
            layer_number,
            radiation_length,
            sensitive,
            forward: true,
            disk_normal: Some(disk_normal),
        }
    }
}

impl Layer for TrackerLayer {
    fn radiation_length(&self) -> f64 {
        self.radiation_length
    }

    fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    fn is_forward(&self) -> bool {
        self.forward
    }

    fn layer_number(&self) -> u32 {
        self.layer_number
    }

    fn disk_normal(&self) -> Option<Vector3> {
        if self.forward {
            self.disk_normal
        } else {
            None
        }
    }
}
