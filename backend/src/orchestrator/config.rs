//! Material effects configuration
//!
//! Flat set of named options, fixed for the lifetime of one orchestrator.
//! Option names follow the job configuration files (`PairProduction`,
//! `photonEnergy`, `pTmin`, ...).
//!
//! The five process flags are always required. Every other option is only
//! required when the process that reads it is enabled:
//!
//! | Process              | Options                                                  |
//! |----------------------|----------------------------------------------------------|
//! | `PairProduction`     | `photonEnergy`                                           |
//! | `Bremsstrahlung`     | `bremEnergy`, `bremEnergyFraction`                       |
//! | `EnergyLoss`         | `pTmin`                                                  |
//! | `NuclearInteraction` | `fileNames`, `pionEnergies`, `ratioRatio`, `pionEnergy`, |
//! |                      | `lengthRatio`, `inputFile`                               |
//!
//! # Example
//!
//! ```rust
//! use material_effects_core_rs::MaterialEffectsConfig;
//!
//! let config = MaterialEffectsConfig::from_json_str(r#"{
//!     "PairProduction": true,
//!     "Bremsstrahlung": false,
//!     "EnergyLoss": true,
//!     "MultipleScattering": true,
//!     "NuclearInteraction": false,
//!     "photonEnergy": 0.1,
//!     "pTmin": 0.2
//! }"#).unwrap();
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.pt_min(), 0.2);
//! ```

use crate::simulators::Process;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Multiple scattering threshold used when energy loss is disabled (GeV)
pub const DEFAULT_PT_MIN: f64 = 999.0;

/// Configuration errors, all fatal at construction
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{process} is enabled but option '{option}' is missing")]
    MissingOption {
        process: Process,
        option: &'static str,
    },

    #[error("Invalid option '{option}': {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEffectsConfig {
    // Process flags
    #[serde(rename = "PairProduction")]
    pub pair_production: bool,
    #[serde(rename = "Bremsstrahlung")]
    pub bremsstrahlung: bool,
    #[serde(rename = "EnergyLoss")]
    pub energy_loss: bool,
    #[serde(rename = "MultipleScattering")]
    pub multiple_scattering: bool,
    #[serde(rename = "NuclearInteraction")]
    pub nuclear_interaction: bool,

    /// Minimum photon energy for conversions (GeV)
    #[serde(rename = "photonEnergy", default, skip_serializing_if = "Option::is_none")]
    pub photon_energy: Option<f64>,

    /// Minimum bremsstrahlung photon energy (GeV)
    #[serde(rename = "bremEnergy", default, skip_serializing_if = "Option::is_none")]
    pub brem_energy: Option<f64>,

    /// Minimum bremsstrahlung photon energy fraction
    #[serde(rename = "bremEnergyFraction", default, skip_serializing_if = "Option::is_none")]
    pub brem_energy_fraction: Option<f64>,

    /// Transverse momentum threshold for multiple scattering (GeV)
    #[serde(rename = "pTmin", default, skip_serializing_if = "Option::is_none")]
    pub pt_min: Option<f64>,

    /// Minimum hadron energy for nuclear interactions (GeV)
    #[serde(rename = "pionEnergy", default, skip_serializing_if = "Option::is_none")]
    pub pion_energy: Option<f64>,

    /// Interaction length over radiation length
    #[serde(rename = "lengthRatio", default, skip_serializing_if = "Option::is_none")]
    pub length_ratio: Option<f64>,

    /// Recorded cascade files, one per entry of `pionEnergies`
    #[serde(rename = "fileNames", default, skip_serializing_if = "Option::is_none")]
    pub file_names: Option<Vec<String>>,

    /// Incident energies of the cascade files (GeV)
    #[serde(rename = "pionEnergies", default, skip_serializing_if = "Option::is_none")]
    pub pion_energies: Option<Vec<f64>>,

    /// Per-energy correction to `lengthRatio`
    #[serde(rename = "ratioRatio", default, skip_serializing_if = "Option::is_none")]
    pub ratio_ratio: Option<Vec<f64>>,

    /// File persisting the cascade library cursors between jobs
    #[serde(rename = "inputFile", default, skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
}

impl MaterialEffectsConfig {
    /// Configuration with every process disabled
    pub fn disabled() -> Self {
        Self {
            pair_production: false,
            bremsstrahlung: false,
            energy_loss: false,
            multiple_scattering: false,
            nuclear_interaction: false,
            photon_energy: None,
            brem_energy: None,
            brem_energy_fraction: None,
            pt_min: None,
            pion_energy: None,
            length_ratio: None,
            file_names: None,
            pion_energies: None,
            ratio_ratio: None,
            input_file: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn is_enabled(&self, process: Process) -> bool {
        match process {
            Process::PairProduction => self.pair_production,
            Process::Bremsstrahlung => self.bremsstrahlung,
            Process::EnergyLoss => self.energy_loss,
            Process::MultipleScattering => self.multiple_scattering,
            Process::NuclearInteraction => self.nuclear_interaction,
        }
    }

    /// Multiple scattering threshold in effect
    ///
    /// `pTmin` is only read when energy loss is enabled; otherwise the
    /// threshold stays at [`DEFAULT_PT_MIN`].
    pub fn pt_min(&self) -> f64 {
        match (self.energy_loss, self.pt_min) {
            (true, Some(pt_min)) => pt_min,
            _ => DEFAULT_PT_MIN,
        }
    }

    /// Check that every enabled process has its options
    ///
    /// # Errors
    ///
    /// * `ConfigError::MissingOption` - an enabled process lacks an option
    /// * `ConfigError::InvalidOption` - an option is present but unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pair_production {
            let photon_energy = require(Process::PairProduction, "photonEnergy", self.photon_energy)?;
            non_negative("photonEnergy", photon_energy)?;
        }

        if self.bremsstrahlung {
            let energy = require(Process::Bremsstrahlung, "bremEnergy", self.brem_energy)?;
            let fraction = require(
                Process::Bremsstrahlung,
                "bremEnergyFraction",
                self.brem_energy_fraction,
            )?;
            non_negative("bremEnergy", energy)?;
            if !(0.0..1.0).contains(&fraction) {
                return Err(ConfigError::InvalidOption {
                    option: "bremEnergyFraction",
                    reason: format!("must be in [0, 1), got {}", fraction),
                });
            }
        }

        if self.energy_loss {
            let pt_min = require(Process::EnergyLoss, "pTmin", self.pt_min)?;
            non_negative("pTmin", pt_min)?;
        }

        if self.nuclear_interaction {
            self.validate_nuclear()?;
        }

        Ok(())
    }

    fn validate_nuclear(&self) -> Result<(), ConfigError> {
        let process = Process::NuclearInteraction;
        let file_names = require(process, "fileNames", self.file_names.as_ref())?;
        let energies = require(process, "pionEnergies", self.pion_energies.as_ref())?;
        let ratios = require(process, "ratioRatio", self.ratio_ratio.as_ref())?;
        let pion_energy = require(process, "pionEnergy", self.pion_energy)?;
        let length_ratio = require(process, "lengthRatio", self.length_ratio)?;
        require(process, "inputFile", self.input_file.as_ref())?;

        if energies.is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "pionEnergies",
                reason: "must not be empty".to_string(),
            });
        }
        if file_names.len() != energies.len() {
            return Err(ConfigError::InvalidOption {
                option: "fileNames",
                reason: format!(
                    "{} files for {} pion energies",
                    file_names.len(),
                    energies.len()
                ),
            });
        }
        if ratios.len() != energies.len() {
            return Err(ConfigError::InvalidOption {
                option: "ratioRatio",
                reason: format!("{} ratios for {} pion energies", ratios.len(), energies.len()),
            });
        }
        if energies.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(ConfigError::InvalidOption {
                option: "pionEnergies",
                reason: "must be finite and positive".to_string(),
            });
        }
        if energies.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::InvalidOption {
                option: "pionEnergies",
                reason: "must be strictly ascending".to_string(),
            });
        }
        non_negative("pionEnergy", pion_energy)?;
        non_negative("lengthRatio", length_ratio)?;

        Ok(())
    }
}

pub(crate) fn require<T>(process: Process, option: &'static str, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingOption { process, option })
}

fn non_negative(option: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidOption {
            option,
            reason: format!("must be a finite non-negative number, got {}", value),
        })
    }
}
