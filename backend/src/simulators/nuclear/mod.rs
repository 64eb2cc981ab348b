//! Nuclear interactions of hadrons
//!
//! # Behavior
//!
//! - Hadrons below `pion_energy_min` never interact
//! - The energy bin is the largest library energy not above the hadron
//!   energy (first bin below the library range)
//! - The hadron interacts when an exponential(1) draw falls below
//!   `X * length_ratio * ratio_ratio[bin]`
//! - Secondaries come from the next recorded cascade of the bin, scaled by
//!   `E / energies[bin]` and rotated onto the hadron direction
//!
//! The hadron itself is not modified: the orchestrator terminates it when
//! secondaries are produced.

mod library;

pub use library::{compute_library_digest, CascadeLibrary, CursorSnapshot, RecordedCascade};

use super::{MaterialEffectsSimulator, SimulatorError};
use crate::core::FourVector;
use crate::models::{Daughter, ParticleTrack};
use crate::rng::SharedRng;
use std::path::{Path, PathBuf};

pub struct NuclearInteractionSimulator {
    library: CascadeLibrary,
    /// Minimum hadron energy for an interaction (GeV)
    pion_energy_min: f64,
    /// Interaction length in units of radiation length
    length_ratio: f64,
    /// Per-bin correction to `length_ratio`
    ratio_ratio: Vec<f64>,
    rng: SharedRng,
    daughters: Vec<Daughter>,
}

impl NuclearInteractionSimulator {
    /// Build from an in-memory library
    ///
    /// # Errors
    ///
    /// `SimulatorError::Library` when `ratio_ratio` does not have one entry
    /// per library bin.
    pub fn with_library(
        library: CascadeLibrary,
        pion_energy_min: f64,
        length_ratio: f64,
        ratio_ratio: Vec<f64>,
        rng: SharedRng,
    ) -> Result<Self, SimulatorError> {
        if ratio_ratio.len() != library.n_bins() {
            return Err(SimulatorError::Library(format!(
                "{} length ratios for {} library bins",
                ratio_ratio.len(),
                library.n_bins()
            )));
        }

        Ok(Self {
            library,
            pion_energy_min,
            length_ratio,
            ratio_ratio,
            rng,
            daughters: Vec::new(),
        })
    }

    /// Load the library files and restore the cursors saved in `input_file`
    #[allow(clippy::too_many_arguments)]
    pub fn from_files<P: AsRef<Path>>(
        file_names: &[P],
        pion_energies: &[f64],
        pion_energy_min: f64,
        length_ratio: f64,
        ratio_ratio: Vec<f64>,
        input_file: impl Into<PathBuf>,
        rng: SharedRng,
    ) -> Result<Self, SimulatorError> {
        let library = CascadeLibrary::load(file_names, pion_energies)?.with_state_file(input_file)?;
        log::info!(
            "nuclear interaction library: {} bins, digest {}",
            library.n_bins(),
            library.digest()
        );
        Self::with_library(library, pion_energy_min, length_ratio, ratio_ratio, rng)
    }

    pub fn library(&self) -> &CascadeLibrary {
        &self.library
    }

    /// Interaction probability scale for `energy`, per radiation length
    pub fn interaction_scale(&self, energy: f64) -> f64 {
        let bin = self.library.bin_for(energy);
        self.length_ratio * self.ratio_ratio.get(bin).copied().unwrap_or(1.0)
    }
}

impl MaterialEffectsSimulator for NuclearInteractionSimulator {
    fn compute(
        &mut self,
        track: &mut ParticleTrack,
        radiation_lengths: f64,
    ) -> Result<(), SimulatorError> {
        let energy = track.e();
        if energy < self.pion_energy_min {
            return Ok(());
        }

        let path = radiation_lengths * self.interaction_scale(energy);
        if self.rng.borrow_mut().exponential(1.0) >= path {
            return Ok(());
        }

        let direction = track
            .momentum()
            .vect()
            .unit()
            .ok_or_else(|| SimulatorError::InvalidTrack("hadron without direction".to_string()))?;

        let bin = self.library.bin_for(energy);
        let scale = energy / self.library.energies()[bin];
        let Some(cascade) = self.library.next_cascade(bin) else {
            log::warn!("no recorded cascade for energy bin {}, hadron survives", bin);
            return Ok(());
        };

        for particle in &cascade.particles {
            let momentum = particle.momentum.scaled(scale);
            let p = momentum.vect().rotate_uz(&direction);
            self.daughters.push(Daughter::new(
                FourVector::new(p.x, p.y, p.z, momentum.t),
                particle.pid,
                particle.charge,
            ));
        }
        log::trace!(
            "nuclear interaction at E = {:.3} GeV: {} secondaries from bin {}",
            energy,
            self.daughters.len(),
            bin
        );

        Ok(())
    }

    fn daughters(&self) -> &[Daughter] {
        &self.daughters
    }

    fn daughter_buffer(&mut self) -> &mut Vec<Daughter> {
        &mut self.daughters
    }

    fn save(&mut self) -> Result<(), SimulatorError> {
        self.library.save()
    }
}
