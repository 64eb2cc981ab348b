//! Cascade Library - Recorded Nuclear Interactions
//!
//! Final states of nuclear interactions are not generated on the fly: they
//! are drawn from libraries recorded with a full simulation, one library per
//! incident energy. Cascades of a bin are consumed in round-robin order, and
//! the read position must carry over from one job to the next so that
//! successive jobs do not replay the same cascades.
//!
//! # Persistence
//!
//! The cursor state (read position and usage count per bin) is saved as JSON
//! together with a SHA256 digest of the library contents. On load, a state
//! whose digest does not match the library is ignored.
//!
//! # Critical Invariants
//!
//! - **Alignment**: one bin per incident energy, energies strictly ascending
//! - **Cursor validity**: every cursor is smaller than its bin size (or 0 for
//!   an empty bin)
//! - **Digest matching**: cursors are only restored onto the library they
//!   were saved from

use crate::models::Daughter;
use crate::simulators::SimulatorError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// One recorded final state
///
/// Momenta are expressed for an incident hadron flying along +z with the
/// energy of the bin the cascade belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedCascade {
    pub particles: Vec<Daughter>,
}

/// Saved read positions of a library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    /// SHA256 of the library contents the cursors refer to
    pub library_digest: String,
    /// Next cascade to read, per bin
    pub cursors: Vec<usize>,
    /// Cascades read so far, per bin
    pub usage: Vec<u64>,
}

/// Recorded cascades grouped by incident energy
#[derive(Debug, Clone)]
pub struct CascadeLibrary {
    energies: Vec<f64>,
    bins: Vec<Vec<RecordedCascade>>,
    cursors: Vec<usize>,
    usage: Vec<u64>,
    digest: String,
    state_file: Option<PathBuf>,
    dirty: bool,
}

impl CascadeLibrary {
    /// Build a library from in-memory bins
    ///
    /// # Errors
    ///
    /// `SimulatorError::Library` when the energies and bins do not line up,
    /// or the energies are not positive and strictly ascending.
    pub fn new(
        energies: Vec<f64>,
        bins: Vec<Vec<RecordedCascade>>,
    ) -> Result<Self, SimulatorError> {
        if energies.is_empty() {
            return Err(SimulatorError::Library(
                "library needs at least one energy bin".to_string(),
            ));
        }
        if energies.len() != bins.len() {
            return Err(SimulatorError::Library(format!(
                "{} energies for {} bins",
                energies.len(),
                bins.len()
            )));
        }
        if energies.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(SimulatorError::Library(
                "energies must be finite and positive".to_string(),
            ));
        }
        if energies.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SimulatorError::Library(
                "energies must be strictly ascending".to_string(),
            ));
        }

        let digest = compute_library_digest(&energies, &bins)?;
        let n = bins.len();
        Ok(Self {
            energies,
            bins,
            cursors: vec![0; n],
            usage: vec![0; n],
            digest,
            state_file: None,
            dirty: false,
        })
    }

    /// Load one JSON file of cascades per energy
    ///
    /// Each file holds a JSON array of [`RecordedCascade`].
    pub fn load<P: AsRef<Path>>(files: &[P], energies: &[f64]) -> Result<Self, SimulatorError> {
        if files.len() != energies.len() {
            return Err(SimulatorError::Library(format!(
                "{} library files for {} energies",
                files.len(),
                energies.len()
            )));
        }

        let mut bins = Vec::with_capacity(files.len());
        for file in files {
            let text = fs::read_to_string(file.as_ref())?;
            let cascades: Vec<RecordedCascade> = serde_json::from_str(&text)?;
            log::debug!(
                "loaded {} cascades from {}",
                cascades.len(),
                file.as_ref().display()
            );
            bins.push(cascades);
        }

        Self::new(energies.to_vec(), bins)
    }

    /// Attach the file that persists the cursors, restoring it if present
    pub fn with_state_file<P: Into<PathBuf>>(mut self, path: P) -> Result<Self, SimulatorError> {
        let path = path.into();
        if path.exists() {
            let text = fs::read_to_string(&path)?;
            let snapshot: CursorSnapshot = serde_json::from_str(&text)?;
            if !self.restore(&snapshot) {
                log::warn!(
                    "cascade cursor state {} does not match the library, starting from the first cascade",
                    path.display()
                );
            }
        }
        self.state_file = Some(path);
        Ok(self)
    }

    /// Apply a snapshot; returns false (and changes nothing) on mismatch
    pub fn restore(&mut self, snapshot: &CursorSnapshot) -> bool {
        let aligned = snapshot.library_digest == self.digest
            && snapshot.cursors.len() == self.bins.len()
            && snapshot.usage.len() == self.bins.len()
            && snapshot
                .cursors
                .iter()
                .zip(&self.bins)
                .all(|(&cursor, bin)| cursor == 0 || cursor < bin.len());
        if aligned {
            self.cursors = snapshot.cursors.clone();
            self.usage = snapshot.usage.clone();
        }
        aligned
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            library_digest: self.digest.clone(),
            cursors: self.cursors.clone(),
            usage: self.usage.clone(),
        }
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn n_bins(&self) -> usize {
        self.bins.len()
    }

    pub fn bin_len(&self, bin: usize) -> usize {
        self.bins.get(bin).map_or(0, Vec::len)
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn cursor(&self, bin: usize) -> usize {
        self.cursors.get(bin).copied().unwrap_or(0)
    }

    pub fn usage(&self, bin: usize) -> u64 {
        self.usage.get(bin).copied().unwrap_or(0)
    }

    /// Bin of the largest library energy not above `energy` (first bin below
    /// the library range)
    pub fn bin_for(&self, energy: f64) -> usize {
        self.energies
            .iter()
            .rposition(|&e| e <= energy)
            .unwrap_or(0)
    }

    /// Next cascade of `bin`, advancing its cursor
    pub fn next_cascade(&mut self, bin: usize) -> Option<&RecordedCascade> {
        let size = self.bin_len(bin);
        if size == 0 {
            return None;
        }
        let index = self.cursors[bin];
        self.cursors[bin] = (index + 1) % size;
        self.usage[bin] += 1;
        self.dirty = true;
        self.bins[bin].get(index)
    }

    /// Write the cursor state to the attached state file
    ///
    /// A library without a state file, or unchanged since the last save,
    /// writes nothing.
    pub fn save(&mut self) -> Result<(), SimulatorError> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)?;
        log::info!(
            "saved cascade cursors to {} (usage {:?})",
            path.display(),
            self.usage
        );
        self.dirty = false;
        Ok(())
    }
}

/// SHA256 over the serialized library contents
pub fn compute_library_digest(
    energies: &[f64],
    bins: &[Vec<RecordedCascade>],
) -> Result<String, SimulatorError> {
    let json = serde_json::to_string(&(energies, bins))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let result = hasher.finalize();

    Ok(format!("{:x}", result))
}
