//! Vertices of the event history
//!
//! A vertex knows its parent track and its daughters by index only. The
//! tracks themselves are resolved through the owning [`SimEvent`].
//!
//! [`SimEvent`]: crate::models::sim_event::SimEvent

use crate::core::FourVector;
use crate::models::track::TrackIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a vertex in the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexIndex(pub usize);

impl fmt::Display for VertexIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Space-time point where tracks are created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimVertex {
    id: VertexIndex,
    position: FourVector,
    parent: Option<TrackIndex>,
    daughters: Vec<TrackIndex>,
}

impl SimVertex {
    pub fn new(id: VertexIndex, position: FourVector, parent: Option<TrackIndex>) -> Self {
        Self {
            id,
            position,
            parent,
            daughters: Vec::new(),
        }
    }

    /// Index in the owning event
    pub fn id(&self) -> VertexIndex {
        self.id
    }

    pub fn position(&self) -> &FourVector {
        &self.position
    }

    /// Track that created this vertex (`None` for primary vertices)
    pub fn parent(&self) -> Option<TrackIndex> {
        self.parent
    }

    pub fn daughters(&self) -> &[TrackIndex] {
        &self.daughters
    }

    pub fn n_daughters(&self) -> usize {
        self.daughters.len()
    }

    pub fn no_daughter(&self) -> bool {
        self.daughters.is_empty()
    }

    pub(crate) fn add_daughter(&mut self, track: TrackIndex) {
        self.daughters.push(track);
    }
}

impl fmt::Display for SimVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vertex {} at {}", self.id, self.position)?;
        match self.parent {
            Some(parent) => write!(f, " parent {}", parent)?,
            None => write!(f, " (primary)")?,
        }
        write!(f, " daughters {:?}", self.daughters.iter().map(|d| d.0).collect::<Vec<_>>())
    }
}
