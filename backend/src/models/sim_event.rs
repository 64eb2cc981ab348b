//! Event history container
//!
//! Holds every track and vertex produced while an event is simulated. The
//! orchestrator only sees it through the [`EventSink`] trait: vertices and
//! tracks go in, permanent indices come out.
//!
//! # Critical Invariants
//!
//! 1. **Index stability**: a track or vertex index never changes once assigned
//! 2. **Parentage by index**: vertices refer to tracks (and tracks to
//!    vertices) through indices resolved by this container, never by reference
//! 3. **Daughter bookkeeping**: every track added under a vertex is listed in
//!    that vertex's daughters

use crate::core::FourVector;
use crate::models::track::{Daughter, SimTrack, TrackIndex};
use crate::models::vertex::{SimVertex, VertexIndex};
use uuid::Uuid;

/// Destination for the vertices and secondaries created by material effects
pub trait EventSink {
    /// Add a vertex created by `parent_track`, returning its index
    fn add_vertex(&mut self, position: FourVector, parent_track: TrackIndex) -> VertexIndex;

    /// Add a track originating from `parent_vertex`, returning its index
    fn add_track(&mut self, daughter: Daughter, parent_vertex: VertexIndex) -> TrackIndex;
}

/// In-memory event history
///
/// # Example
///
/// ```rust
/// use material_effects_core_rs::{Daughter, EventSink, FourVector, SimEvent};
///
/// let mut event = SimEvent::new();
/// let primary = event.add_primary(
///     Daughter::new(FourVector::new(0.0, 0.0, 10.0, 10.0), 22, 0.0),
///     FourVector::default(),
/// );
///
/// let vertex = event.add_vertex(FourVector::new(0.0, 0.0, 30.0, 0.0), primary);
/// event.add_track(Daughter::new(FourVector::new(0.0, 0.0, 5.0, 5.0), 11, -1.0), vertex);
///
/// assert_eq!(event.n_tracks(), 2);
/// assert_eq!(event.n_vertices(), 2);
/// assert_eq!(event.parent_of(vertex).unwrap().id, primary);
/// ```
#[derive(Debug, Clone)]
pub struct SimEvent {
    id: Uuid,
    tracks: Vec<SimTrack>,
    vertices: Vec<SimVertex>,
}

impl SimEvent {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks: Vec::new(),
            vertices: Vec::new(),
        }
    }

    /// Unique identifier of this event, used in log records
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Add a primary particle together with its (parentless) production vertex
    pub fn add_primary(&mut self, particle: Daughter, position: FourVector) -> TrackIndex {
        let vertex = self.push_vertex(position, None);
        self.add_track(particle, vertex)
    }

    pub fn track(&self, index: TrackIndex) -> Option<&SimTrack> {
        self.tracks.get(index.0)
    }

    pub fn vertex(&self, index: VertexIndex) -> Option<&SimVertex> {
        self.vertices.get(index.0)
    }

    pub fn tracks(&self) -> &[SimTrack] {
        &self.tracks
    }

    pub fn vertices(&self) -> &[SimVertex] {
        &self.vertices
    }

    pub fn n_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Track that created the given vertex
    pub fn parent_of(&self, vertex: VertexIndex) -> Option<&SimTrack> {
        self.vertex(vertex)
            .and_then(|v| v.parent())
            .and_then(|parent| self.track(parent))
    }

    /// Tracks originating from the given vertex, in insertion order
    pub fn daughters_of(&self, vertex: VertexIndex) -> impl Iterator<Item = &SimTrack> + '_ {
        self.vertex(vertex)
            .map(|v| v.daughters())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&index| self.track(index))
    }

    /// Vertices created by the given track, in insertion order
    pub fn end_vertices_of(&self, track: TrackIndex) -> impl Iterator<Item = &SimVertex> + '_ {
        self.vertices
            .iter()
            .filter(move |v| v.parent() == Some(track))
    }

    fn push_vertex(&mut self, position: FourVector, parent: Option<TrackIndex>) -> VertexIndex {
        let index = VertexIndex(self.vertices.len());
        self.vertices.push(SimVertex::new(index, position, parent));
        index
    }
}

impl Default for SimEvent {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for SimEvent {
    fn add_vertex(&mut self, position: FourVector, parent_track: TrackIndex) -> VertexIndex {
        self.push_vertex(position, Some(parent_track))
    }

    fn add_track(&mut self, daughter: Daughter, parent_vertex: VertexIndex) -> TrackIndex {
        let index = TrackIndex(self.tracks.len());
        let origin = match self.vertices.get_mut(parent_vertex.0) {
            Some(vertex) => {
                vertex.add_daughter(index);
                Some(parent_vertex)
            }
            None => {
                log::warn!(
                    "event {}: track {} added under unknown vertex {}",
                    self.id,
                    index,
                    parent_vertex
                );
                None
            }
        };

        self.tracks.push(SimTrack {
            id: index,
            momentum: daughter.momentum,
            pid: daughter.pid,
            charge: daughter.charge,
            origin,
        });
        index
    }
}
