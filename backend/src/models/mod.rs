//! Domain models for the material-effects engine

pub mod event;
pub mod layer;
pub mod sim_event;
pub mod track;
pub mod vertex;

// Re-exports
pub use event::{Interaction, InteractionLog};
pub use layer::{Layer, TrackerLayer};
pub use sim_event::{EventSink, SimEvent};
pub use track::{Daughter, ParticleTrack, SimTrack, TrackIndex};
pub use vertex::{SimVertex, VertexIndex};
