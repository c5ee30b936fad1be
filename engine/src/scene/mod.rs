//! Scene Module
//!
//! Spawned objects, batched instance buffers and the generational arena
//! that backs them.

pub mod arena;
pub mod instancing;
pub mod world;

pub use arena::{Arena, Handle};
pub use instancing::{InstanceBuffer, MAX_SECTION_INSTANCES, SectionInstance};
pub use world::{BufferId, ObjectId, ObjectKind, Scene, SceneObject};
