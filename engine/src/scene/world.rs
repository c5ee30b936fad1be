//! Scene - the spawned objects and instance buffers sections point at
//!
//! Stands in for the host engine's world. Objects and buffers are addressed
//! by generational ids, so destroying one from outside the registry leaves
//! the section holding it invalid rather than dangling.

use serde::{Deserialize, Serialize};

use super::arena::{Arena, Handle};
use super::instancing::InstanceBuffer;
use crate::level::AssetHandle;
use crate::math::Pose;

/// Id of a spawned object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Handle);

/// Id of a batched instance buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferId(pub Handle);

/// What kind of thing was spawned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// A plain mesh-bearing object (discrete section)
    Mesh,
    /// An externally-typed actor (proxy section)
    Actor(String),
}

/// One spawned object.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub pose: Pose,
    pub asset: Option<AssetHandle>,
    pub kind: ObjectKind,
}

#[derive(Debug, Default)]
pub struct Scene {
    objects: Arena<SceneObject>,
    buffers: Arena<InstanceBuffer>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, object: SceneObject) -> ObjectId {
        ObjectId(self.objects.insert(object))
    }

    /// Destroy an object. Returns false if it was already gone.
    pub fn despawn(&mut self, id: ObjectId) -> bool {
        self.objects.remove(id.0).is_some()
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0)
    }

    pub fn create_buffer(&mut self, buffer: InstanceBuffer) -> BufferId {
        BufferId(self.buffers.insert(buffer))
    }

    pub fn destroy_buffer(&mut self, id: BufferId) -> bool {
        self.buffers.remove(id.0).is_some()
    }

    pub fn buffer(&self, id: BufferId) -> Option<&InstanceBuffer> {
        self.buffers.get(id.0)
    }

    pub fn buffer_mut(&mut self, id: BufferId) -> Option<&mut InstanceBuffer> {
        self.buffers.get_mut(id.0)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Total instances across every live buffer.
    pub fn instance_count(&self, ids: impl IntoIterator<Item = BufferId>) -> usize {
        ids.into_iter()
            .filter_map(|id| self.buffer(id))
            .map(InstanceBuffer::len)
            .sum()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.buffers.clear();
    }
}
