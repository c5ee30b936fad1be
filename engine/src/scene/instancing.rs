//! Batched Instance Buffers for Instanced Sections
//!
//! One buffer per level holds the pose of every instanced section of that
//! level. The instance records are laid out for direct upload as vertex
//! instance data.

use glam::{Quat, Vec3};

use crate::level::{AssetHandle, LevelId};
use crate::math::Pose;

/// Maximum number of instances one buffer accepts.
pub const MAX_SECTION_INSTANCES: usize = 4096;

/// Size of one buffer in bytes when full (4096 * 48 = 196,608 bytes).
pub const INSTANCE_BUFFER_SIZE: usize =
    MAX_SECTION_INSTANCES * std::mem::size_of::<SectionInstance>();

/// GPU-layout instance record for one section.
///
/// Layout (48 bytes total, 16-byte aligned):
/// - translation: vec3<f32> (12 bytes)
/// - _pad0:       u32 (4 bytes)
/// - rotation:    vec4<f32> (16 bytes) - quaternion (x, y, z, w)
/// - scale:       vec3<f32> (12 bytes)
/// - _pad1:       u32 (4 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SectionInstance {
    pub translation: [f32; 3],
    pub _pad0: u32,
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub _pad1: u32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<SectionInstance>(), 48);

impl Default for SectionInstance {
    fn default() -> Self {
        Self::from_pose(&Pose::IDENTITY)
    }
}

impl SectionInstance {
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            translation: pose.translation.to_array(),
            _pad0: 0,
            rotation: pose.rotation.to_array(),
            scale: pose.scale.to_array(),
            _pad1: 0,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            translation: Vec3::from_array(self.translation),
            rotation: Quat::from_array(self.rotation),
            scale: Vec3::from_array(self.scale),
        }
    }
}

/// Shared batched buffer backing every instanced section of one level.
#[derive(Clone, Debug)]
pub struct InstanceBuffer {
    /// Level whose sections live in this buffer
    pub level_id: LevelId,
    /// Mesh drawn for every instance
    pub asset: Option<AssetHandle>,
    instances: Vec<SectionInstance>,
}

impl InstanceBuffer {
    pub fn new(level_id: LevelId, asset: Option<AssetHandle>) -> Self {
        Self {
            level_id,
            asset,
            instances: Vec::new(),
        }
    }

    /// Append an instance. Returns its index, or `None` when the buffer is full.
    pub fn add(&mut self, pose: &Pose) -> Option<usize> {
        if self.instances.len() >= MAX_SECTION_INSTANCES {
            return None;
        }
        self.instances.push(SectionInstance::from_pose(pose));
        Some(self.instances.len() - 1)
    }

    /// Remove an instance; every later instance moves down by one.
    pub fn remove(&mut self, index: usize) -> Option<Pose> {
        if index >= self.instances.len() {
            return None;
        }
        Some(self.instances.remove(index).pose())
    }

    pub fn pose(&self, index: usize) -> Option<Pose> {
        self.instances.get(index).map(SectionInstance::pose)
    }

    pub fn set_pose(&mut self, index: usize, pose: &Pose) -> bool {
        match self.instances.get_mut(index) {
            Some(instance) => {
                *instance = SectionInstance::from_pose(pose);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn instances(&self) -> &[SectionInstance] {
        &self.instances
    }

    /// Raw bytes ready for a vertex-instance upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}
