//! Section - one placed cell, in one of three forms
//!
//! Discrete and Proxy sections own a spawned object and its pose. Instanced
//! sections only name a slot in their level's shared buffer; the pose lives
//! in the buffer. All three reach the scene through explicit `&Scene`
//! arguments and hold their level by id.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::level::{AssetHandle, LevelId};
use crate::math::Pose;
use crate::scene::{BufferId, ObjectId, Scene};

/// Which representation a section uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Discrete,
    Proxy,
    Instanced,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [SectionKind::Discrete, SectionKind::Proxy, SectionKind::Instanced];
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscreteSection {
    pub level_id: LevelId,
    pub object: ObjectId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxySection {
    pub level_id: LevelId,
    pub object: ObjectId,
    /// Actor class the object was spawned as
    pub class: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstancedSection {
    pub level_id: LevelId,
    pub buffer: BufferId,
    /// Slot in the buffer; shifts down when earlier instances are removed
    pub instance: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Section {
    Discrete(DiscreteSection),
    Proxy(ProxySection),
    Instanced(InstancedSection),
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::Discrete(_) => SectionKind::Discrete,
            Section::Proxy(_) => SectionKind::Proxy,
            Section::Instanced(_) => SectionKind::Instanced,
        }
    }
}

/// Capability surface shared by every section form.
pub trait PlacedSection {
    fn level_id(&self) -> LevelId;

    /// World pose, or `None` once the backing object/slot is gone.
    fn pose(&self, scene: &Scene) -> Option<Pose>;

    fn set_pose(&self, scene: &mut Scene, pose: Pose) -> bool;

    fn asset(&self, scene: &Scene) -> Option<AssetHandle>;

    /// For instanced sections this changes the whole buffer's asset.
    fn set_asset(&self, scene: &mut Scene, asset: Option<AssetHandle>) -> bool;

    fn is_valid(&self, scene: &Scene) -> bool;

    /// Destroy the backing object, or remove the instance from its buffer.
    /// Returns false if there was nothing left to destroy.
    fn destroy(&self, scene: &mut Scene) -> bool;

    fn offset(&self, scene: &mut Scene, delta: Vec3) -> bool {
        match self.pose(scene) {
            Some(pose) => self.set_pose(scene, pose.offset(delta)),
            None => false,
        }
    }

    /// Multiply the current scale component-wise.
    fn scale_by(&self, scene: &mut Scene, factor: Vec3) -> bool {
        match self.pose(scene) {
            Some(pose) => {
                let scale = pose.scale * factor;
                self.set_pose(scene, pose.with_scale(scale))
            }
            None => false,
        }
    }

    fn forward(&self, scene: &Scene) -> Option<Vec3> {
        self.pose(scene).map(|pose| pose.forward())
    }

    fn right(&self, scene: &Scene) -> Option<Vec3> {
        self.pose(scene).map(|pose| pose.right())
    }

    fn up(&self, scene: &Scene) -> Option<Vec3> {
        self.pose(scene).map(|pose| pose.up())
    }
}

fn object_pose(scene: &Scene, id: ObjectId) -> Option<Pose> {
    scene.object(id).map(|object| object.pose)
}

fn set_object_pose(scene: &mut Scene, id: ObjectId, pose: Pose) -> bool {
    match scene.object_mut(id) {
        Some(object) => {
            object.pose = pose;
            true
        }
        None => false,
    }
}

fn set_object_asset(scene: &mut Scene, id: ObjectId, asset: Option<AssetHandle>) -> bool {
    match scene.object_mut(id) {
        Some(object) => {
            object.asset = asset;
            true
        }
        None => false,
    }
}

impl PlacedSection for DiscreteSection {
    fn level_id(&self) -> LevelId {
        self.level_id
    }

    fn pose(&self, scene: &Scene) -> Option<Pose> {
        object_pose(scene, self.object)
    }

    fn set_pose(&self, scene: &mut Scene, pose: Pose) -> bool {
        set_object_pose(scene, self.object, pose)
    }

    fn asset(&self, scene: &Scene) -> Option<AssetHandle> {
        scene.object(self.object).and_then(|object| object.asset.clone())
    }

    fn set_asset(&self, scene: &mut Scene, asset: Option<AssetHandle>) -> bool {
        set_object_asset(scene, self.object, asset)
    }

    fn is_valid(&self, scene: &Scene) -> bool {
        scene.object(self.object).is_some()
    }

    fn destroy(&self, scene: &mut Scene) -> bool {
        scene.despawn(self.object)
    }
}

impl PlacedSection for ProxySection {
    fn level_id(&self) -> LevelId {
        self.level_id
    }

    fn pose(&self, scene: &Scene) -> Option<Pose> {
        object_pose(scene, self.object)
    }

    fn set_pose(&self, scene: &mut Scene, pose: Pose) -> bool {
        set_object_pose(scene, self.object, pose)
    }

    fn asset(&self, scene: &Scene) -> Option<AssetHandle> {
        scene.object(self.object).and_then(|object| object.asset.clone())
    }

    fn set_asset(&self, scene: &mut Scene, asset: Option<AssetHandle>) -> bool {
        set_object_asset(scene, self.object, asset)
    }

    fn is_valid(&self, scene: &Scene) -> bool {
        scene.object(self.object).is_some()
    }

    fn destroy(&self, scene: &mut Scene) -> bool {
        scene.despawn(self.object)
    }
}

impl PlacedSection for InstancedSection {
    fn level_id(&self) -> LevelId {
        self.level_id
    }

    fn pose(&self, scene: &Scene) -> Option<Pose> {
        scene.buffer(self.buffer)?.pose(self.instance)
    }

    fn set_pose(&self, scene: &mut Scene, pose: Pose) -> bool {
        scene
            .buffer_mut(self.buffer)
            .is_some_and(|buffer| buffer.set_pose(self.instance, &pose))
    }

    fn asset(&self, scene: &Scene) -> Option<AssetHandle> {
        scene.buffer(self.buffer).and_then(|buffer| buffer.asset.clone())
    }

    fn set_asset(&self, scene: &mut Scene, asset: Option<AssetHandle>) -> bool {
        match scene.buffer_mut(self.buffer) {
            Some(buffer) => {
                buffer.asset = asset;
                true
            }
            None => false,
        }
    }

    fn is_valid(&self, scene: &Scene) -> bool {
        scene
            .buffer(self.buffer)
            .is_some_and(|buffer| self.instance < buffer.len())
    }

    fn destroy(&self, scene: &mut Scene) -> bool {
        scene
            .buffer_mut(self.buffer)
            .is_some_and(|buffer| buffer.remove(self.instance).is_some())
    }
}

impl PlacedSection for Section {
    fn level_id(&self) -> LevelId {
        match self {
            Section::Discrete(s) => s.level_id(),
            Section::Proxy(s) => s.level_id(),
            Section::Instanced(s) => s.level_id(),
        }
    }

    fn pose(&self, scene: &Scene) -> Option<Pose> {
        match self {
            Section::Discrete(s) => s.pose(scene),
            Section::Proxy(s) => s.pose(scene),
            Section::Instanced(s) => s.pose(scene),
        }
    }

    fn set_pose(&self, scene: &mut Scene, pose: Pose) -> bool {
        match self {
            Section::Discrete(s) => s.set_pose(scene, pose),
            Section::Proxy(s) => s.set_pose(scene, pose),
            Section::Instanced(s) => s.set_pose(scene, pose),
        }
    }

    fn asset(&self, scene: &Scene) -> Option<AssetHandle> {
        match self {
            Section::Discrete(s) => s.asset(scene),
            Section::Proxy(s) => s.asset(scene),
            Section::Instanced(s) => s.asset(scene),
        }
    }

    fn set_asset(&self, scene: &mut Scene, asset: Option<AssetHandle>) -> bool {
        match self {
            Section::Discrete(s) => s.set_asset(scene, asset),
            Section::Proxy(s) => s.set_asset(scene, asset),
            Section::Instanced(s) => s.set_asset(scene, asset),
        }
    }

    fn is_valid(&self, scene: &Scene) -> bool {
        match self {
            Section::Discrete(s) => s.is_valid(scene),
            Section::Proxy(s) => s.is_valid(scene),
            Section::Instanced(s) => s.is_valid(scene),
        }
    }

    fn destroy(&self, scene: &mut Scene) -> bool {
        match self {
            Section::Discrete(s) => s.destroy(scene),
            Section::Proxy(s) => s.destroy(scene),
            Section::Instanced(s) => s.destroy(scene),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{InstanceBuffer, ObjectKind, SceneObject};

    fn spawn_discrete(scene: &mut Scene) -> Section {
        let object = scene.spawn(SceneObject {
            pose: Pose::from_translation_yaw(Vec3::new(400.0, 0.0, 0.0), 90.0),
            asset: Some(AssetHandle::new("SM_Wall")),
            kind: ObjectKind::Mesh,
        });
        Section::Discrete(DiscreteSection {
            level_id: LevelId(1),
            object,
        })
    }

    #[test]
    fn test_discrete_capabilities() {
        let mut scene = Scene::new();
        let section = spawn_discrete(&mut scene);
        assert_eq!(section.kind(), SectionKind::Discrete);
        assert!(section.is_valid(&scene));
        assert!(section.forward(&scene).unwrap().abs_diff_eq(Vec3::Y, 1e-5));

        assert!(section.offset(&mut scene, Vec3::new(0.0, 0.0, 300.0)));
        assert!(section.scale_by(&mut scene, Vec3::new(2.0, 1.0, 1.0)));
        let pose = section.pose(&scene).unwrap();
        assert_eq!(pose.translation, Vec3::new(400.0, 0.0, 300.0));
        assert_eq!(pose.scale, Vec3::new(2.0, 1.0, 1.0));

        assert!(section.destroy(&mut scene));
        assert!(!section.is_valid(&scene));
        assert!(!section.set_pose(&mut scene, Pose::IDENTITY));
    }

    #[test]
    fn test_instanced_pose_lives_in_buffer() {
        let mut scene = Scene::new();
        let mut buffer = InstanceBuffer::new(LevelId(2), Some(AssetHandle::new("SM_Floor")));
        buffer.add(&Pose::IDENTITY);
        buffer.add(&Pose::from_translation(Vec3::new(400.0, 0.0, 0.0)));
        let id = scene.create_buffer(buffer);
        let section = Section::Instanced(InstancedSection {
            level_id: LevelId(2),
            buffer: id,
            instance: 1,
        });

        assert_eq!(section.pose(&scene).unwrap().translation.x, 400.0);
        assert!(section.set_pose(&mut scene, Pose::from_translation(Vec3::new(800.0, 0.0, 0.0))));
        assert_eq!(scene.buffer(id).unwrap().pose(1).unwrap().translation.x, 800.0);
        assert_eq!(section.asset(&scene), Some(AssetHandle::new("SM_Floor")));

        scene.destroy_buffer(id);
        assert!(!section.is_valid(&scene));
        assert!(section.pose(&scene).is_none());
    }
}
