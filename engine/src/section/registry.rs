//! Section Registry
//!
//! Owns the scene and the three flat section sequences. Sections of a level
//! are not stored contiguously; "the i-th section of a level" is always the
//! i-th match of a filtered scan in insertion order.
//!
//! Instanced levels share one buffer per level. Removing an instance shifts
//! every later slot of that buffer down, and the registry rewrites the
//! affected sections' slot numbers to match.
//!
//! Only registered levels accept new sections. The reconciliation engine
//! keeps the registered set equal to the level table after every pass.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::BuildError;
use crate::level::{AssetHandle, LevelId};
use crate::math::Pose;
use crate::scene::{BufferId, InstanceBuffer, ObjectKind, Scene, SceneObject};

use super::section::{DiscreteSection, InstancedSection, PlacedSection, ProxySection, Section, SectionKind};

#[derive(Debug, Default)]
pub struct SectionRegistry {
    scene: Scene,
    discrete: Vec<DiscreteSection>,
    proxies: Vec<ProxySection>,
    instanced: Vec<InstancedSection>,
    buffers: BTreeMap<LevelId, BufferId>,
    levels: BTreeSet<LevelId>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry that already knows `levels`. Invalid ids are ignored.
    pub fn with_levels(levels: impl IntoIterator<Item = LevelId>) -> Self {
        let mut registry = Self::new();
        registry.levels = levels.into_iter().filter(|id| id.is_valid()).collect();
        registry
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access, e.g. to destroy objects behind the registry's back.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    // ------------------------------------------------------------------
    // Levels
    // ------------------------------------------------------------------

    pub fn register_level(&mut self, level: LevelId) -> Result<(), BuildError> {
        if !level.is_valid() {
            return Err(BuildError::InvalidLevelId(level));
        }
        self.levels.insert(level);
        Ok(())
    }

    pub fn is_registered(&self, level: LevelId) -> bool {
        self.levels.contains(&level)
    }

    /// Make `levels` the registered set. Sections of levels that are no
    /// longer registered are destroyed. Returns how many were destroyed.
    pub fn retain_levels(&mut self, levels: &[LevelId]) -> usize {
        let keep: BTreeSet<LevelId> = levels.iter().copied().filter(|id| id.is_valid()).collect();
        let before = self.len();
        let gone: Vec<LevelId> = self.levels.difference(&keep).copied().collect();
        for level in gone {
            self.reset(level);
        }
        self.levels = keep;
        before - self.len()
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    pub fn init_discrete(&mut self, level: LevelId, pose: Pose, asset: Option<AssetHandle>) -> Result<Section, BuildError> {
        self.check_level(level)?;
        let object = self.scene.spawn(SceneObject {
            pose,
            asset,
            kind: ObjectKind::Mesh,
        });
        let section = DiscreteSection { level_id: level, object };
        self.discrete.push(section.clone());
        Ok(Section::Discrete(section))
    }

    pub fn init_proxy(
        &mut self,
        level: LevelId,
        pose: Pose,
        class: impl Into<String>,
        asset: Option<AssetHandle>,
    ) -> Result<Section, BuildError> {
        self.check_level(level)?;
        let class = class.into();
        let object = self.scene.spawn(SceneObject {
            pose,
            asset,
            kind: ObjectKind::Actor(class.clone()),
        });
        let section = ProxySection {
            level_id: level,
            object,
            class,
        };
        self.proxies.push(section.clone());
        Ok(Section::Proxy(section))
    }

    /// Add an instance to the level's buffer, creating the buffer on first use.
    pub fn init_instanced(&mut self, level: LevelId, pose: Pose, asset: Option<AssetHandle>) -> Result<Section, BuildError> {
        self.check_level(level)?;
        let buffer_id = self.buffer_for(level, asset.clone());
        let Some(buffer) = self.scene.buffer_mut(buffer_id) else {
            return Err(BuildError::InvalidSection { level, index: 0 });
        };
        if asset.is_some() {
            buffer.asset = asset;
        }
        let len = buffer.len();
        let instance = buffer
            .add(&pose)
            .ok_or(BuildError::IndexOutOfRange { level, index: len, len })?;
        let section = InstancedSection {
            level_id: level,
            buffer: buffer_id,
            instance,
        };
        self.instanced.push(section.clone());
        Ok(Section::Instanced(section))
    }

    /// Place one section of the given kind. Proxy sections need an actor class.
    pub fn spawn(
        &mut self,
        kind: SectionKind,
        level: LevelId,
        pose: Pose,
        asset: Option<AssetHandle>,
        class: Option<&str>,
    ) -> Result<Section, BuildError> {
        match kind {
            SectionKind::Discrete => self.init_discrete(level, pose, asset),
            SectionKind::Instanced => self.init_instanced(level, pose, asset),
            SectionKind::Proxy => match class {
                Some(class) => self.init_proxy(level, pose, class, asset),
                None => Err(BuildError::MissingAsset { level }),
            },
        }
    }

    fn buffer_for(&mut self, level: LevelId, asset: Option<AssetHandle>) -> BufferId {
        if let Some(&id) = self.buffers.get(&level) {
            if self.scene.buffer(id).is_some() {
                return id;
            }
        }
        let id = self.scene.create_buffer(InstanceBuffer::new(level, asset));
        self.buffers.insert(level, id);
        id
    }

    pub fn buffer_of(&self, level: LevelId) -> Option<BufferId> {
        self.buffers.get(&level).copied()
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// The `index`-th section of `kind` on `level`, in insertion order.
    pub fn get_at(&self, kind: SectionKind, level: LevelId, index: usize) -> Option<Section> {
        match kind {
            SectionKind::Discrete => self
                .discrete
                .iter()
                .filter(|s| s.level_id == level)
                .nth(index)
                .cloned()
                .map(Section::Discrete),
            SectionKind::Proxy => self
                .proxies
                .iter()
                .filter(|s| s.level_id == level)
                .nth(index)
                .cloned()
                .map(Section::Proxy),
            SectionKind::Instanced => self
                .instanced
                .iter()
                .filter(|s| s.level_id == level)
                .nth(index)
                .cloned()
                .map(Section::Instanced),
        }
    }

    /// Every section of `level`: discrete, then proxy, then instanced.
    pub fn get_all_of(&self, level: LevelId) -> Vec<Section> {
        SectionKind::ALL
            .iter()
            .flat_map(|&kind| self.of_kind(kind, level))
            .collect()
    }

    /// Sections of one kind on one level, in insertion order.
    pub fn of_kind(&self, kind: SectionKind, level: LevelId) -> Vec<Section> {
        match kind {
            SectionKind::Discrete => self
                .discrete
                .iter()
                .filter(|s| s.level_id == level)
                .cloned()
                .map(Section::Discrete)
                .collect(),
            SectionKind::Proxy => self
                .proxies
                .iter()
                .filter(|s| s.level_id == level)
                .cloned()
                .map(Section::Proxy)
                .collect(),
            SectionKind::Instanced => self
                .instanced
                .iter()
                .filter(|s| s.level_id == level)
                .cloned()
                .map(Section::Instanced)
                .collect(),
        }
    }

    /// Every section of every level.
    pub fn all(&self) -> Vec<Section> {
        let discrete = self.discrete.iter().cloned().map(Section::Discrete);
        let proxies = self.proxies.iter().cloned().map(Section::Proxy);
        let instanced = self.instanced.iter().cloned().map(Section::Instanced);
        discrete.chain(proxies).chain(instanced).collect()
    }

    pub fn count_of(&self, kind: SectionKind, level: LevelId) -> usize {
        match kind {
            SectionKind::Discrete => self.discrete.iter().filter(|s| s.level_id == level).count(),
            SectionKind::Proxy => self.proxies.iter().filter(|s| s.level_id == level).count(),
            SectionKind::Instanced => self.instanced.iter().filter(|s| s.level_id == level).count(),
        }
    }

    /// Sections of one kind across every level.
    pub fn len_of(&self, kind: SectionKind) -> usize {
        match kind {
            SectionKind::Discrete => self.discrete.len(),
            SectionKind::Proxy => self.proxies.len(),
            SectionKind::Instanced => self.instanced.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.discrete.len() + self.proxies.len() + self.instanced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pose of a section, if it is still backed by the scene.
    pub fn pose(&self, section: &Section) -> Option<Pose> {
        section.pose(&self.scene)
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove the `index`-th section of `kind` on `level`.
    pub fn remove(&mut self, kind: SectionKind, level: LevelId, index: usize) -> Result<(), BuildError> {
        let len = self.count_of(kind, level);
        let Some(position) = self.flat_position(kind, level, index) else {
            return Err(BuildError::IndexOutOfRange { level, index, len });
        };
        self.remove_flat(kind, position);
        Ok(())
    }

    /// Remove every section of `kind` on `level` whose per-level index is
    /// `>= index`. Only the level's own `[first + index, last]` span of the
    /// flat sequence is visited. Returns the number removed.
    pub fn remove_after(&mut self, kind: SectionKind, index: usize, level: LevelId) -> usize {
        let levels = self.level_ids_of(kind);
        let Some(first) = levels.iter().position(|&id| id == level) else {
            return 0;
        };
        let Some(last) = levels.iter().rposition(|&id| id == level) else {
            return 0;
        };
        let start = first + index;
        if start > last {
            return 0;
        }

        let mut targets = Vec::new();
        let mut matched = 0;
        for (position, &id) in levels.iter().enumerate().take(last + 1).skip(first) {
            if id != level {
                continue;
            }
            if matched >= index {
                targets.push(position);
            }
            matched += 1;
        }

        // Back to front keeps earlier flat positions and instance slots stable.
        for &position in targets.iter().rev() {
            self.remove_flat(kind, position);
        }
        tracing::debug!(level = %level, ?kind, index, removed = targets.len(), "truncated level sections");
        targets.len()
    }

    /// Destroy every section of `level`, all kinds, plus its instance buffer.
    pub fn reset(&mut self, level: LevelId) {
        for kind in SectionKind::ALL {
            self.reset_kind(kind, level);
        }
    }

    pub fn reset_kind(&mut self, kind: SectionKind, level: LevelId) {
        match kind {
            SectionKind::Discrete => {
                let scene = &mut self.scene;
                self.discrete.retain(|s| {
                    if s.level_id != level {
                        return true;
                    }
                    s.destroy(scene);
                    false
                });
            }
            SectionKind::Proxy => {
                let scene = &mut self.scene;
                self.proxies.retain(|s| {
                    if s.level_id != level {
                        return true;
                    }
                    s.destroy(scene);
                    false
                });
            }
            SectionKind::Instanced => {
                self.instanced.retain(|s| s.level_id != level);
                if let Some(buffer) = self.buffers.remove(&level) {
                    self.scene.destroy_buffer(buffer);
                }
            }
        }
    }

    /// Destroy every proxy section of every level.
    pub fn reset_proxies(&mut self) {
        let scene = &mut self.scene;
        for proxy in self.proxies.drain(..) {
            proxy.destroy(scene);
        }
    }

    /// Destroy everything the registry owns.
    pub fn reset_all(&mut self) {
        let purged = self.purge_invalid();
        if purged > 0 {
            tracing::debug!(purged, "purged invalid sections before reset");
        }
        for section in self.discrete.drain(..) {
            section.destroy(&mut self.scene);
        }
        for section in self.proxies.drain(..) {
            section.destroy(&mut self.scene);
        }
        self.instanced.clear();
        for (_, buffer) in std::mem::take(&mut self.buffers) {
            self.scene.destroy_buffer(buffer);
        }
    }

    /// Drop entries whose object, buffer or slot no longer exists.
    /// Returns the number of entries dropped.
    pub fn purge_invalid(&mut self) -> usize {
        let before = self.len();
        let scene = &self.scene;
        self.discrete.retain(|s| s.is_valid(scene));
        self.proxies.retain(|s| s.is_valid(scene));
        self.instanced.retain(|s| s.is_valid(scene));
        self.buffers.retain(|_, id| scene.buffer(*id).is_some());
        before - self.len()
    }

    /// Turn one instance of an instanced level into a standalone discrete
    /// section at the same pose, then remove the instance. Later instances
    /// of the level shift down by one.
    pub fn replace_with_discrete(&mut self, level: LevelId, instance_index: usize) -> Result<Section, BuildError> {
        self.check_level(level)?;
        let len = self.count_of(SectionKind::Instanced, level);
        let out_of_range = BuildError::IndexOutOfRange {
            level,
            index: instance_index,
            len,
        };
        let Some(Section::Instanced(instanced)) = self.get_at(SectionKind::Instanced, level, instance_index) else {
            return Err(out_of_range);
        };
        let Some(buffer) = self.scene.buffer(instanced.buffer) else {
            return Err(BuildError::InvalidSection {
                level,
                index: instance_index,
            });
        };
        let Some(pose) = buffer.pose(instanced.instance) else {
            return Err(out_of_range);
        };
        let asset = buffer.asset.clone();

        let discrete = self.init_discrete(level, pose, asset)?;
        self.remove(SectionKind::Instanced, level, instance_index)?;
        Ok(discrete)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_level(&self, level: LevelId) -> Result<(), BuildError> {
        if level.is_valid() && self.levels.contains(&level) {
            Ok(())
        } else {
            Err(BuildError::InvalidLevelId(level))
        }
    }

    fn level_ids_of(&self, kind: SectionKind) -> Vec<LevelId> {
        match kind {
            SectionKind::Discrete => self.discrete.iter().map(|s| s.level_id).collect(),
            SectionKind::Proxy => self.proxies.iter().map(|s| s.level_id).collect(),
            SectionKind::Instanced => self.instanced.iter().map(|s| s.level_id).collect(),
        }
    }

    fn flat_position(&self, kind: SectionKind, level: LevelId, index: usize) -> Option<usize> {
        self.level_ids_of(kind)
            .iter()
            .enumerate()
            .filter(|(_, id)| **id == level)
            .nth(index)
            .map(|(position, _)| position)
    }

    fn remove_flat(&mut self, kind: SectionKind, position: usize) {
        match kind {
            SectionKind::Discrete => {
                let section = self.discrete.remove(position);
                section.destroy(&mut self.scene);
            }
            SectionKind::Proxy => {
                let section = self.proxies.remove(position);
                section.destroy(&mut self.scene);
            }
            SectionKind::Instanced => {
                let section = self.instanced.remove(position);
                if section.destroy(&mut self.scene) {
                    for other in self.instanced.iter_mut() {
                        if other.buffer == section.buffer && other.instance > section.instance {
                            other.instance -= 1;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn at(x: f32) -> Pose {
        Pose::from_translation(Vec3::new(x, 0.0, 0.0))
    }

    fn wall() -> Option<AssetHandle> {
        Some(AssetHandle::new("SM_Wall"))
    }

    #[test]
    fn test_get_at_is_filtered_insertion_order() {
        let mut registry = SectionRegistry::with_levels((0..5).map(LevelId));
        let (a, b) = (LevelId(0), LevelId(1));
        registry.init_discrete(a, at(0.0), wall()).unwrap();
        registry.init_discrete(b, at(100.0), wall()).unwrap();
        registry.init_discrete(a, at(200.0), wall()).unwrap();

        let second = registry.get_at(SectionKind::Discrete, a, 1).unwrap();
        assert_eq!(registry.pose(&second).unwrap().translation.x, 200.0);
        assert!(registry.get_at(SectionKind::Discrete, a, 2).is_none());
        assert_eq!(registry.count_of(SectionKind::Discrete, b), 1);
    }

    #[test]
    fn test_invalid_level_rejected() {
        let mut registry = SectionRegistry::with_levels((0..5).map(LevelId));
        assert_eq!(
            registry.init_discrete(LevelId::INVALID, at(0.0), wall()),
            Err(BuildError::InvalidLevelId(LevelId::INVALID))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregistered_level_rejected() {
        let mut registry = SectionRegistry::with_levels([LevelId(0)]);
        assert_eq!(
            registry.init_discrete(LevelId(42), at(0.0), wall()),
            Err(BuildError::InvalidLevelId(LevelId(42)))
        );
        assert_eq!(
            registry.init_instanced(LevelId(42), at(0.0), wall()),
            Err(BuildError::InvalidLevelId(LevelId(42)))
        );
        assert!(registry.is_empty());
        assert_eq!(registry.scene().buffer_count(), 0);

        registry.register_level(LevelId(42)).unwrap();
        assert!(registry.init_discrete(LevelId(42), at(0.0), wall()).is_ok());
        assert!(registry.register_level(LevelId::INVALID).is_err());
    }

    #[test]
    fn test_retain_levels_drops_forgotten_sections() {
        let mut registry = SectionRegistry::with_levels([LevelId(0), LevelId(1)]);
        registry.init_discrete(LevelId(0), at(0.0), wall()).unwrap();
        registry.init_instanced(LevelId(1), at(0.0), wall()).unwrap();
        registry.init_instanced(LevelId(1), at(1.0), wall()).unwrap();

        assert_eq!(registry.retain_levels(&[LevelId(0)]), 2);
        assert!(registry.is_registered(LevelId(0)));
        assert!(!registry.is_registered(LevelId(1)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.scene().buffer_count(), 0);
        assert!(registry.init_discrete(LevelId(1), at(0.0), wall()).is_err());
    }

    #[test]
    fn test_remove_after_only_touches_level() {
        let mut registry = SectionRegistry::with_levels((0..5).map(LevelId));
        let (a, b) = (LevelId(0), LevelId(1));
        for i in 0..4 {
            registry.init_discrete(a, at(i as f32), wall()).unwrap();
            registry.init_discrete(b, at(100.0 + i as f32), wall()).unwrap();
        }
        let removed = registry.remove_after(SectionKind::Discrete, 2, a);
        assert_eq!(removed, 2);
        assert_eq!(registry.count_of(SectionKind::Discrete, a), 2);
        assert_eq!(registry.count_of(SectionKind::Discrete, b), 4);
        assert_eq!(registry.scene().object_count(), 6);
        assert_eq!(registry.remove_after(SectionKind::Discrete, 5, a), 0);
    }

    #[test]
    fn test_instanced_share_one_buffer_per_level() {
        let mut registry = SectionRegistry::with_levels((0..5).map(LevelId));
        let level = LevelId(3);
        for i in 0..3 {
            registry.init_instanced(level, at(i as f32 * 400.0), wall()).unwrap();
        }
        registry.init_instanced(LevelId(4), at(0.0), wall()).unwrap();
        assert_eq!(registry.scene().buffer_count(), 2);
        let buffer = registry.buffer_of(level).unwrap();
        assert_eq!(registry.scene().buffer(buffer).unwrap().len(), 3);
    }

    #[test]
    fn test_replace_with_discrete_shifts_later_instances() {
        let mut registry = SectionRegistry::with_levels((0..5).map(LevelId));
        let level = LevelId(0);
        for i in 0..3 {
            registry.init_instanced(level, at(i as f32 * 400.0), wall()).unwrap();
        }

        let door = registry.replace_with_discrete(level, 1).unwrap();
        assert_eq!(door.kind(), SectionKind::Discrete);
        assert_eq!(registry.pose(&door).unwrap().translation.x, 400.0);
        assert_eq!(door.asset(registry.scene()), wall());

        assert_eq!(registry.count_of(SectionKind::Instanced, level), 2);
        let last = registry.get_at(SectionKind::Instanced, level, 1).unwrap();
        assert_eq!(registry.pose(&last).unwrap().translation.x, 800.0);
        assert!(last.is_valid(registry.scene()));
    }

    #[test]
    fn test_replace_out_of_range_leaves_buffer_alone() {
        let mut registry = SectionRegistry::with_levels((0..5).map(LevelId));
        let level = LevelId(0);
        registry.init_instanced(level, at(0.0), wall()).unwrap();
        let err = registry.replace_with_discrete(level, 5).unwrap_err();
        assert_eq!(err, BuildError::IndexOutOfRange { level, index: 5, len: 1 });
        assert_eq!(registry.count_of(SectionKind::Instanced, level), 1);
        assert_eq!(registry.count_of(SectionKind::Discrete, level), 0);
    }

    #[test]
    fn test_reset_level_and_proxies() {
        let mut registry = SectionRegistry::with_levels((0..5).map(LevelId));
        let (a, b) = (LevelId(0), LevelId(1));
        registry.init_discrete(a, at(0.0), wall()).unwrap();
        registry.init_instanced(a, at(0.0), wall()).unwrap();
        registry.init_proxy(b, at(0.0), "BP_Door", None).unwrap();
        registry.init_discrete(b, at(0.0), wall()).unwrap();

        registry.reset(a);
        assert!(registry.get_all_of(a).is_empty());
        assert_eq!(registry.scene().buffer_count(), 0);

        registry.reset_proxies();
        assert_eq!(registry.count_of(SectionKind::Proxy, b), 0);
        assert_eq!(registry.count_of(SectionKind::Discrete, b), 1);
        assert_eq!(registry.scene().object_count(), 1);
    }

    #[test]
    fn test_reset_all_after_external_destroy() {
        let mut registry = SectionRegistry::with_levels((0..5).map(LevelId));
        let level = LevelId(0);
        let doomed = registry.init_discrete(level, at(0.0), wall()).unwrap();
        registry.init_discrete(level, at(1.0), wall()).unwrap();
        registry.init_instanced(level, at(2.0), wall()).unwrap();

        let Section::Discrete(doomed) = doomed else { unreachable!() };
        registry.scene_mut().despawn(doomed.object);
        assert_eq!(registry.purge_invalid(), 1);

        registry.reset_all();
        assert!(registry.is_empty());
        assert_eq!(registry.scene().object_count(), 0);
        assert_eq!(registry.scene().buffer_count(), 0);
    }

    #[test]
    fn test_spawn_proxy_requires_class() {
        let mut registry = SectionRegistry::with_levels((0..5).map(LevelId));
        let level = LevelId(2);
        assert!(registry.spawn(SectionKind::Proxy, level, at(0.0), None, None).is_err());
        let proxy = registry
            .spawn(SectionKind::Proxy, level, at(0.0), None, Some("BP_Door"))
            .unwrap();
        assert_eq!(proxy.kind(), SectionKind::Proxy);
    }
}
