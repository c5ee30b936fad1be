//! Building Container - owns one building and turns user edits into passes
//!
//! Single writer: every edit runs to completion before returning. The
//! container owns the level table, the section registry (and through it the
//! scene), the bounds tracker, the shape library and the configuration.
//!
//! Handle drags that stay inside the current cell count never re-solve;
//! they stretch the placed sections instead. Any later edit first puts
//! stretched sections back on their solved poses.
//!
//! Carves are kept by level name, like asset overrides, so they survive
//! every later pass: in-place patches, top-level growth and full rebuilds.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::bounds::{Bounds, BoundsTracker, cells_for_location};
use crate::error::BuildError;
use crate::game::config::GeneratorConfig;
use crate::level::{AssetHandle, Level, LevelBlueprint, LevelId, LevelTable};
use crate::math::{Axis, Pose};
use crate::reconcile::{
    Edit, ExecutionMode, MeshRepresentation, ReconcileContext, ReconcilePlan, ReconcileReport, ReconciliationEngine,
};
use crate::section::{PlacedSection, Section, SectionKind, SectionRegistry};
use crate::solver::ShapeLibrary;
use crate::stretch::StretchCorrector;

use super::layout::{BoxLayout, LevelLayout};
use super::preset::Preset;
use super::shapes::default_shapes;

/// Result of [`BuildingContainer::drag_handle`].
#[derive(Clone, Debug, PartialEq)]
pub struct DragReport {
    /// Set when the drag crossed a cell boundary and the bounds changed
    pub resize: Option<ReconcileReport>,
    pub coefficients: Vec3,
    /// Sections rewritten by the stretch pass
    pub stretched: usize,
}

pub struct BuildingContainer {
    config: GeneratorConfig,
    pose: Pose,
    levels: LevelTable,
    registry: SectionRegistry,
    bounds: BoundsTracker,
    shapes: ShapeLibrary,
    layout: Box<dyn LevelLayout>,
    engine: ReconciliationEngine,
    corrector: StretchCorrector,
    /// Per-level asset overrides by level name, applied on top of the layout
    asset_overrides: BTreeMap<String, Option<AssetHandle>>,
    /// Carved cells by level name, then adjusted index
    carves: BTreeMap<String, BTreeMap<usize, AssetHandle>>,
    stretched: bool,
}

impl BuildingContainer {
    /// Build a container and generate its first layout.
    pub fn new(config: GeneratorConfig, bounds: Bounds) -> Self {
        let mut container = Self::empty(config, bounds);
        container.regenerate();
        container
    }

    fn empty(config: GeneratorConfig, bounds: Bounds) -> Self {
        let engine = ReconciliationEngine::new(config.execution_mode, config.representation);
        Self {
            config,
            pose: Pose::IDENTITY,
            levels: LevelTable::new(),
            registry: SectionRegistry::new(),
            bounds: BoundsTracker::new(bounds),
            shapes: default_shapes(),
            layout: Box::new(BoxLayout),
            engine,
            corrector: StretchCorrector::new(),
            asset_overrides: BTreeMap::new(),
            carves: BTreeMap::new(),
            stretched: false,
        }
    }

    /// Replace the shape library and regenerate.
    pub fn with_shapes(mut self, shapes: ShapeLibrary) -> Self {
        self.shapes = shapes;
        self.regenerate();
        self
    }

    /// Replace the level layout and regenerate.
    pub fn with_layout(mut self, layout: Box<dyn LevelLayout>) -> Self {
        self.layout = layout;
        self.regenerate();
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds.current()
    }

    pub fn scale_coefficients(&self) -> Vec3 {
        self.bounds.scale_coefficients()
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn level_by_name(&self, name: &str) -> Option<&Level> {
        self.levels.by_name(name)
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn shapes(&self) -> &ShapeLibrary {
        &self.shapes
    }

    /// Kind non-proxy sections are placed as.
    pub fn section_kind(&self) -> SectionKind {
        self.engine.representation.section_kind()
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Throw everything away and rebuild from the layout.
    pub fn regenerate(&mut self) -> ReconcileReport {
        self.reconcile(Edit::Restore)
    }

    pub fn set_bounds(&mut self, bounds: Bounds) -> ReconcileReport {
        let delta = self.bounds.update(bounds);
        tracing::info!(?delta.previous, ?delta.current, "bounds changed");
        self.reconcile(Edit::Bounds(delta))
    }

    /// A bounding handle on `axis` was dragged to `location` (building-local
    /// units). Crossing a cell boundary resizes; the remainder stretches.
    pub fn drag_handle(&mut self, axis: Axis, location: f32) -> DragReport {
        let cell = self.cell_size(axis);
        let cells = cells_for_location(location, cell).max(1);
        let current = self.bounds.current();
        let resize = (cells != current.axis(axis)).then(|| self.set_bounds(current.with_axis(axis, cells)));

        if self.stretched {
            self.repose_all();
        }
        let coefficients = self.bounds.drag_handle(axis, location, cell);

        let mut stretched = 0;
        for stretch_axis in Axis::ALL {
            let coefficient = stretch_axis.of(coefficients);
            if coefficient == 1.0 {
                continue;
            }
            let sections = self.registry.all();
            stretched += self.corrector.apply(
                self.registry.scene_mut(),
                &sections,
                self.pose,
                Some(axis),
                stretch_axis.with(Vec3::ONE, coefficient),
                coefficient,
                |_, _| {},
            );
            self.stretched = true;
        }

        DragReport {
            resize,
            coefficients,
            stretched,
        }
    }

    /// Override the asset of one level. `None` clears it, which leaves the
    /// level invalid until an asset is set again.
    pub fn set_level_asset(&mut self, level: LevelId, asset: Option<AssetHandle>) -> Result<ReconcileReport, BuildError> {
        let name = self
            .levels
            .get(level)
            .ok_or(BuildError::InvalidLevelId(level))?
            .name
            .clone();
        self.asset_overrides.insert(name, asset);
        Ok(self.reconcile(Edit::Content))
    }

    pub fn set_representation(&mut self, representation: MeshRepresentation) -> ReconcileReport {
        self.config.representation = representation;
        self.engine.representation = representation;
        self.reconcile(Edit::Representation)
    }

    /// Takes effect on the next edit.
    pub fn set_execution_mode(&mut self, mode: ExecutionMode) {
        self.config.execution_mode = mode;
        self.engine.mode = mode;
    }

    /// Select a registered shape strategy, or none.
    pub fn set_shape(&mut self, shape: Option<&str>) -> Result<ReconcileReport, BuildError> {
        if let Some(name) = shape {
            if self.shapes.get(name).is_none() {
                return Err(BuildError::UnknownShape(name.to_string()));
            }
        }
        self.config.shape = shape.map(str::to_string);
        Ok(self.reconcile(Edit::Content))
    }

    /// Move the whole building; every section follows.
    pub fn set_pose(&mut self, pose: Pose) -> ReconcileReport {
        self.pose = pose;
        self.repose_all()
    }

    /// Give one placed section its own content (a door in a wall). `index`
    /// counts placed cells of the level. On instanced levels the instance is
    /// first split out into a discrete section. The carve is remembered and
    /// reapplied by every later pass.
    pub fn carve(&mut self, level: LevelId, index: usize, asset: AssetHandle) -> Result<Section, BuildError> {
        let target = self.levels.get(level).ok_or(BuildError::InvalidLevelId(level))?;
        let name = target.name.clone();
        let proxy = target.is_proxy();
        let recarve = target.carved.contains_key(&index);
        let carved_below = target.carved.range(..index).count();
        let len = self.registry.get_all_of(level).len();
        if index >= len {
            return Err(BuildError::IndexOutOfRange { level, index, len });
        }
        if self.stretched {
            self.repose_all();
        }

        let split = !proxy && self.section_kind() == SectionKind::Instanced;
        if split && !recarve {
            self.registry.replace_with_discrete(level, index - carved_below)?;
        }
        self.carves.entry(name).or_default().insert(index, asset.clone());
        if let Some(target) = self.levels.get_mut(level) {
            target.carved.insert(index, asset.clone());
            target.dirty = true;
        }
        let report = self.patch(&[level]);
        if let Some(error) = report.failures.into_iter().find(|error| !error.is_degraded_success()) {
            return Err(error);
        }

        let section = match (proxy, split) {
            (true, _) => self.existing_section(SectionKind::Proxy, level, index)?,
            (false, true) => self.existing_section(SectionKind::Discrete, level, carved_below)?,
            (false, false) => self.existing_section(SectionKind::Discrete, level, index)?,
        };
        tracing::info!(level = %level, index, %asset, "carved section");
        Ok(section)
    }

    pub fn snapshot(&self) -> Preset {
        Preset {
            config: self.config.clone(),
            bounds: self.bounds.current(),
            levels: self.levels.snapshot(),
        }
    }

    /// Rebuild exactly the preset's levels. Level assets that differ from
    /// what the layout would produce become overrides for later edits.
    pub fn restore(&mut self, preset: Preset) -> ReconcileReport {
        self.config = preset.config;
        self.engine = ReconciliationEngine::new(self.config.execution_mode, self.config.representation);
        self.bounds = BoundsTracker::new(preset.bounds);
        self.stretched = false;

        let layout = self.layout.blueprints(&preset.bounds, &self.config);
        self.asset_overrides.clear();
        self.carves = preset
            .levels
            .iter()
            .filter(|level| !level.carved.is_empty())
            .map(|level| (level.name.clone(), level.carved.clone()))
            .collect();
        for level in &preset.levels {
            let layout_asset = layout
                .iter()
                .find(|blueprint| blueprint.name == level.name)
                .map(|blueprint| &blueprint.initializer.asset);
            if layout_asset.is_some_and(|asset| *asset != level.initializer.asset) {
                self.asset_overrides
                    .insert(level.name.clone(), level.initializer.asset.clone());
            }
        }

        let blueprints: Vec<LevelBlueprint> = preset.levels.iter().map(LevelBlueprint::from_level).collect();
        self.run(Edit::Restore, &blueprints)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn cell_size(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X | Axis::Y => self.config.wall_resolution.x,
            Axis::Z => self.config.wall_resolution.z,
        }
    }

    fn existing_section(&self, kind: SectionKind, level: LevelId, index: usize) -> Result<Section, BuildError> {
        self.registry
            .get_at(kind, level, index)
            .ok_or(BuildError::IndexOutOfRange {
                level,
                index,
                len: self.registry.count_of(kind, level),
            })
    }

    fn blueprints(&self) -> Vec<LevelBlueprint> {
        let mut blueprints = self.layout.blueprints(&self.bounds.current(), &self.config);
        for blueprint in &mut blueprints {
            if let Some(asset) = self.asset_overrides.get(&blueprint.name) {
                blueprint.initializer.asset = asset.clone();
            }
            if let Some(carved) = self.carves.get(&blueprint.name) {
                blueprint.carved = carved.clone();
            }
        }
        blueprints
    }

    fn reconcile(&mut self, edit: Edit) -> ReconcileReport {
        let blueprints = self.blueprints();
        self.run(edit, &blueprints)
    }

    fn run(&mut self, edit: Edit, blueprints: &[LevelBlueprint]) -> ReconcileReport {
        if std::mem::take(&mut self.stretched) {
            for level in self.levels.iter_mut() {
                level.dirty = true;
            }
        }
        let mut ctx = ReconcileContext {
            levels: &mut self.levels,
            registry: &mut self.registry,
            blueprints,
            container_pose: self.pose,
            bounds: self.bounds.current(),
            shapes: &self.shapes,
        };
        self.engine.reconcile(&edit, &mut ctx)
    }

    /// Re-solve every level in place without touching the level table.
    fn repose_all(&mut self) -> ReconcileReport {
        self.stretched = false;
        for level in self.levels.iter_mut() {
            level.dirty = true;
        }
        let ids = self.levels.ids();
        self.patch(&ids)
    }

    /// Patch the given levels outside of a planned pass.
    fn patch(&mut self, ids: &[LevelId]) -> ReconcileReport {
        let mut report = ReconcileReport {
            plan: Some(ReconcilePlan::ProxiesOnly),
            ..Default::default()
        };
        let mut ctx = ReconcileContext {
            levels: &mut self.levels,
            registry: &mut self.registry,
            blueprints: &[],
            container_pose: self.pose,
            bounds: self.bounds.current(),
            shapes: &self.shapes,
        };
        for &id in ids {
            self.engine.patch_level(&mut ctx, id, &mut report);
        }
        report
    }
}
