//! Reconciliation Engine - full rebuild or incremental patch on every edit
//!
//! Each edit is turned into a [`ReconcilePlan`] first, then applied level by
//! level. Levels are independent: a failing level is logged, recorded in the
//! report and the pass moves on.
//!
//! Smart-mode decision table:
//!
//! | edit                       | plan            |
//! |----------------------------|-----------------|
//! | content, discrete meshes   | ProxiesOnly     |
//! | content, instanced meshes  | FullReset       |
//! | height shrank              | DropTopLevels   |
//! | height grew                | GrowTopLevels   |
//! | width/depth changed        | FullReset       |
//! | nothing changed            | ProxiesOnly     |
//! | representation / restore   | FullReset       |
//!
//! Within a pass, sections are always removed before new ones are added.

use serde::{Deserialize, Serialize};

use crate::bounds::{Bounds, BoundsDelta, ChangeKind};
use crate::error::BuildError;
use crate::level::{AssetHandle, LevelBlueprint, LevelId, LevelTable};
use crate::math::{Axis, Pose};
use crate::section::{PlacedSection, SectionKind, SectionRegistry};
use crate::solver::{ShapeLibrary, solve_level};

/// How much work an edit is allowed to skip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Clear and re-solve everything on every edit
    Regen,
    /// Patch only what the edit touched
    #[default]
    Smart,
}

/// How non-proxy sections are represented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshRepresentation {
    /// One spawned object per section
    #[default]
    Discrete,
    /// One shared instance buffer per level
    Instanced,
}

impl MeshRepresentation {
    pub fn section_kind(self) -> SectionKind {
        match self {
            MeshRepresentation::Discrete => SectionKind::Discrete,
            MeshRepresentation::Instanced => SectionKind::Instanced,
        }
    }
}

/// What the user changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    Bounds(BoundsDelta),
    /// Asset, shape or other content change with the bounds left alone
    Content,
    /// Switched between discrete and instanced meshes
    Representation,
    /// Levels were replaced from a preset
    Restore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcilePlan {
    /// Destroy every section and level, rebuild from the blueprints
    FullReset,
    /// Remove the excess top levels, patch the survivors
    DropTopLevels,
    /// Keep existing levels, add the new top levels
    GrowTopLevels,
    /// Reset proxies and patch dirty levels only
    ProxiesOnly,
}

/// Everything a pass reads and writes.
pub struct ReconcileContext<'a> {
    pub levels: &'a mut LevelTable,
    pub registry: &'a mut SectionRegistry,
    /// Desired levels in table order
    pub blueprints: &'a [LevelBlueprint],
    pub container_pose: Pose,
    pub bounds: Bounds,
    pub shapes: &'a ShapeLibrary,
}

/// Per-level section changes made by [`ReconciliationEngine::patch_level`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    pub added: usize,
    pub removed: usize,
    pub reposed: usize,
}

impl PatchOutcome {
    fn merge(self, other: PatchOutcome) -> Self {
        Self {
            added: self.added + other.added,
            removed: self.removed + other.removed,
            reposed: self.reposed + other.reposed,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcileReport {
    pub plan: Option<ReconcilePlan>,
    pub levels_created: usize,
    pub levels_removed: usize,
    pub sections_added: usize,
    pub sections_removed: usize,
    pub sections_reposed: usize,
    /// Recoverable failures, in the order they happened
    pub failures: Vec<BuildError>,
}

impl ReconcileReport {
    fn absorb(&mut self, outcome: PatchOutcome) {
        self.sections_added += outcome.added;
        self.sections_removed += outcome.removed;
        self.sections_reposed += outcome.reposed;
    }

    fn fail(&mut self, error: BuildError) {
        if error.is_degraded_success() {
            tracing::warn!(%error, "level placed with fallback");
        } else {
            tracing::error!(%error, "level reconciliation failed");
        }
        self.failures.push(error);
    }

    /// Whether every level was placed exactly as asked.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconciliationEngine {
    pub mode: ExecutionMode,
    pub representation: MeshRepresentation,
}

impl ReconciliationEngine {
    pub fn new(mode: ExecutionMode, representation: MeshRepresentation) -> Self {
        Self { mode, representation }
    }

    pub fn plan(&self, edit: &Edit) -> ReconcilePlan {
        if self.mode == ExecutionMode::Regen {
            return ReconcilePlan::FullReset;
        }
        match edit {
            Edit::Representation | Edit::Restore => ReconcilePlan::FullReset,
            Edit::Content => match self.representation {
                MeshRepresentation::Instanced => ReconcilePlan::FullReset,
                MeshRepresentation::Discrete => ReconcilePlan::ProxiesOnly,
            },
            Edit::Bounds(delta) => match delta.on(Axis::Z) {
                ChangeKind::Shrank(_) => ReconcilePlan::DropTopLevels,
                ChangeKind::Grew(_) => ReconcilePlan::GrowTopLevels,
                ChangeKind::Same if delta.footprint_changed() => ReconcilePlan::FullReset,
                ChangeKind::Same => ReconcilePlan::ProxiesOnly,
            },
        }
    }

    /// Apply one edit.
    pub fn reconcile(&self, edit: &Edit, ctx: &mut ReconcileContext<'_>) -> ReconcileReport {
        let plan = self.plan(edit);
        let mut report = ReconcileReport {
            plan: Some(plan),
            ..Default::default()
        };
        tracing::info!(?edit, ?plan, mode = ?self.mode, "reconciling building");

        match plan {
            ReconcilePlan::FullReset => {
                let before = ctx.registry.len();
                report.levels_removed = ctx.levels.len();
                ctx.registry.reset_all();
                ctx.levels.reset();
                report.sections_removed += before;
                for blueprint in ctx.blueprints {
                    ctx.levels.push(blueprint);
                    report.levels_created += 1;
                }
            }
            ReconcilePlan::DropTopLevels | ReconcilePlan::GrowTopLevels | ReconcilePlan::ProxiesOnly => {
                report.sections_removed += ctx.registry.len_of(SectionKind::Proxy);
                ctx.registry.reset_proxies();
                self.sync_levels(ctx, &mut report);
            }
        }
        report.sections_removed += ctx.registry.retain_levels(&ctx.levels.ids());

        for id in ctx.levels.ids() {
            self.patch_level(ctx, id, &mut report);
        }

        tracing::info!(
            levels = ctx.levels.len(),
            added = report.sections_added,
            removed = report.sections_removed,
            reposed = report.sections_reposed,
            failures = report.failures.len(),
            "reconciliation finished"
        );
        report
    }

    /// Bring the level table in line with the blueprints without
    /// recreating surviving levels. Extra top levels lose their sections
    /// first, then the table is truncated; missing ones are appended fresh.
    fn sync_levels(&self, ctx: &mut ReconcileContext<'_>, report: &mut ReconcileReport) {
        let wanted = ctx.blueprints.len();
        let ids = ctx.levels.ids();
        for &id in ids.iter().skip(wanted) {
            report.sections_removed += ctx.registry.get_all_of(id).len();
            ctx.registry.reset(id);
        }
        let dropped = ctx.levels.truncate(wanted);
        report.levels_removed += dropped.len();
        if !dropped.is_empty() {
            tracing::debug!(?dropped, "dropped top levels");
        }

        for (position, blueprint) in ctx.blueprints.iter().enumerate() {
            match ctx.levels.at_mut(position) {
                Some(level) => {
                    if blueprint.apply_to(level) {
                        tracing::debug!(level = %level.id(), name = %level.name, "level marked dirty");
                    }
                }
                None => {
                    ctx.levels.push(blueprint);
                    report.levels_created += 1;
                }
            }
        }
    }

    /// Patch one level's sections towards a fresh solve.
    ///
    /// - no sections yet: populate every cell
    /// - dirty: drop the surplus, re-pose the overlap in place (asset
    ///   included), then append whatever is missing
    /// - clean: nothing to do
    ///
    /// Afterwards the level holds exactly one section per solved cell,
    /// carved cells included.
    ///
    /// The level is clean afterwards whatever happened.
    pub fn patch_level(&self, ctx: &mut ReconcileContext<'_>, id: LevelId, report: &mut ReconcileReport) -> PatchOutcome {
        let Some(level) = ctx.levels.get(id) else {
            report.fail(BuildError::InvalidLevelId(id));
            return PatchOutcome::default();
        };
        let kind = if level.is_proxy() {
            SectionKind::Proxy
        } else {
            self.representation.section_kind()
        };
        let existing = ctx.registry.get_all_of(id).len();
        if existing > 0 && !level.dirty {
            return PatchOutcome::default();
        }

        let shape = match ctx.shapes.for_level(level) {
            Ok(shape) => shape,
            Err(error) => {
                report.fail(error);
                None
            }
        };
        let previous_resolution = ctx
            .levels
            .support_of(id)
            .map(|support| support.initializer.resolution_or_zero())
            .unwrap_or_default();

        let solution = match solve_level(level, ctx.container_pose, previous_resolution, &ctx.bounds, shape) {
            Ok(solution) => solution,
            Err(error) => {
                report.fail(error);
                if let Some(level) = ctx.levels.get_mut(id) {
                    level.dirty = false;
                }
                return PatchOutcome::default();
            }
        };
        if let Some(rejection) = solution.rejection.clone() {
            report.fail(rejection);
        }

        let asset = level.initializer.asset.clone();
        let class = level.initializer.actor_class.clone();
        let wanted = solution.len();

        // Carved cells keep their own asset. On instanced levels they are
        // discrete sections next to the level's buffer.
        let split = kind == SectionKind::Instanced;
        let mut cells = Vec::with_capacity(wanted);
        let mut carved = Vec::new();
        for (index, cell) in solution.cells.iter().enumerate() {
            match level.carved.get(&index) {
                Some(own) if split => carved.push((cell.pose, Some(own.clone()))),
                Some(own) => cells.push((cell.pose, Some(own.clone()))),
                None => cells.push((cell.pose, asset.clone())),
            }
        }

        let mut outcome = self.place(ctx.registry, kind, id, &cells, class.as_deref(), report);
        if split {
            outcome = outcome.merge(self.place(ctx.registry, SectionKind::Discrete, id, &carved, None, report));
        }

        if let Some(level) = ctx.levels.get_mut(id) {
            level.record_skips(solution.skipped.clone());
            level.dirty = false;
        }
        report.absorb(outcome);
        tracing::debug!(level = %id, ?kind, existing, wanted, ?outcome, "patched level");
        outcome
    }

    /// Match the level's sections of `kind` one to one with `targets`:
    /// drop the surplus, re-pose and re-skin the overlap, spawn the rest.
    fn place(
        &self,
        registry: &mut SectionRegistry,
        kind: SectionKind,
        id: LevelId,
        targets: &[(Pose, Option<AssetHandle>)],
        class: Option<&str>,
        report: &mut ReconcileReport,
    ) -> PatchOutcome {
        let mut outcome = PatchOutcome {
            removed: registry.remove_after(kind, targets.len(), id),
            ..Default::default()
        };
        let placed = registry.of_kind(kind, id);
        for (index, (section, (pose, asset))) in placed.iter().zip(targets).enumerate() {
            let scene = registry.scene_mut();
            if section.set_pose(scene, *pose) && section.set_asset(scene, asset.clone()) {
                outcome.reposed += 1;
            } else {
                report.fail(BuildError::InvalidSection { level: id, index });
            }
        }
        for (pose, asset) in targets.iter().skip(placed.len()) {
            match registry.spawn(kind, id, *pose, asset.clone(), class) {
                Ok(_) => outcome.added += 1,
                Err(error) => report.fail(error),
            }
        }
        outcome
    }
}
