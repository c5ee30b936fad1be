//! Level - one logical layer of a building (a wall ring, the roof, ...)

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::initializer::{AssetHandle, Initializer};

/// Integer handle of a level. Sections refer back to their level through
/// this id only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(pub i32);

impl LevelId {
    pub const INVALID: LevelId = LevelId(-1);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl Default for LevelId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where inside its cell a section's pivot sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotLocation {
    /// Pivot at the cell's min corner
    #[default]
    Corner,
    /// Pivot at the cell's center
    Center,
    /// Pivot centered on the cell's floor
    BottomCenter,
}

impl PivotLocation {
    /// Local offset from the cell's min corner to the pivot.
    pub fn offset(self, resolution: Vec3) -> Vec3 {
        match self {
            PivotLocation::Corner => Vec3::ZERO,
            PivotLocation::Center => resolution * 0.5,
            PivotLocation::BottomCenter => Vec3::new(resolution.x * 0.5, resolution.y * 0.5, 0.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Assigned once by the level table; never changes
    id: LevelId,
    /// Display name, e.g. "Wall_2"
    pub name: String,
    pub initializer: Initializer,
    /// Name of the shape strategy applied to this level, if any
    pub shape: Option<String>,
    /// Z offset in cell-height units relative to the building origin
    pub height_multiplier: f32,
    pub pivot: PivotLocation,
    /// Set when the initializer changed since the sections were last solved
    pub dirty: bool,
    /// Raw indices skipped by the last solve, ascending
    #[serde(default)]
    pub skipped: Vec<usize>,
    /// Name of the level this one sits on; the one before it when unset
    #[serde(default)]
    pub rests_on: Option<String>,
    /// Cells given their own asset, by adjusted index. On instanced levels
    /// these cells are placed as discrete sections.
    #[serde(default)]
    pub carved: BTreeMap<usize, AssetHandle>,
}

impl Level {
    pub fn new(id: LevelId, name: impl Into<String>, initializer: Initializer) -> Self {
        Self {
            id,
            name: name.into(),
            initializer,
            shape: None,
            height_multiplier: 0.0,
            pivot: PivotLocation::default(),
            dirty: false,
            skipped: Vec::new(),
            rests_on: None,
            carved: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_valid() && self.initializer.is_valid()
    }

    pub fn is_proxy(&self) -> bool {
        self.initializer.is_proxy()
    }

    /// Index within the placed sections for a raw grid index, or `None`
    /// if that raw index was skipped.
    pub fn adjusted_index(&self, raw_index: usize) -> Option<usize> {
        match self.skipped.binary_search(&raw_index) {
            Ok(_) => None,
            Err(skipped_before) => Some(raw_index - skipped_before),
        }
    }

    /// Record the skips of a fresh solve.
    pub fn record_skips(&mut self, skipped: Vec<usize>) {
        self.initializer.skip_count = skipped.len();
        self.skipped = skipped;
    }
}

/// Desired state of a level, produced by a layout collaborator and
/// synced into the level table by the reconciliation engine.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelBlueprint {
    pub name: String,
    pub initializer: Initializer,
    pub height_multiplier: f32,
    pub pivot: PivotLocation,
    pub shape: Option<String>,
    pub rests_on: Option<String>,
    pub carved: BTreeMap<usize, AssetHandle>,
}

impl LevelBlueprint {
    pub fn new(name: impl Into<String>, initializer: Initializer) -> Self {
        Self {
            name: name.into(),
            initializer,
            height_multiplier: 0.0,
            pivot: PivotLocation::default(),
            shape: None,
            rests_on: None,
            carved: BTreeMap::new(),
        }
    }

    /// Blueprint reproducing an existing level (preset restore).
    pub fn from_level(level: &Level) -> Self {
        let mut initializer = level.initializer.clone();
        initializer.skip_count = 0;
        Self {
            name: level.name.clone(),
            initializer,
            height_multiplier: level.height_multiplier,
            pivot: level.pivot,
            shape: level.shape.clone(),
            rests_on: level.rests_on.clone(),
            carved: level.carved.clone(),
        }
    }

    pub fn at_height(mut self, height_multiplier: f32) -> Self {
        self.height_multiplier = height_multiplier;
        self
    }

    pub fn with_shape(mut self, shape: Option<String>) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_pivot(mut self, pivot: PivotLocation) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn resting_on(mut self, name: impl Into<String>) -> Self {
        self.rests_on = Some(name.into());
        self
    }

    pub fn with_carved(mut self, carved: BTreeMap<usize, AssetHandle>) -> Self {
        self.carved = carved;
        self
    }

    /// Build a fresh level. Fresh levels start clean: they have no sections
    /// to patch, so the engine populates them in full.
    pub fn instantiate(&self, id: LevelId) -> Level {
        let mut level = Level::new(id, self.name.clone(), self.initializer.clone());
        level.height_multiplier = self.height_multiplier;
        level.pivot = self.pivot;
        level.shape = self.shape.clone();
        level.rests_on = self.rests_on.clone();
        level.carved = self.carved.clone();
        level
    }

    /// Copy this blueprint onto an existing level. Marks the level dirty and
    /// returns true when anything that affects placement changed.
    pub fn apply_to(&self, level: &mut Level) -> bool {
        let changed = !self.initializer.same_layout(&level.initializer)
            || self.height_multiplier != level.height_multiplier
            || self.pivot != level.pivot
            || self.shape != level.shape
            || self.rests_on != level.rests_on
            || self.carved != level.carved;
        if changed {
            let skip_count = level.initializer.skip_count;
            level.initializer = self.initializer.clone();
            level.initializer.skip_count = skip_count;
            level.height_multiplier = self.height_multiplier;
            level.pivot = self.pivot;
            level.shape = self.shape.clone();
            level.rests_on = self.rests_on.clone();
            level.carved = self.carved.clone();
            level.dirty = true;
        }
        level.name = self.name.clone();
        changed
    }
}
