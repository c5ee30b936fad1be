//! Shape Strategies - non-rectangular footprints
//!
//! A strategy sees every solved cell of a level (in building-local space)
//! and may keep it, move it, or skip it. Skipped cells are handed back once
//! the level is done so the strategy can place fill-in pieces.
//!
//! Skips shift every later cell down: `adjusted = raw - skipped_so_far`.
//! Anything that addresses a section after placement uses the adjusted index.

use std::collections::BTreeMap;

use crate::bounds::Bounds;
use crate::error::BuildError;
use crate::level::Level;
use crate::math::Pose;

/// What a strategy decided for one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeAdjust {
    /// Place the cell at this (possibly moved) local pose
    Keep(Pose),
    /// Leave the cell out
    Skip,
}

/// A cell the strategy skipped, with the pose it would have had.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkippedCell {
    pub raw_index: usize,
    pub pose: Pose,
}

pub trait ShapeStrategy {
    /// Registry key; levels refer to strategies by this name.
    fn name(&self) -> &str;

    /// Whether this strategy can transform `level` at all. Returning false
    /// makes the solver fall back to the unmodified layout.
    fn supports(&self, _level: &Level) -> bool {
        true
    }

    /// Decide the fate of one cell. `pose` is relative to the building origin.
    fn adjust(
        &self,
        pose: Pose,
        raw_index: usize,
        skipped_so_far: usize,
        bounds: &Bounds,
        level: &Level,
    ) -> ShapeAdjust;

    /// Extra pieces placed after the regular cells (building-local poses).
    fn fill_in(&self, _skipped: &[SkippedCell], _bounds: &Bounds, _level: &Level) -> Vec<Pose> {
        Vec::new()
    }
}

/// Running skip bookkeeping for one solve.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkipTracker {
    skipped: Vec<usize>,
}

impl SkipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skipped raw index. Raw indices arrive in ascending order
    /// during a solve; out-of-order records are inserted in place.
    pub fn record(&mut self, raw_index: usize) {
        match self.skipped.binary_search(&raw_index) {
            Ok(_) => {}
            Err(pos) => self.skipped.insert(pos, raw_index),
        }
    }

    pub fn skipped_so_far(&self) -> usize {
        self.skipped.len()
    }

    /// `raw_index` minus the number of skips strictly below it.
    pub fn adjusted_index(&self, raw_index: usize) -> usize {
        let below = self.skipped.partition_point(|&s| s < raw_index);
        raw_index - below
    }

    pub fn is_skipped(&self, raw_index: usize) -> bool {
        self.skipped.binary_search(&raw_index).is_ok()
    }

    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<usize> {
        self.skipped
    }
}

/// Named strategies available to a building.
#[derive(Default)]
pub struct ShapeLibrary {
    strategies: BTreeMap<String, Box<dyn ShapeStrategy>>,
}

impl ShapeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, strategy: Box<dyn ShapeStrategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ShapeStrategy> {
        self.strategies.get(name).map(|s| s.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }

    /// Strategy referenced by a level, if any.
    pub fn for_level(&self, level: &Level) -> Result<Option<&dyn ShapeStrategy>, BuildError> {
        match &level.shape {
            None => Ok(None),
            Some(name) => self
                .get(name)
                .map(Some)
                .ok_or_else(|| BuildError::UnknownShape(name.clone())),
        }
    }
}

impl std::fmt::Debug for ShapeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeLibrary")
            .field("strategies", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}
