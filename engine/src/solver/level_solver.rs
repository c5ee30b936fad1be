//! Level Solver - every pose of one level, shape strategy included
//!
//! Walks `0..section_count` through the pose solver, lets the level's shape
//! strategy keep/move/skip each cell, then appends the strategy's fill-in
//! pieces. Output poses are in world space.

use glam::Vec3;

use super::pose_solver::{SolveParams, local_pose};
use super::shape::{ShapeAdjust, ShapeStrategy, SkipTracker, SkippedCell};
use crate::bounds::Bounds;
use crate::error::BuildError;
use crate::level::{Level, LevelId};
use crate::math::Pose;

/// One placed cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolvedCell {
    /// Grid index before skips; fill-in pieces continue past the grid
    pub raw_index: usize,
    /// Position among the level's placed sections
    pub adjusted_index: usize,
    pub pose: Pose,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelSolution {
    pub level_id: LevelId,
    /// Ordered by adjusted index
    pub cells: Vec<SolvedCell>,
    /// Raw indices the shape strategy skipped, ascending
    pub skipped: Vec<usize>,
    /// Set when the strategy declined the level and the plain layout was used
    pub rejection: Option<BuildError>,
}

impl LevelSolution {
    fn empty(level_id: LevelId) -> Self {
        Self {
            level_id,
            cells: Vec::new(),
            skipped: Vec::new(),
            rejection: None,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn poses(&self) -> Vec<Pose> {
        self.cells.iter().map(|cell| cell.pose).collect()
    }

    pub fn pose_at(&self, adjusted_index: usize) -> Option<Pose> {
        self.cells.get(adjusted_index).map(|cell| cell.pose)
    }
}

/// Solve every cell of `level`.
///
/// Invalid levels fail with [`BuildError::MissingAsset`]; the caller logs
/// and skips them. A strategy that does not support the level is reported
/// in [`LevelSolution::rejection`] and the unmodified layout is returned.
pub fn solve_level(
    level: &Level,
    container_pose: Pose,
    previous_resolution: Vec3,
    bounds: &Bounds,
    shape: Option<&dyn ShapeStrategy>,
) -> Result<LevelSolution, BuildError> {
    if !level.is_valid() {
        return Err(BuildError::MissingAsset { level: level.id() });
    }
    let mut solution = LevelSolution::empty(level.id());
    if level.initializer.skip_and_hide {
        return Ok(solution);
    }

    let shape = match shape {
        Some(strategy) if !strategy.supports(level) => {
            tracing::warn!(
                level = %level.id(),
                strategy = strategy.name(),
                "shape strategy rejected level, using plain layout"
            );
            solution.rejection = Some(BuildError::ShapeStrategyRejection {
                level: level.id(),
                strategy: strategy.name().to_string(),
            });
            None
        }
        other => other,
    };

    let params = SolveParams::for_level(level, container_pose, previous_resolution);
    let count = level.initializer.section_count();
    let mut tracker = SkipTracker::new();
    let mut skipped_cells = Vec::new();

    for raw_index in 0..count {
        let local = local_pose(&params, raw_index);
        let adjusted = match shape {
            Some(strategy) => {
                strategy.adjust(local, raw_index, tracker.skipped_so_far(), bounds, level)
            }
            None => ShapeAdjust::Keep(local),
        };
        match adjusted {
            ShapeAdjust::Keep(pose) => solution.cells.push(SolvedCell {
                raw_index,
                adjusted_index: raw_index - tracker.skipped_so_far(),
                pose: container_pose.compose(&pose),
            }),
            ShapeAdjust::Skip => {
                tracker.record(raw_index);
                skipped_cells.push(SkippedCell {
                    raw_index,
                    pose: local,
                });
            }
        }
    }

    if let Some(strategy) = shape {
        let fill_ins = strategy.fill_in(&skipped_cells, bounds, level);
        for (k, pose) in fill_ins.into_iter().enumerate() {
            let adjusted_index = solution.cells.len();
            solution.cells.push(SolvedCell {
                raw_index: count + k,
                adjusted_index,
                pose: container_pose.compose(&pose),
            });
        }
    }

    solution.skipped = tracker.into_skipped();
    tracing::debug!(
        level = %level.id(),
        cells = solution.cells.len(),
        skipped = solution.skipped.len(),
        "solved level"
    );
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{AssetHandle, Initializer, SnapMode};

    fn floor(total: i32, row: i32) -> Level {
        Level::new(
            LevelId(0),
            "Floor",
            Initializer::new(
                Vec3::new(400.0, 400.0, 20.0),
                SnapMode::Default,
                total,
                row,
                Some(AssetHandle::new("SM_Floor")),
            ),
        )
    }

    struct SkipOdd;

    impl ShapeStrategy for SkipOdd {
        fn name(&self) -> &str {
            "skip_odd"
        }

        fn adjust(&self, pose: Pose, raw: usize, _: usize, _: &Bounds, _: &Level) -> ShapeAdjust {
            if raw % 2 == 1 { ShapeAdjust::Skip } else { ShapeAdjust::Keep(pose) }
        }

        fn fill_in(&self, skipped: &[SkippedCell], _: &Bounds, _: &Level) -> Vec<Pose> {
            skipped.first().map(|cell| cell.pose).into_iter().collect()
        }
    }

    struct Picky;

    impl ShapeStrategy for Picky {
        fn name(&self) -> &str {
            "picky"
        }

        fn supports(&self, _: &Level) -> bool {
            false
        }

        fn adjust(&self, _: Pose, _: usize, _: usize, _: &Bounds, _: &Level) -> ShapeAdjust {
            ShapeAdjust::Skip
        }
    }

    #[test]
    fn test_plain_level_solves_every_cell() {
        let solution = solve_level(&floor(6, 3), Pose::IDENTITY, Vec3::ZERO, &Bounds::default(), None).unwrap();
        assert_eq!(solution.len(), 6);
        assert!(solution.skipped.is_empty());
        assert_eq!(solution.cells[4].pose.translation, Vec3::new(400.0, 400.0, 0.0));
    }

    #[test]
    fn test_skips_shift_adjusted_indices() {
        let solution =
            solve_level(&floor(6, 3), Pose::IDENTITY, Vec3::ZERO, &Bounds::default(), Some(&SkipOdd)).unwrap();
        assert_eq!(solution.skipped, vec![1, 3, 5]);
        let pairs: Vec<(usize, usize)> = solution
            .cells
            .iter()
            .map(|cell| (cell.raw_index, cell.adjusted_index))
            .collect();
        // Three kept cells plus one fill-in.
        assert_eq!(pairs, vec![(0, 0), (2, 1), (4, 2), (6, 3)]);
        assert_eq!(solution.cells[3].pose.translation, Vec3::new(400.0, 0.0, 0.0));
    }

    #[test]
    fn test_rejection_falls_back_to_plain_layout() {
        let solution =
            solve_level(&floor(4, 2), Pose::IDENTITY, Vec3::ZERO, &Bounds::default(), Some(&Picky)).unwrap();
        assert_eq!(solution.len(), 4);
        assert!(matches!(
            solution.rejection,
            Some(BuildError::ShapeStrategyRejection { .. })
        ));
    }

    #[test]
    fn test_invalid_level_reports_missing_asset() {
        let mut level = floor(4, 2);
        level.initializer.asset = None;
        let result = solve_level(&level, Pose::IDENTITY, Vec3::ZERO, &Bounds::default(), None);
        assert_eq!(result, Err(BuildError::MissingAsset { level: LevelId(0) }));
    }

    #[test]
    fn test_hidden_level_is_empty() {
        let mut level = floor(4, 2);
        level.initializer.skip_and_hide = true;
        let solution = solve_level(&level, Pose::IDENTITY, Vec3::ZERO, &Bounds::default(), None).unwrap();
        assert!(solution.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let level = floor(9, 3);
        let base = Pose::from_translation_yaw(Vec3::new(10.0, 20.0, 0.0), 45.0);
        let a = solve_level(&level, base, Vec3::ZERO, &Bounds::default(), None).unwrap();
        let b = solve_level(&level, base, Vec3::ZERO, &Bounds::default(), None).unwrap();
        assert_eq!(a, b);
    }
}
