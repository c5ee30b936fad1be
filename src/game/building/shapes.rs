//! Footprint Shapes
//!
//! Concrete shape strategies for box buildings. Both work in
//! building-local space on the cells the pose solver produced.

use glam::Vec3;

use crate::bounds::Bounds;
use crate::level::{Level, SnapMode};
use crate::math::Pose;
use crate::solver::{ShapeAdjust, ShapeLibrary, ShapeStrategy, SkippedCell, get_wall_current_row, get_wall_side};

/// Cuts a rectangular notch out of the front-right corner of grid levels
/// (floors and flat roofs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotchShape {
    /// Columns removed, counted from the right edge
    pub width: usize,
    /// Rows removed, counted from the front edge
    pub depth: usize,
}

impl NotchShape {
    pub const NAME: &'static str = "notch";

    pub fn new(width: usize, depth: usize) -> Self {
        Self { width, depth }
    }

    fn in_notch(&self, raw_index: usize, max_in_row: i32) -> bool {
        let row = get_wall_current_row(raw_index, max_in_row);
        let columns = max_in_row.max(0) as usize;
        let col = if columns == 0 { raw_index } else { raw_index % columns };
        row < self.depth && col + self.width >= columns.max(1)
    }
}

impl Default for NotchShape {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl ShapeStrategy for NotchShape {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports(&self, level: &Level) -> bool {
        matches!(level.initializer.snap_mode, SnapMode::Default | SnapMode::Rooftop)
    }

    fn adjust(&self, pose: Pose, raw_index: usize, _skipped: usize, _bounds: &Bounds, level: &Level) -> ShapeAdjust {
        if self.width > 0 && self.in_notch(raw_index, level.initializer.max_in_row) {
            ShapeAdjust::Skip
        } else {
            ShapeAdjust::Keep(pose)
        }
    }
}

/// Pushes the front wall run inward by a fixed depth (a recessed porch)
/// and closes the two gaps with short return pieces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsetFrontShape {
    /// Inward offset in world units
    pub depth: f32,
}

impl InsetFrontShape {
    pub const NAME: &'static str = "inset_front";

    pub fn new(depth: f32) -> Self {
        Self { depth }
    }
}

impl Default for InsetFrontShape {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl ShapeStrategy for InsetFrontShape {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports(&self, level: &Level) -> bool {
        level.initializer.snap_mode == SnapMode::Wall && level.initializer.max_in_row > 0
    }

    fn adjust(&self, pose: Pose, raw_index: usize, _skipped: usize, _bounds: &Bounds, level: &Level) -> ShapeAdjust {
        let init = &level.initializer;
        if get_wall_side(raw_index, init.max_in_row, init.total_count) == 0 {
            ShapeAdjust::Keep(pose.offset(pose.right() * self.depth))
        } else {
            ShapeAdjust::Keep(pose)
        }
    }

    fn fill_in(&self, _skipped: &[SkippedCell], _bounds: &Bounds, level: &Level) -> Vec<Pose> {
        let init = &level.initializer;
        let res = init.resolution_or_zero();
        if self.depth <= 0.0 || res.x <= 0.0 || init.total_count <= 0 {
            return Vec::new();
        }
        let z = res.z * level.height_multiplier;
        let run = init.max_in_row as f32 * res.x;
        let scale = Vec3::new(self.depth / res.x, 1.0, 1.0);
        [0.0, run]
            .into_iter()
            .map(|x| Pose::from_translation_yaw(Vec3::new(x, 0.0, z), 90.0).with_scale(scale))
            .collect()
    }
}

/// Library with every built-in strategy at its default settings.
pub fn default_shapes() -> ShapeLibrary {
    let mut library = ShapeLibrary::new();
    library.register(Box::new(NotchShape::default()));
    library.register(Box::new(InsetFrontShape::default()));
    library
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{AssetHandle, Initializer, LevelId};
    use crate::solver::solve_level;

    fn level(snap_mode: SnapMode, total: i32, row: i32, res: Vec3) -> Level {
        Level::new(
            LevelId(0),
            "Test",
            Initializer::new(res, snap_mode, total, row, Some(AssetHandle::new("SM_Test"))),
        )
    }

    #[test]
    fn test_notch_skips_front_right_cells() {
        let floor = level(SnapMode::Default, 9, 3, Vec3::new(400.0, 400.0, 20.0));
        let notch = NotchShape::new(1, 2);
        let solution = solve_level(&floor, Pose::IDENTITY, Vec3::ZERO, &Bounds::new(3, 3, 1), Some(&notch)).unwrap();
        assert_eq!(solution.skipped, vec![2, 5]);
        assert_eq!(solution.len(), 7);
        // Raw 6 is the first cell of the back row, two skips earlier.
        assert_eq!(solution.cells[4].raw_index, 6);
        assert_eq!(solution.cells[4].adjusted_index, 4);
    }

    #[test]
    fn test_notch_rejects_walls() {
        let wall = level(SnapMode::Wall, 8, 2, Vec3::new(400.0, 20.0, 300.0));
        assert!(!NotchShape::default().supports(&wall));
    }

    #[test]
    fn test_inset_front_moves_only_front_run() {
        let wall = level(SnapMode::Wall, 8, 2, Vec3::new(400.0, 20.0, 300.0));
        let inset = InsetFrontShape::new(100.0);
        let solution = solve_level(&wall, Pose::IDENTITY, Vec3::ZERO, &Bounds::new(2, 2, 1), Some(&inset)).unwrap();
        assert!(solution.rejection.is_none());
        assert_eq!(solution.len(), 10);
        assert!(solution.cells[1].pose.translation.abs_diff_eq(Vec3::new(400.0, 100.0, 0.0), 1e-3));
        assert!(solution.cells[2].pose.translation.abs_diff_eq(Vec3::new(800.0, 0.0, 0.0), 1e-3));

        let returns = &solution.cells[8..];
        assert_eq!(returns[1].adjusted_index, 9);
        assert!((returns[1].pose.scale.x - 0.25).abs() < 1e-5);
        assert!(returns[1].pose.translation.abs_diff_eq(Vec3::new(800.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn test_default_library_has_both() {
        let library = default_shapes();
        let names: Vec<&str> = library.names().collect();
        assert_eq!(names, vec![InsetFrontShape::NAME, NotchShape::NAME]);
    }
}
