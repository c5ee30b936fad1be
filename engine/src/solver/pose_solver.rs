//! Pose Solver - grid index to world pose
//!
//! Pure functions, no hidden state: the same parameters and index always
//! produce the same pose.
//!
//! Layouts (local space, Z-up, before `base_pose` is applied):
//! - Default: row-major, columns along +X, rows along +Y
//! - Wall: rectangular perimeter - front row (+X), right column (+Y),
//!   back row (-X), left column (-Y), quarter turn at each corner
//! - Roof: Wall layout pushed outward by the depth of the level below
//! - Rooftop: Default layout pulled out to cover the walls below
//! - Corner: four caps at the perimeter corners

use glam::Vec3;

use crate::level::{Level, PivotLocation, SnapMode};
use crate::math::Pose;

/// Everything needed to place one cell of a level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveParams {
    /// Building origin the local layout hangs off
    pub base_pose: Pose,
    /// Cell size of this level
    pub resolution: Vec3,
    pub max_in_row: i32,
    pub total_count: i32,
    /// Z offset in cell-height units
    pub height_multiplier: f32,
    /// Cell size of the level this one rests on (Roof/Rooftop/Corner)
    pub previous_resolution: Vec3,
    pub snap_mode: SnapMode,
    pub pivot: PivotLocation,
}

impl SolveParams {
    pub fn for_level(level: &Level, base_pose: Pose, previous_resolution: Vec3) -> Self {
        let init = &level.initializer;
        Self {
            base_pose,
            resolution: init.resolution_or_zero(),
            max_in_row: init.max_in_row,
            total_count: init.total_count,
            height_multiplier: level.height_multiplier,
            previous_resolution,
            snap_mode: init.snap_mode,
            pivot: level.pivot,
        }
    }
}

/// Side lengths of a rectangular perimeter, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Perimeter {
    pub width: usize,
    pub depth: usize,
}

/// Where a perimeter index lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerimeterCell {
    /// Full laps completed before this index
    pub ring: usize,
    /// 0 = front, 1 = right, 2 = back, 3 = left
    pub side: usize,
    /// Cells into the current side
    pub offset: usize,
}

impl Perimeter {
    /// Front edge is `max_in_row`; depth follows from `2 * (width + depth)`.
    pub fn from_counts(max_in_row: i32, total_count: i32) -> Self {
        let width = max_in_row.max(0) as usize;
        if width == 0 {
            return Self { width: 0, depth: 0 };
        }
        let half = (total_count.max(0) / 2) as usize;
        Self {
            width,
            depth: half.saturating_sub(width),
        }
    }

    pub fn len(&self) -> usize {
        2 * (self.width + self.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn side_length(&self, side: usize) -> usize {
        if side % 2 == 0 { self.width } else { self.depth }
    }

    pub fn locate(&self, index: usize) -> PerimeterCell {
        let len = self.len();
        if len == 0 {
            // No perimeter to walk: everything sits on the front row.
            return PerimeterCell {
                ring: 0,
                side: 0,
                offset: index,
            };
        }
        let ring = index / len;
        let mut offset = index % len;
        let mut side = 0;
        while offset >= self.side_length(side) {
            offset -= self.side_length(side);
            side += 1;
        }
        PerimeterCell { ring, side, offset }
    }

    /// Corner position of the perimeter in cell units (side start points).
    fn corner(&self, side: usize) -> Vec3 {
        let (w, d) = (self.width as f32, self.depth as f32);
        match side % 4 {
            0 => Vec3::new(0.0, 0.0, 0.0),
            1 => Vec3::new(w, 0.0, 0.0),
            2 => Vec3::new(w, d, 0.0),
            _ => Vec3::new(0.0, d, 0.0),
        }
    }
}

/// Row a Default/Wall index falls in. `max_in_row <= 0` means one row.
pub fn get_wall_current_row(index: usize, max_in_row: i32) -> usize {
    if max_in_row <= 0 {
        return 0;
    }
    index / max_in_row as usize
}

/// Perimeter side (0..4) a Wall index falls on.
pub fn get_wall_side(index: usize, max_in_row: i32, total_count: i32) -> usize {
    Perimeter::from_counts(max_in_row, total_count).locate(index).side
}

/// Yaw for a perimeter side, in degrees.
pub fn side_yaw(side: usize) -> f32 {
    (side % 4) as f32 * 90.0
}

/// World pose of cell `index`.
pub fn solve(params: &SolveParams, index: usize) -> Pose {
    params.base_pose.compose(&local_pose(params, index))
}

/// Poses for cells `0..count`.
pub fn solve_range(params: &SolveParams, count: usize) -> Vec<Pose> {
    (0..count).map(|index| solve(params, index)).collect()
}

/// Pose of cell `index` relative to the building origin.
pub fn local_pose(params: &SolveParams, index: usize) -> Pose {
    let res = params.resolution;
    let prev = params.previous_resolution;
    let mut pose = match params.snap_mode {
        SnapMode::Default => grid_pose(index, params.max_in_row, res, res.z * params.height_multiplier),
        SnapMode::Rooftop => {
            let mut pose = grid_pose(index, params.max_in_row, res, prev.z * params.height_multiplier);
            pose.translation += Vec3::new(-prev.y, -prev.y, 0.0);
            pose
        }
        SnapMode::Wall => perimeter_pose(params, index, res.x, res.z * params.height_multiplier, res.z),
        SnapMode::Roof => {
            let mut pose = perimeter_pose(params, index, res.x, prev.z * params.height_multiplier, prev.z);
            // Outward is the opposite of a perimeter piece's right vector.
            pose.translation -= pose.right() * prev.y;
            pose
        }
        SnapMode::Corner => corner_pose(params, index),
    };
    pose.translation += pose.rotation * params.pivot.offset(res);
    pose
}

fn grid_pose(index: usize, max_in_row: i32, res: Vec3, z: f32) -> Pose {
    let (row, col) = if max_in_row <= 0 {
        (0, index)
    } else {
        let per_row = max_in_row as usize;
        (index / per_row, index % per_row)
    };
    Pose::from_translation(Vec3::new(col as f32 * res.x, row as f32 * res.y, z))
}

fn perimeter_pose(params: &SolveParams, index: usize, step: f32, z: f32, ring_height: f32) -> Pose {
    let perimeter = Perimeter::from_counts(params.max_in_row, params.total_count);
    let cell = perimeter.locate(index);
    let start = perimeter.corner(cell.side) * step;
    let yaw = side_yaw(cell.side);
    let along = Pose::from_translation_yaw(Vec3::ZERO, yaw).forward() * (cell.offset as f32 * step);
    let translation = start + along + Vec3::new(0.0, 0.0, z + cell.ring as f32 * ring_height);
    Pose::from_translation_yaw(snap_axis_noise(translation), yaw)
}

fn corner_pose(params: &SolveParams, index: usize) -> Pose {
    let prev = params.previous_resolution;
    let perimeter = Perimeter::from_counts(params.max_in_row, params.total_count);
    let side = index % 4;
    let yaw = side_yaw(side);
    let mut pose = Pose::from_translation_yaw(perimeter.corner(side) * prev.x, yaw);
    pose.translation -= (pose.forward() + pose.right()) * prev.y;
    pose.translation.z = prev.z * params.height_multiplier;
    pose.translation = snap_axis_noise(pose.translation);
    pose
}

/// Rotated unit axes carry ~1e-8 residue; keep solved grid positions exact.
fn snap_axis_noise(v: Vec3) -> Vec3 {
    let clean = |c: f32| {
        let rounded = c.round();
        if (c - rounded).abs() < 1.0e-3 { rounded } else { c }
    };
    Vec3::new(clean(v.x), clean(v.y), clean(v.z))
}
