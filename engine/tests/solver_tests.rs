//! Solver Tests - Perimeter Walks, Grid Fills and Shape Skips
//!
//! Exercises `solve_level` end to end on hand-built levels: where each
//! snap mode puts its cells, how the container pose is applied and how
//! shape strategies shift the adjusted indices.

use glam::Vec3;
use building_gen_engine::bounds::Bounds;
use building_gen_engine::level::{AssetHandle, Initializer, Level, LevelId, SnapMode};
use building_gen_engine::math::Pose;
use building_gen_engine::solver::{ShapeAdjust, ShapeStrategy, SkippedCell, get_wall_current_row, solve_level};

const WALL: Vec3 = Vec3::new(400.0, 20.0, 300.0);
const TILE: Vec3 = Vec3::new(400.0, 400.0, 20.0);

fn level(snap_mode: SnapMode, resolution: Vec3, total: i32, row: i32, height: f32) -> Level {
    let mut level = Level::new(
        LevelId(0),
        "Test",
        Initializer::new(resolution, snap_mode, total, row, Some(AssetHandle::new("SM_Test"))),
    );
    level.height_multiplier = height;
    level
}

fn close(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, 1e-2)
}

// ============================================================================
// Wall perimeter
// ============================================================================

#[test]
fn test_wall_walks_all_four_sides() {
    let wall = level(SnapMode::Wall, WALL, 10, 3, 0.0);
    let solution = solve_level(&wall, Pose::IDENTITY, Vec3::ZERO, &Bounds::new(3, 2, 1), None).unwrap();
    assert_eq!(solution.len(), 10);

    let expected = [
        (0, Vec3::new(0.0, 0.0, 0.0), 0.0),
        (2, Vec3::new(800.0, 0.0, 0.0), 0.0),
        (3, Vec3::new(1200.0, 0.0, 0.0), 90.0),
        (5, Vec3::new(1200.0, 800.0, 0.0), 180.0),
        (8, Vec3::new(0.0, 800.0, 0.0), 270.0),
        (9, Vec3::new(0.0, 400.0, 0.0), 270.0),
    ];
    for (index, position, yaw) in expected {
        let pose = solution.pose_at(index).unwrap();
        assert!(close(pose.translation, position), "cell {index} at {}", pose.translation);
        assert!((pose.yaw_degrees() - yaw).abs() < 1e-2, "cell {index} yaw {}", pose.yaw_degrees());
    }
}

#[test]
fn test_square_ring_turns_every_row() {
    let wall = level(SnapMode::Wall, WALL, 16, 4, 0.0);
    let solution = solve_level(&wall, Pose::IDENTITY, Vec3::ZERO, &Bounds::new(4, 4, 1), None).unwrap();
    let yaws: Vec<f32> = solution.poses().iter().map(|pose| pose.yaw_degrees().round()).collect();
    for (index, yaw) in yaws.iter().enumerate() {
        assert_eq!(*yaw, (index / 4) as f32 * 90.0, "cell {index}");
    }
    assert_eq!(get_wall_current_row(5, 4), 1);
}

#[test]
fn test_wall_storey_height() {
    let wall = level(SnapMode::Wall, WALL, 8, 2, 2.0);
    let solution = solve_level(&wall, Pose::IDENTITY, Vec3::ZERO, &Bounds::new(2, 2, 3), None).unwrap();
    assert!(solution.poses().iter().all(|pose| (pose.translation.z - 600.0).abs() < 1e-3));
}

#[test]
fn test_container_pose_is_applied() {
    let wall = level(SnapMode::Wall, WALL, 8, 2, 0.0);
    let container = Pose::from_translation_yaw(Vec3::new(1000.0, 0.0, 0.0), 90.0);
    let solution = solve_level(&wall, container, Vec3::ZERO, &Bounds::new(2, 2, 1), None).unwrap();
    let second = solution.pose_at(1).unwrap();
    assert!(close(second.translation, Vec3::new(1000.0, 400.0, 0.0)));
    assert!((second.yaw_degrees() - 90.0).abs() < 1e-2);
}

// ============================================================================
// Grid levels
// ============================================================================

#[test]
fn test_floor_fills_rows() {
    let floor = level(SnapMode::Default, TILE, 6, 3, 0.0);
    let solution = solve_level(&floor, Pose::IDENTITY, Vec3::ZERO, &Bounds::new(3, 2, 1), None).unwrap();
    assert_eq!(solution.len(), 6);
    assert!(close(solution.pose_at(4).unwrap().translation, Vec3::new(400.0, 400.0, 0.0)));
}

#[test]
fn test_rooftop_sits_on_previous_level() {
    let roof = level(SnapMode::Rooftop, TILE, 4, 2, 2.0);
    let solution = solve_level(&roof, Pose::IDENTITY, WALL, &Bounds::new(2, 2, 2), None).unwrap();
    let first = solution.pose_at(0).unwrap();
    assert!(close(first.translation, Vec3::new(-20.0, -20.0, 600.0)));
}

#[test]
fn test_corner_always_four_cells() {
    let corner = level(SnapMode::Corner, Vec3::new(20.0, 20.0, 300.0), 14, 4, 1.0);
    let solution = solve_level(&corner, Pose::IDENTITY, WALL, &Bounds::new(4, 3, 2), None).unwrap();
    assert_eq!(solution.len(), 4);
    let first = solution.pose_at(0).unwrap();
    assert!(close(first.translation, Vec3::new(-20.0, -20.0, 300.0)));
}

// ============================================================================
// Shape strategies
// ============================================================================

/// Drops every raw index divisible by three and adds one marker piece.
struct EveryThird;

impl ShapeStrategy for EveryThird {
    fn name(&self) -> &str {
        "every_third"
    }

    fn adjust(&self, pose: Pose, raw_index: usize, _skipped: usize, _bounds: &Bounds, _level: &Level) -> ShapeAdjust {
        if raw_index % 3 == 0 { ShapeAdjust::Skip } else { ShapeAdjust::Keep(pose) }
    }

    fn fill_in(&self, skipped: &[SkippedCell], _bounds: &Bounds, _level: &Level) -> Vec<Pose> {
        vec![Pose::from_translation(Vec3::new(0.0, 0.0, skipped.len() as f32))]
    }
}

#[test]
fn test_skips_shift_adjusted_indices() {
    let floor = level(SnapMode::Default, TILE, 9, 3, 0.0);
    let solution = solve_level(&floor, Pose::IDENTITY, Vec3::ZERO, &Bounds::new(3, 3, 1), Some(&EveryThird)).unwrap();
    assert_eq!(solution.skipped, vec![0, 3, 6]);
    assert_eq!(solution.len(), 7);
    for cell in &solution.cells[..6] {
        let skips_below = solution.skipped.iter().filter(|&&s| s < cell.raw_index).count();
        assert_eq!(cell.adjusted_index, cell.raw_index - skips_below);
    }
    let marker = solution.cells.last().unwrap();
    assert_eq!(marker.raw_index, 9);
    assert_eq!(marker.adjusted_index, 6);
    assert_eq!(marker.pose.translation.z, 3.0);
}

#[test]
fn test_invalid_level_is_missing_asset() {
    let mut floor = level(SnapMode::Default, TILE, 4, 2, 0.0);
    floor.initializer.asset = None;
    assert!(solve_level(&floor, Pose::IDENTITY, Vec3::ZERO, &Bounds::default(), None).is_err());
}
