//! Property-based invariant tests for the placement core.
//!
//! Verifies:
//! 1. Determinism: solving the same level twice gives the same poses
//! 2. Adjusted index = raw index minus the skips below it, for any skip set
//! 3. A wall ring closes: the last piece ends where the first one starts
//! 4. Stretching by (1, 1, 1) never moves a section
//! 5. Scale coefficients are neutral on empty axes and never decrease
//!    while a handle travels through one cell
//! 6. Truncating one level never touches sections of another level

use std::collections::BTreeSet;

use glam::{Quat, Vec3};
use building_gen_engine::bounds::{Bounds, calculate_scale_coefficient, calculate_scale_coefficient_with};
use building_gen_engine::level::{AssetHandle, Initializer, Level, LevelId, SnapMode};
use building_gen_engine::math::Pose;
use building_gen_engine::scene::Scene;
use building_gen_engine::section::{PlacedSection, Section, SectionKind, SectionRegistry};
use building_gen_engine::solver::{ShapeAdjust, ShapeStrategy, solve_level};
use building_gen_engine::stretch::StretchCorrector;
use proptest::prelude::*;

const WALL: Vec3 = Vec3::new(400.0, 20.0, 300.0);

// ── Helpers ───────────────────────────────────────────────────────────

fn level(snap_mode: SnapMode, total: i32, row: i32) -> Level {
    Level::new(
        LevelId(0),
        "Test",
        Initializer::new(WALL, snap_mode, total, row, Some(AssetHandle::new("SM_Test"))),
    )
}

/// Skips exactly the raw indices it was built with.
struct SkipSet(BTreeSet<usize>);

impl ShapeStrategy for SkipSet {
    fn name(&self) -> &str {
        "skip_set"
    }

    fn adjust(&self, pose: Pose, raw_index: usize, _skipped: usize, _bounds: &Bounds, _level: &Level) -> ShapeAdjust {
        if self.0.contains(&raw_index) { ShapeAdjust::Skip } else { ShapeAdjust::Keep(pose) }
    }
}

fn arb_pose() -> impl Strategy<Value = Pose> {
    (
        prop::array::uniform3(-5000.0f32..5000.0),
        0u32..4,
        prop::array::uniform3(0.5f32..2.0),
    )
        .prop_map(|(t, quarter, s)| {
            Pose::new(
                Vec3::from(t),
                Quat::from_rotation_z(quarter as f32 * std::f32::consts::FRAC_PI_2),
                Vec3::from(s),
            )
        })
}

fn arb_kind() -> impl Strategy<Value = SectionKind> {
    prop_oneof![
        Just(SectionKind::Discrete),
        Just(SectionKind::Proxy),
        Just(SectionKind::Instanced),
    ]
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn solve_is_deterministic(width in 1i32..8, depth in 1i32..8, height in 0u8..4) {
        let mut wall = level(SnapMode::Wall, 2 * (width + depth), width);
        wall.height_multiplier = height as f32;
        let bounds = Bounds::new(width, depth, 4);
        let first = solve_level(&wall, Pose::IDENTITY, Vec3::ZERO, &bounds, None).unwrap();
        let second = solve_level(&wall, Pose::IDENTITY, Vec3::ZERO, &bounds, None).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn adjusted_index_counts_skips_below(
        total in 1i32..=64,
        mask in prop::collection::vec(any::<bool>(), 64),
    ) {
        let skips: BTreeSet<usize> = (0..total as usize).filter(|&i| mask[i]).collect();
        let mut floor = level(SnapMode::Default, total, 8);
        let solution = solve_level(
            &floor,
            Pose::IDENTITY,
            Vec3::ZERO,
            &Bounds::new(8, 8, 1),
            Some(&SkipSet(skips.clone())),
        )
        .unwrap();

        prop_assert_eq!(solution.skipped.iter().copied().collect::<BTreeSet<_>>(), skips.clone());
        prop_assert_eq!(solution.len(), total as usize - skips.len());
        for cell in &solution.cells {
            let below = skips.iter().filter(|&&s| s < cell.raw_index).count();
            prop_assert_eq!(cell.adjusted_index, cell.raw_index - below);
        }

        floor.record_skips(solution.skipped.clone());
        for raw in 0..total as usize {
            let expected = (!skips.contains(&raw)).then(|| raw - skips.range(..raw).count());
            prop_assert_eq!(floor.adjusted_index(raw), expected);
        }
    }

    #[test]
    fn wall_ring_closes(width in 1i32..10, depth in 1i32..10) {
        let total = 2 * (width + depth);
        let wall = level(SnapMode::Wall, total, width);
        let solution = solve_level(&wall, Pose::IDENTITY, Vec3::ZERO, &Bounds::new(width, depth, 1), None).unwrap();
        prop_assert_eq!(solution.len(), total as usize);

        let first = solution.cells[0].pose;
        let last = solution.cells[total as usize - 1].pose;
        let end_of_last = last.translation + last.forward() * WALL.x;
        prop_assert!(end_of_last.abs_diff_eq(first.translation, 1e-2));
        prop_assert!(last.translation.distance(first.translation) <= WALL.x + 1e-2);
    }

    #[test]
    fn unit_stretch_moves_nothing(
        poses in prop::collection::vec(arb_pose(), 0..24),
        building in arb_pose(),
    ) {
        let mut registry = SectionRegistry::with_levels([LevelId(0)]);
        let sections: Vec<Section> = poses
            .iter()
            .map(|&pose| registry.init_discrete(LevelId(0), pose, Some(AssetHandle::new("SM_Wall"))).unwrap())
            .collect();
        let before: Vec<Option<Pose>> = sections.iter().map(|s| registry.pose(s)).collect();

        let scene: &mut Scene = registry.scene_mut();
        let written = StretchCorrector::new().apply(scene, &sections, building, None, Vec3::ONE, 1.0, |_, _| {});
        prop_assert_eq!(written, 0);

        let after: Vec<Option<Pose>> = sections.iter().map(|s| registry.pose(s)).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn scale_coefficient_bounds(
        location in -1.0e5f32..1.0e5,
        bounds_axis in 1i32..32,
        cell in 0i32..50,
        a in 0u32..100,
        b in 0u32..100,
    ) {
        prop_assert_eq!(calculate_scale_coefficient(location, 0), 1.0);
        let c = calculate_scale_coefficient(location, bounds_axis);
        prop_assert!((1.0..=2.0).contains(&c));

        let (lo, hi) = (a.min(b), a.max(b));
        let at = |step: u32| cell as f32 * 400.0 + step as f32 * 4.0;
        prop_assert!(
            calculate_scale_coefficient_with(at(lo), bounds_axis, 400.0)
                <= calculate_scale_coefficient_with(at(hi), bounds_axis, 400.0)
        );
    }

    #[test]
    fn truncation_stays_on_its_level(
        levels in prop::collection::vec(0i32..4, 0..40),
        kind in arb_kind(),
        index in 0usize..10,
        target in 0i32..4,
    ) {
        let mut registry = SectionRegistry::with_levels((0..4).map(LevelId));
        for (i, &level) in levels.iter().enumerate() {
            let pose = Pose::from_translation(Vec3::new(i as f32, level as f32, 0.0));
            registry.spawn(kind, LevelId(level), pose, Some(AssetHandle::new("SM_Wall")), Some("BP_Door")).unwrap();
        }
        let snapshot = |registry: &SectionRegistry, level: i32| -> Vec<Option<Pose>> {
            registry
                .of_kind(kind, LevelId(level))
                .iter()
                .map(|section| section.pose(registry.scene()))
                .collect()
        };
        let before: Vec<_> = (0..4).map(|level| snapshot(&registry, level)).collect();

        let removed = registry.remove_after(kind, index, LevelId(target));

        let had = before[target as usize].len();
        prop_assert_eq!(removed, had.saturating_sub(index));
        for level in 0..4 {
            let after = snapshot(&registry, level);
            if level == target {
                prop_assert_eq!(&after[..], &before[level as usize][..had.min(index)]);
            } else {
                prop_assert_eq!(&after, &before[level as usize]);
            }
        }
    }
}
