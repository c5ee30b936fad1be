//! Stretch Corrector - rescale placed sections without re-solving
//!
//! Works in building-local space. An axis is stretched when its coefficient
//! is not 1 or when it is the edited axis. Per stretched axis:
//! - sections running along the axis get their length (local forward
//!   scale) multiplied by the coefficient and their position along the
//!   axis by the location multiplier
//! - every other section only has its position along the axis multiplied
//!   by the coefficient
//!
//! Rotations are written back in a final pass after every scale and
//! position write.

use glam::Vec3;

use crate::level::LevelId;
use crate::math::{Axis, Pose};
use crate::scene::Scene;
use crate::section::{PlacedSection, Section};

/// Forward components at least this close to ±1 count as facing the axis.
pub const FACING_TOLERANCE: f32 = 0.1;

/// What the per-section callback gets to see.
#[derive(Clone, Copy, Debug)]
pub struct StretchContext<'a> {
    pub section: &'a Section,
    pub level_id: LevelId,
    pub edited_axis: Option<Axis>,
    pub coefficients: Vec3,
    /// Building-relative pose before this pass touched it
    pub original: Pose,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StretchCorrector {
    pub facing_tolerance: f32,
}

impl Default for StretchCorrector {
    fn default() -> Self {
        Self {
            facing_tolerance: FACING_TOLERANCE,
        }
    }
}

impl StretchCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a building-relative forward vector runs along `axis`.
    pub fn faces(&self, forward: Vec3, axis: Axis) -> bool {
        axis.of(forward).abs() >= 1.0 - self.facing_tolerance
    }

    /// Stretch `sections` in place. Invalid sections and sections whose
    /// pose comes out unchanged are skipped. Returns how many sections were
    /// written.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        scene: &mut Scene,
        sections: &[Section],
        building_pose: Pose,
        edited_axis: Option<Axis>,
        scale: Vec3,
        location_multiplier: f32,
        mut adjust: impl FnMut(&StretchContext, &mut Pose),
    ) -> usize {
        let stretched: Vec<Axis> = Axis::ALL
            .into_iter()
            .filter(|&axis| axis.of(scale) > 0.0)
            .filter(|&axis| axis.of(scale) != 1.0 || edited_axis == Some(axis))
            .collect();

        // Relative poses first; nothing is written until every section is known.
        let mut pending: Vec<(&Section, Pose, Pose)> = sections
            .iter()
            .filter_map(|section| {
                let world = section.pose(scene)?;
                let relative = building_pose.relative(&world);
                Some((section, relative, relative))
            })
            .collect();

        for &axis in &stretched {
            let coefficient = axis.of(scale);
            for (_, original, working) in pending.iter_mut() {
                if self.faces(original.forward(), axis) {
                    working.scale.x *= coefficient;
                    let along = axis.of(working.translation) * location_multiplier;
                    working.translation = axis.with(working.translation, along);
                } else {
                    let along = axis.of(working.translation) * coefficient;
                    working.translation = axis.with(working.translation, along);
                }
            }
        }

        let mut written = 0;
        for (section, original, mut working) in pending {
            let context = StretchContext {
                section,
                level_id: section.level_id(),
                edited_axis,
                coefficients: scale,
                original,
            };
            adjust(&context, &mut working);
            if working == original {
                continue;
            }

            // Final pass: rotation from the remembered relative rotation.
            working.rotation = original.rotation;
            let world = building_pose.compose(&working);
            if section.set_pose(scene, world) {
                written += 1;
            }
        }

        tracing::debug!(
            sections = sections.len(),
            written,
            ?edited_axis,
            coefficients = ?scale,
            "applied stretch correction"
        );
        written
    }
}
