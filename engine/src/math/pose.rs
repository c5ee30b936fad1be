//! Pose - translation, rotation and non-uniform scale
//!
//! Z-up convention shared by the whole crate:
//! - forward = local +X (the direction a section runs)
//! - right   = local +Y (into the building for perimeter pieces)
//! - up      = local +Z

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Scale components smaller than this are treated as zero when inverting.
const MIN_SCALE: f32 = 1.0e-6;

/// A placed transform. Composition follows parent-then-child order:
/// `parent.compose(&child)` maps child-local space into parent space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Translation plus a yaw (rotation about +Z) in degrees.
    pub fn from_translation_yaw(translation: Vec3, yaw_degrees: f32) -> Self {
        Self {
            translation,
            rotation: Quat::from_rotation_z(yaw_degrees.to_radians()),
            scale: Vec3::ONE,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Yaw about +Z in degrees, normalized to [0, 360).
    pub fn yaw_degrees(&self) -> f32 {
        let fwd = self.forward();
        let degrees = fwd.y.atan2(fwd.x).to_degrees().rem_euclid(360.0);
        if 360.0 - degrees < 1.0e-3 { 0.0 } else { degrees }
    }

    /// Map a point from this pose's local space into its parent space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }

    /// Map a direction (ignores translation, keeps scale).
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }

    /// `self ∘ child`: place `child` (expressed in this pose's local space)
    /// into this pose's parent space.
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            translation: self.transform_point(child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }

    /// Express `world` relative to this pose (inverse of [`Pose::compose`]).
    pub fn relative(&self, world: &Pose) -> Pose {
        let inv_rot = self.rotation.inverse();
        let inv_scale = safe_recip(self.scale);
        Pose {
            translation: inv_scale * (inv_rot * (world.translation - self.translation)),
            rotation: (inv_rot * world.rotation).normalize(),
            scale: world.scale * inv_scale,
        }
    }

    /// Shift by a world-space delta.
    pub fn offset(mut self, delta: Vec3) -> Pose {
        self.translation += delta;
        self
    }

    pub fn approx_eq(&self, other: &Pose, tolerance: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, tolerance)
            && self.scale.abs_diff_eq(other.scale, tolerance)
            && self.rotation.dot(other.rotation).abs() >= 1.0 - tolerance
    }
}

fn safe_recip(v: Vec3) -> Vec3 {
    let recip = |c: f32| if c.abs() < MIN_SCALE { 0.0 } else { 1.0 / c };
    Vec3::new(recip(v.x), recip(v.y), recip(v.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_follow_yaw() {
        let pose = Pose::from_translation_yaw(Vec3::ZERO, 90.0);
        assert!(pose.forward().abs_diff_eq(Vec3::Y, 1e-5));
        assert!(pose.right().abs_diff_eq(-Vec3::X, 1e-5));
        assert!(pose.up().abs_diff_eq(Vec3::Z, 1e-5));
        assert!((pose.yaw_degrees() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_compose_then_relative_roundtrip() {
        let parent = Pose::from_translation_yaw(Vec3::new(100.0, -50.0, 10.0), 30.0)
            .with_scale(Vec3::new(2.0, 1.0, 0.5));
        let child = Pose::from_translation_yaw(Vec3::new(40.0, 0.0, 300.0), 180.0);
        let world = parent.compose(&child);
        let back = parent.relative(&world);
        assert!(back.approx_eq(&child, 1e-3), "{back:?} != {child:?}");
    }

    #[test]
    fn test_identity_compose() {
        let pose = Pose::from_translation_yaw(Vec3::new(1.0, 2.0, 3.0), 270.0);
        assert!(Pose::IDENTITY.compose(&pose).approx_eq(&pose, 1e-6));
    }

    #[test]
    fn test_relative_zero_scale_does_not_explode() {
        let parent = Pose::IDENTITY.with_scale(Vec3::new(0.0, 1.0, 1.0));
        let rel = parent.relative(&Pose::from_translation(Vec3::new(5.0, 5.0, 5.0)));
        assert!(rel.translation.is_finite());
        assert_eq!(rel.translation.x, 0.0);
    }
}
