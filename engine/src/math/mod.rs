//! Math Module
//!
//! Pose type and axis helpers built on glam.

pub mod pose;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use pose::Pose;

/// One of the three world axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Read this axis' component out of a vector.
    pub fn of(self, v: Vec3) -> f32 {
        v[self.index()]
    }

    /// Return `v` with this axis' component replaced.
    pub fn with(self, mut v: Vec3, value: f32) -> Vec3 {
        v[self.index()] = value;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_component_access() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::Y.of(v), 2.0);
        assert_eq!(Axis::Z.with(v, 9.0), Vec3::new(1.0, 2.0, 9.0));
        assert_eq!(Axis::X.unit(), Vec3::X);
    }
}
