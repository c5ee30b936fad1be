//! Bounds Tracker - building size, change classification, stretch coefficients
//!
//! Bounds are counted in cells. Dragging a handle between two cell
//! boundaries does not change the cell count; it produces a fractional
//! stretch coefficient on that axis instead:
//!
//! `coefficient = 1 + frac(location / cell_size) / bounds_axis`

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::Axis;

/// Cell size used when the caller does not supply one.
pub const DEFAULT_CELL_SIZE: f32 = 400.0;

/// Building size in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Cells along X (front edge)
    pub width: i32,
    /// Cells along Y
    pub depth: i32,
    /// Wall levels stacked along Z
    pub height: i32,
}

impl Bounds {
    pub fn new(width: i32, depth: i32, height: i32) -> Self {
        Self { width, depth, height }
    }

    pub fn axis(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.depth,
            Axis::Z => self.height,
        }
    }

    pub fn with_axis(mut self, axis: Axis, value: i32) -> Self {
        match axis {
            Axis::X => self.width = value,
            Axis::Y => self.depth = value,
            Axis::Z => self.height = value,
        }
        self
    }

    /// Cells on one ring of the footprint perimeter.
    pub fn perimeter(&self) -> i32 {
        2 * (self.width.max(0) + self.depth.max(0))
    }

    /// Cells covering the footprint.
    pub fn area(&self) -> i32 {
        self.width.max(0) * self.depth.max(0)
    }
}

/// How one axis changed between two bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Same,
    Grew(Axis),
    Shrank(Axis),
}

impl ChangeKind {
    fn classify(axis: Axis, previous: i32, current: i32) -> Self {
        match current.cmp(&previous) {
            std::cmp::Ordering::Equal => ChangeKind::Same,
            std::cmp::Ordering::Greater => ChangeKind::Grew(axis),
            std::cmp::Ordering::Less => ChangeKind::Shrank(axis),
        }
    }

    pub fn is_same(self) -> bool {
        self == ChangeKind::Same
    }
}

/// Result of [`BoundsTracker::update`]: each axis classified independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundsDelta {
    pub previous: Bounds,
    pub current: Bounds,
    changes: [ChangeKind; 3],
}

impl BoundsDelta {
    pub fn between(previous: Bounds, current: Bounds) -> Self {
        let changes = Axis::ALL.map(|axis| ChangeKind::classify(axis, previous.axis(axis), current.axis(axis)));
        Self {
            previous,
            current,
            changes,
        }
    }

    pub fn on(&self, axis: Axis) -> ChangeKind {
        self.changes[axis.index()]
    }

    /// First changed axis in X, Y, Z order, or `Same`.
    pub fn primary(&self) -> ChangeKind {
        self.changes
            .iter()
            .copied()
            .find(|change| !change.is_same())
            .unwrap_or(ChangeKind::Same)
    }

    pub fn is_same(&self) -> bool {
        self.changes.iter().all(|change| change.is_same())
    }

    /// Whether width or depth changed.
    pub fn footprint_changed(&self) -> bool {
        !self.on(Axis::X).is_same() || !self.on(Axis::Y).is_same()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundsTracker {
    current: Bounds,
    previous: Bounds,
    edited: Option<Axis>,
    coefficients: Vec3,
}

impl Default for BoundsTracker {
    fn default() -> Self {
        Self::new(Bounds::default())
    }
}

impl BoundsTracker {
    pub fn new(initial: Bounds) -> Self {
        Self {
            current: initial,
            previous: initial,
            edited: None,
            coefficients: Vec3::ONE,
        }
    }

    pub fn current(&self) -> Bounds {
        self.current
    }

    pub fn previous(&self) -> Bounds {
        self.previous
    }

    /// Axis of the handle dragged last, if any.
    pub fn edited(&self) -> Option<Axis> {
        self.edited
    }

    pub fn scale_coefficients(&self) -> Vec3 {
        self.coefficients
    }

    /// Record new bounds. Previous is overwritten with the old current in
    /// the same step. A cell-count change resets every stretch coefficient.
    pub fn update(&mut self, new_bounds: Bounds) -> BoundsDelta {
        let delta = BoundsDelta::between(self.current, new_bounds);
        self.previous = self.current;
        self.current = new_bounds;
        if !delta.is_same() {
            self.coefficients = Vec3::ONE;
        }
        delta
    }

    /// Handle dragged to `world_location` along `axis`. Records the edited
    /// axis, recomputes its coefficient and returns all three.
    pub fn drag_handle(&mut self, axis: Axis, world_location: f32, cell_size: f32) -> Vec3 {
        self.edited = Some(axis);
        let coefficient = calculate_scale_coefficient_with(world_location, self.current.axis(axis), cell_size);
        self.coefficients = axis.with(self.coefficients, coefficient);
        self.coefficients
    }

    pub fn reset_coefficients(&mut self) {
        self.coefficients = Vec3::ONE;
        self.edited = None;
    }
}

/// [`calculate_scale_coefficient_with`] at [`DEFAULT_CELL_SIZE`].
pub fn calculate_scale_coefficient(location: f32, bounds_axis: i32) -> f32 {
    calculate_scale_coefficient_with(location, bounds_axis, DEFAULT_CELL_SIZE)
}

/// Stretch factor for a handle at `location` on an axis `bounds_axis` cells
/// long. Always > 0; neutral (1.0) for empty axes or degenerate cells.
pub fn calculate_scale_coefficient_with(location: f32, bounds_axis: i32, cell_size: f32) -> f32 {
    if bounds_axis <= 0 || cell_size <= 0.0 || !location.is_finite() {
        return 1.0;
    }
    let remainder = (location / cell_size).rem_euclid(1.0);
    1.0 + remainder / bounds_axis as f32
}

/// Whole cells reached by a handle at `location`.
pub fn cells_for_location(location: f32, cell_size: f32) -> i32 {
    if cell_size <= 0.0 || !location.is_finite() {
        return 0;
    }
    (location / cell_size).floor().max(0.0) as i32
}
