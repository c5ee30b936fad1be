//! Bounds Module
//!
//! Building size in cells and the stretch coefficients derived from handle drags.

pub mod tracker;

pub use tracker::{
    Bounds, BoundsDelta, BoundsTracker, ChangeKind, DEFAULT_CELL_SIZE, calculate_scale_coefficient,
    calculate_scale_coefficient_with, cells_for_location,
};
