//! Solver Module
//!
//! Grid index to pose, per cell and per level, with optional shape strategies.

pub mod level_solver;
pub mod pose_solver;
pub mod shape;

pub use level_solver::{LevelSolution, SolvedCell, solve_level};
pub use pose_solver::{
    Perimeter, PerimeterCell, SolveParams, get_wall_current_row, get_wall_side, local_pose, side_yaw, solve,
    solve_range,
};
pub use shape::{ShapeAdjust, ShapeLibrary, ShapeStrategy, SkipTracker, SkippedCell};
