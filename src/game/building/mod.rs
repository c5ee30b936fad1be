//! Building System - box buildings assembled from grid sections
//!
//! Features:
//! - Layouts that turn bounds + config into floor, wall, corner and roof levels
//! - Shape strategies that carve notches or recess wall runs
//! - A container that keeps the placed sections in sync with every edit
//! - JSON presets for saving and restoring whole buildings

pub mod container;
pub mod layout;
pub mod preset;
pub mod shapes;

pub use container::{BuildingContainer, DragReport};
pub use layout::{BoxLayout, FLOOR_LEVEL, LevelLayout, PROPS_LEVEL, ROOF_LEVEL, corner_level_name, wall_level_name};
pub use preset::{JsonPresetStore, Preset, PresetError, PresetStore};
pub use shapes::{InsetFrontShape, NotchShape, default_shapes};
