//! Game Module
//!
//! Building generation built on top of the engine's solver, registry and
//! reconciliation layers.

pub mod building;
pub mod config;

pub use building::{BuildingContainer, DragReport, JsonPresetStore, Preset, PresetStore};
pub use config::{ConfigError, GeneratorConfig, RoofStyle};
