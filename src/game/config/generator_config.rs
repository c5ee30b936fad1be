//! Generator Configuration
//!
//! Everything the box generator needs to lay out a building. `Default`
//! matches the built-in cell sizes (400 units per cell, 20-unit thick walls,
//! 300-unit storeys). Stored as JSON; missing fields fall back to defaults.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::AssetHandle;
use crate::reconcile::{ExecutionMode, MeshRepresentation};

/// How the top of the building is closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoofStyle {
    /// Flat fill covering the wall tops
    #[default]
    Flat,
    /// Perimeter ring overhanging the walls
    Eaves,
}

/// Errors from loading or saving a [`GeneratorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub execution_mode: ExecutionMode,
    pub representation: MeshRepresentation,
    /// Wall cell: run length, thickness, storey height
    pub wall_resolution: Vec3,
    pub floor_resolution: Vec3,
    pub roof_resolution: Vec3,
    pub corner_resolution: Vec3,
    pub roof_style: RoofStyle,
    /// Cap every wall ring with four corner pieces
    pub corners: bool,
    pub wall_asset: Option<AssetHandle>,
    pub corner_asset: Option<AssetHandle>,
    pub floor_asset: Option<AssetHandle>,
    pub roof_asset: Option<AssetHandle>,
    /// Mesh handed to door/prop actors
    pub door_asset: Option<AssetHandle>,
    /// Actor class for the ground-floor props level
    pub prop_class: Option<String>,
    /// Props placed along the ground ring; 0 disables the props level
    pub props_per_level: i32,
    /// Registered shape strategy applied to floor, roof and wall levels
    pub shape: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            execution_mode: ExecutionMode::Smart,
            representation: MeshRepresentation::Discrete,
            wall_resolution: Vec3::new(400.0, 20.0, 300.0),
            floor_resolution: Vec3::new(400.0, 400.0, 20.0),
            roof_resolution: Vec3::new(400.0, 400.0, 20.0),
            corner_resolution: Vec3::new(20.0, 20.0, 300.0),
            roof_style: RoofStyle::Flat,
            corners: true,
            wall_asset: Some(AssetHandle::new("SM_Wall")),
            corner_asset: Some(AssetHandle::new("SM_Corner")),
            floor_asset: Some(AssetHandle::new("SM_Floor")),
            roof_asset: Some(AssetHandle::new("SM_Roof")),
            door_asset: Some(AssetHandle::new("SM_Door")),
            prop_class: None,
            props_per_level: 0,
            shape: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Every resolution must be positive on all three axes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let resolutions = [
            ("wall_resolution", self.wall_resolution),
            ("floor_resolution", self.floor_resolution),
            ("roof_resolution", self.roof_resolution),
            ("corner_resolution", self.corner_resolution),
        ];
        for (name, res) in resolutions {
            if res.min_element() <= 0.0 || !res.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {res}")));
            }
        }
        if self.props_per_level < 0 {
            return Err(ConfigError::Invalid("props_per_level must not be negative".into()));
        }
        Ok(())
    }
}
