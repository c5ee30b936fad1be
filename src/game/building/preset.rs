//! Building Presets
//!
//! A preset is a deep copy of a building's levels plus the configuration and
//! bounds that produced them. Stores are pluggable; the JSON store keeps one
//! pretty-printed file per preset in a directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounds::Bounds;
use crate::game::config::GeneratorConfig;
use crate::level::Level;

const PRESET_EXTENSION: &str = "json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub config: GeneratorConfig,
    pub bounds: Bounds,
    pub levels: Vec<Level>,
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("preset '{0}' not found")]
    NotFound(String),
    #[error("invalid preset name '{0}'")]
    InvalidName(String),
}

/// Where presets are kept.
pub trait PresetStore {
    fn save(&mut self, name: &str, preset: &Preset) -> Result<(), PresetError>;
    fn load(&self, name: &str) -> Result<Preset, PresetError>;
    /// Stored preset names, sorted.
    fn list(&self) -> Result<Vec<String>, PresetError>;
}

/// Directory of `<name>.json` files.
#[derive(Clone, Debug)]
pub struct JsonPresetStore {
    root: PathBuf,
}

impl JsonPresetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, PresetError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PresetError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{name}.{PRESET_EXTENSION}")))
    }
}

impl PresetStore for JsonPresetStore {
    fn save(&mut self, name: &str, preset: &Preset) -> Result<(), PresetError> {
        let path = self.path_for(name)?;
        let json = serde_json::to_string_pretty(preset)?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(&path, json)?;
        tracing::info!(name, path = %path.display(), levels = preset.levels.len(), "saved preset");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Preset, PresetError> {
        let path = self.path_for(name)?;
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PresetError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&data)?)
    }

    fn list(&self) -> Result<Vec<String>, PresetError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PRESET_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
