//! Error Types
//!
//! Recoverable failures raised by the placement core. None of these are
//! fatal: callers log them and continue with a degraded but consistent
//! registry.

use thiserror::Error;

use crate::level::LevelId;

/// Errors reported by the solver, registry and reconciliation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// The addressed level does not exist in the level table.
    #[error("level {0} does not exist")]
    InvalidLevelId(LevelId),
    /// A per-level index was past the level's current section count.
    #[error("index {index} out of range for level {level} ({len} sections)")]
    IndexOutOfRange {
        level: LevelId,
        index: usize,
        len: usize,
    },
    /// The level's initializer has no content, no resolution or no cells.
    #[error("level {level} has no visual asset, resolution or cell count")]
    MissingAsset { level: LevelId },
    /// The shape strategy declined to transform this level.
    #[error("shape strategy '{strategy}' rejected level {level}")]
    ShapeStrategyRejection { level: LevelId, strategy: String },
    /// A level references a shape strategy that was never registered.
    #[error("unknown shape strategy '{0}'")]
    UnknownShape(String),
    /// The section's spawned object or instance buffer no longer exists.
    #[error("section {index} of level {level} is no longer valid")]
    InvalidSection { level: LevelId, index: usize },
}

impl BuildError {
    /// Whether the failure still leaves usable output behind
    /// (the level was placed, just not the way it was asked for).
    pub fn is_degraded_success(&self) -> bool {
        matches!(self, BuildError::ShapeStrategyRejection { .. })
    }
}
