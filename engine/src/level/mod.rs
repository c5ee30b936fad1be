//! Level Module
//!
//! Entity model for building layers: levels, their grid initializers and the
//! table that owns them.

pub mod initializer;
#[allow(clippy::module_inception)]
pub mod level;
pub mod table;

pub use initializer::{AssetHandle, CORNER_CELL_COUNT, Initializer, SnapMode};
pub use level::{Level, LevelBlueprint, LevelId, PivotLocation};
pub use table::LevelTable;
