//! Level Initializer
//!
//! The grid description a level's sections are solved from: cell size,
//! snap mode, counts and the content to place in each cell.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Cells placed by a Corner level, whatever the building size.
pub const CORNER_CELL_COUNT: usize = 4;

/// Opaque reference to a visual asset (mesh path, package name, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetHandle(pub String);

impl AssetHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Placement algorithm variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapMode {
    /// Row-major grid (floors, flat fills)
    #[default]
    Default,
    /// Rectangular perimeter walk with a quarter turn at each corner
    Wall,
    /// Perimeter walk pushed outward so eaves overhang the walls below
    Roof,
    /// Row-major fill covering the walls below
    Rooftop,
    /// Four corner caps of a perimeter
    Corner,
}

impl SnapMode {
    /// Modes that sit on top of, or against, the previous level.
    pub fn uses_previous_resolution(self) -> bool {
        matches!(self, SnapMode::Roof | SnapMode::Rooftop | SnapMode::Corner)
    }

    pub fn is_perimeter(self) -> bool {
        matches!(self, SnapMode::Wall | SnapMode::Roof)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Initializer {
    /// Cell size (x = run length, y = depth, z = height)
    pub resolution: Option<Vec3>,
    pub snap_mode: SnapMode,
    /// Cells described by this level. For Corner levels this is the
    /// perimeter being capped, not the number of corner pieces.
    pub total_count: i32,
    /// Cells per row; for perimeter modes the length of the front edge
    pub max_in_row: i32,
    /// Visual asset placed in every cell
    pub asset: Option<AssetHandle>,
    /// When set, cells spawn actors of this class (proxy sections)
    pub actor_class: Option<String>,
    /// Cells dropped by the shape strategy during the last solve
    pub skip_count: usize,
    /// Valid but intentionally empty
    pub skip_and_hide: bool,
}

impl Initializer {
    pub fn new(
        resolution: Vec3,
        snap_mode: SnapMode,
        total_count: i32,
        max_in_row: i32,
        asset: Option<AssetHandle>,
    ) -> Self {
        Self {
            resolution: Some(resolution),
            snap_mode,
            total_count,
            max_in_row,
            asset,
            ..Default::default()
        }
    }

    pub fn with_actor_class(mut self, class: impl Into<String>) -> Self {
        self.actor_class = Some(class.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.skip_and_hide = true;
        self
    }

    /// Number of grid cells the solver walks for this level.
    pub fn section_count(&self) -> usize {
        if self.snap_mode == SnapMode::Corner {
            return if self.total_count > 0 { CORNER_CELL_COUNT } else { 0 };
        }
        self.total_count.max(0) as usize
    }

    pub fn has_content(&self) -> bool {
        self.asset.is_some() || self.actor_class.is_some()
    }

    pub fn is_proxy(&self) -> bool {
        self.actor_class.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.skip_and_hide
            || (self.has_content() && self.resolution.is_some() && self.total_count > 0)
    }

    /// Resolution or a zero vector for invalid initializers.
    pub fn resolution_or_zero(&self) -> Vec3 {
        self.resolution.unwrap_or(Vec3::ZERO)
    }

    /// Whether two initializers would place the same cells, ignoring
    /// bookkeeping written back by the solver.
    pub fn same_layout(&self, other: &Initializer) -> bool {
        self.resolution == other.resolution
            && self.snap_mode == other.snap_mode
            && self.total_count == other.total_count
            && self.max_in_row == other.max_in_row
            && self.asset == other.asset
            && self.actor_class == other.actor_class
            && self.skip_and_hide == other.skip_and_hide
    }
}
