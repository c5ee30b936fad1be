//! Building Generator Engine
//!
//! Places a building out of grid-aligned sections (wall panels, corners,
//! floor and roof tiles, door actors) and keeps them in sync as the building
//! is resized, reshaped or re-skinned.
//!
//! # Modules
//!
//! - [`level`] - Level descriptions and the ordered level table
//! - [`solver`] - Cell index to pose, with pluggable shape strategies
//! - [`scene`] - Minimal scene: spawned objects and instance buffers
//! - [`section`] - Placed sections and the registry that tracks them
//! - [`bounds`] - Cell-count bounds, change detection, scale coefficients
//! - [`stretch`] - Stretching placed sections between cell boundaries
//! - [`reconcile`] - Full rebuild or incremental patch after an edit
//! - [`game`] - Box layouts, shapes, config, presets and the building container
//!
//! # Example
//!
//! ```ignore
//! use building_gen_engine::game::{BuildingContainer, GeneratorConfig};
//! use building_gen_engine::bounds::Bounds;
//! use building_gen_engine::math::Axis;
//!
//! let mut building = BuildingContainer::new(GeneratorConfig::default(), Bounds::new(3, 2, 2));
//!
//! // One storey taller: only the new top levels are solved
//! building.set_bounds(Bounds::new(3, 2, 3));
//!
//! // Drag the X handle half a cell past the edge: sections stretch
//! let report = building.drag_handle(Axis::X, 1400.0);
//! assert!(report.resize.is_none());
//! ```

pub mod bounds;
pub mod error;
pub mod level;
pub mod math;
pub mod reconcile;
pub mod scene;
pub mod section;
pub mod solver;
pub mod stretch;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

pub use bounds::{Bounds, BoundsTracker};
pub use error::BuildError;
pub use level::{AssetHandle, Initializer, Level, LevelBlueprint, LevelId, LevelTable, SnapMode};
pub use math::{Axis, Pose};
pub use reconcile::{Edit, ExecutionMode, MeshRepresentation, ReconcileReport, ReconciliationEngine};
pub use section::{PlacedSection, Section, SectionKind, SectionRegistry};
