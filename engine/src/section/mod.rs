//! Section Module
//!
//! Placed cells in their three representations and the registry that owns them.

pub mod registry;
#[allow(clippy::module_inception)]
pub mod section;

pub use registry::SectionRegistry;
pub use section::{DiscreteSection, InstancedSection, PlacedSection, ProxySection, Section, SectionKind};
