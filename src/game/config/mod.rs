//! Config Module
//!
//! Generator configuration, loaded from and saved to JSON.

pub mod generator_config;

pub use generator_config::{ConfigError, GeneratorConfig, RoofStyle};
