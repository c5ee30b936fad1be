//! Stretch Module
//!
//! Non-uniform rescaling of already-placed sections after a handle drag.

pub mod corrector;

pub use corrector::{FACING_TOLERANCE, StretchContext, StretchCorrector};
