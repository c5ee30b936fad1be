//! Reconcile Module
//!
//! Turns edits into rebuild or patch passes over the level table and registry.

pub mod engine;

pub use engine::{
    Edit, ExecutionMode, MeshRepresentation, PatchOutcome, ReconcileContext, ReconcilePlan, ReconcileReport,
    ReconciliationEngine,
};
