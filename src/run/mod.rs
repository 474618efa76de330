// src/run/mod.rs

//! Run orchestration.
//!
//! [`coordinator`] owns the per-model lifecycle and report aggregation;
//! [`phase`] names the lifecycle states.

pub mod coordinator;
pub mod phase;

pub use coordinator::{Coordinator, RunOptions, RunPlan};
pub use phase::ModelPhase;
