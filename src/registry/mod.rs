// src/registry/mod.rs

//! Model registry for omrbench.
//!
//! Responsibilities:
//! - Define the per-model metadata record (`model.rs`).
//! - Ship the stock model table (`builtin.rs`).
//! - Load a replacement table from TOML (`loader.rs`).
//! - Validate ids and templates (`validate.rs`).

pub mod builtin;
pub mod loader;
pub mod model;
pub mod validate;

pub use builtin::builtin_registry;
pub use loader::{load_and_validate, load_from_path, resolve_registry};
pub use model::{ModelId, ModelSpec, RawRegistryFile, Registry};
pub use validate::validate_registry;
