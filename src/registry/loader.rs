// src/registry/loader.rs

use std::fs;
use std::path::Path;

use crate::registry::builtin::builtin_registry;
use crate::registry::model::{RawRegistryFile, Registry};
use crate::errors::Result;

/// Read a registry TOML file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawRegistryFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawRegistryFile = toml::from_str(&contents)?;
    Ok(raw)
}

/// Read and validate a registry TOML file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Registry> {
    let raw = load_from_path(path)?;
    Registry::try_from(raw)
}

/// The registry to use for a run: the file when one is given, else the
/// built-in table.
pub fn resolve_registry(path: Option<&Path>) -> Result<Registry> {
    match path {
        Some(p) => load_and_validate(p),
        None => Ok(builtin_registry()),
    }
}
