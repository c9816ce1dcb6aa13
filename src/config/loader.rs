// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{Manifest, RawManifest};
use crate::errors::ConfigError;

/// Load a manifest from a given path and return the raw `RawManifest`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (graph correctness, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest, ConfigError> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Deserialize a manifest from TOML text.
pub fn parse_str(contents: &str) -> Result<RawManifest, ConfigError> {
    let manifest: RawManifest = toml::from_str(contents)?;
    Ok(manifest)
}

/// Load a manifest from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - at least one plugin,
///   - `max_workers >= 1` and a parseable `task_timeout`,
///   - duplicate names, unknown `after` references and cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest, ConfigError> {
    let raw = load_from_path(&path)?;
    Manifest::try_from(raw)
}
