// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{Manifest, RawManifest};
use crate::dag::DependencyGraph;
use crate::errors::ConfigError;
use crate::types::parse_duration;

impl TryFrom<RawManifest> for Manifest {
    type Error = ConfigError;

    fn try_from(raw: RawManifest) -> Result<Self, Self::Error> {
        let task_timeout = validate_raw_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw.config, raw.plugin, task_timeout))
    }
}

/// Returns the parsed task timeout on success.
fn validate_raw_manifest(raw: &RawManifest) -> Result<Option<Duration>, ConfigError> {
    ensure_has_plugins(raw)?;
    let timeout = validate_global_config(raw)?;
    validate_graph(raw)?;
    Ok(timeout)
}

fn ensure_has_plugins(raw: &RawManifest) -> Result<(), ConfigError> {
    if raw.plugin.is_empty() {
        return Err(ConfigError::Invalid(
            "manifest must contain at least one [[plugin]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(raw: &RawManifest) -> Result<Option<Duration>, ConfigError> {
    if raw.config.max_workers == 0 {
        return Err(ConfigError::Invalid(
            "[config].max_workers must be >= 1 (got 0)".to_string(),
        ));
    }

    match raw.config.task_timeout.as_deref() {
        None => Ok(None),
        Some(s) => parse_duration(s)
            .map(Some)
            .map_err(|e| ConfigError::Invalid(format!("[config].task_timeout: {e}"))),
    }
}

/// Duplicate names, unknown `after` references and cycles are reported with
/// the same [`GraphError`](crate::errors::GraphError) a pipeline run would
/// produce.
fn validate_graph(raw: &RawManifest) -> Result<(), ConfigError> {
    for plugin in &raw.plugin {
        if plugin.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "every [[plugin]] needs a non-empty name".to_string(),
            ));
        }
    }

    let graph = DependencyGraph::from_descriptors(raw.plugin.iter().map(|p| p.descriptor()));
    graph.validate()?;
    Ok(())
}
