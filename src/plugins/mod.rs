// src/plugins/mod.rs

//! Built-in plugins for annotating conversation transcripts.
//!
//! The stages share a [`JobInput`] and pass typed payloads to each other:
//!
//! - `transcript`: reads the source files, produces `Vec<Transcript>`
//! - `turn_gaps`: produces [`gaps::GapAnnotations`]
//! - `overlaps`: produces [`overlaps::OverlapAnnotations`]
//! - `write_text`: renders transcripts plus whatever annotations it finds

pub mod gaps;
pub mod overlaps;
pub mod transcript;
pub mod writer;

use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::registry::PluginRegistry;

/// Run-scoped input shared by every built-in plugin.
#[derive(Debug, Clone, Default)]
pub struct JobInput {
    pub sources: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl JobInput {
    pub fn new(sources: Vec<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            output_dir: output_dir.into(),
        }
    }
}

/// Read an optional numeric option. Integers are accepted as floats.
pub(crate) fn option_f64(options: &toml::Table, key: &str) -> Result<Option<f64>> {
    match options.get(key) {
        None => Ok(None),
        Some(toml::Value::Float(f)) => Ok(Some(*f)),
        Some(toml::Value::Integer(i)) => Ok(Some(*i as f64)),
        Some(other) => bail!("option '{key}' must be a number, got {}", other.type_str()),
    }
}

/// Registry with every built-in plugin kind.
pub fn builtin_registry() -> PluginRegistry<JobInput> {
    let mut registry = PluginRegistry::new();
    registry
        .register("transcript", |_: &toml::Table| Ok(transcript::LoadTranscripts))
        .register("turn_gaps", gaps::TurnGaps::from_options)
        .register("overlaps", |_: &toml::Table| Ok(overlaps::Overlaps))
        .register("write_text", |_: &toml::Table| Ok(writer::WriteText));
    registry
}
