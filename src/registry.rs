// src/registry.rs

//! Resolution of manifest entries to task implementations.
//!
//! Plugins are statically linked: each implementation registers a factory
//! under a key, and a manifest's `uses = "<key>"` picks it. The registry is
//! an ordinary value owned by the caller, not a process-wide table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::{Manifest, PluginConfig};
use crate::errors::ConfigError;
use crate::pipeline::Pipeline;
use crate::task::{SharedTask, Task};

type Factory<S> = Box<dyn Fn(&toml::Table) -> anyhow::Result<SharedTask<S>> + Send + Sync>;

/// Maps plugin kinds to factories that build a task from its options.
pub struct PluginRegistry<S> {
    factories: BTreeMap<String, Factory<S>>,
}

impl<S> fmt::Debug for PluginRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<S> Default for PluginRegistry<S>
where
    S: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> PluginRegistry<S>
where
    S: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a factory. A later registration for the same kind replaces
    /// the earlier one.
    pub fn register<F, T>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&toml::Table) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Task<S> + 'static,
    {
        let kind = kind.into();
        debug!(kind = %kind, "registering plugin factory");
        self.factories.insert(
            kind,
            Box::new(move |options: &toml::Table| {
                let task: SharedTask<S> = Arc::new(factory(options)?);
                Ok(task)
            }),
        );
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|k| k.as_str())
    }

    /// Build the task for a single manifest entry.
    pub fn build(&self, plugin: &PluginConfig) -> Result<SharedTask<S>, ConfigError> {
        let factory = self
            .factories
            .get(plugin.kind())
            .ok_or_else(|| ConfigError::UnknownPluginKind {
                plugin: plugin.name.clone(),
                uses: plugin.kind().to_string(),
            })?;

        factory(&plugin.options).map_err(|source| ConfigError::PluginFactory {
            plugin: plugin.name.clone(),
            source,
        })
    }

    /// Build a ready-to-run pipeline from a validated manifest.
    pub fn build_pipeline(&self, manifest: &Manifest) -> Result<Pipeline<S>, ConfigError> {
        let mut pipeline = Pipeline::with_options(&manifest.executor_options());

        for plugin in &manifest.plugins {
            let task = self.build(plugin)?;
            pipeline.register_shared(plugin.descriptor(), task)?;
        }

        Ok(pipeline)
    }
}
