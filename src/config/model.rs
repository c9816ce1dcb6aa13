// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::dag::TaskDescriptor;
use crate::exec::ExecutorOptions;
use crate::types::ExecutionMode;

/// Pipeline manifest exactly as read from a TOML file.
///
/// ```toml
/// [config]
/// mode = "parallel"
/// max_workers = 4
/// task_timeout = "30s"
///
/// [[plugin]]
/// name = "transcript"
///
/// [[plugin]]
/// name = "gaps"
/// uses = "turn_gaps"
/// after = ["transcript"]
/// options = { min_gap = 0.5 }
/// ```
///
/// Plugins are an array of tables so that file order is registration order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    /// Executor settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All plugins from `[[plugin]]`, in file order.
    #[serde(default)]
    pub plugin: Vec<PluginConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// `"parallel"` (default) or `"sequential"`.
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Maximum number of tasks running at once in parallel mode.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Optional per-task timeout, e.g. `"30s"` or `"500ms"`.
    #[serde(default)]
    pub task_timeout: Option<String>,
}

fn default_max_workers() -> usize {
    4
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            max_workers: default_max_workers(),
            task_timeout: None,
        }
    }
}

/// One `[[plugin]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    /// Unique name of this stage in the graph.
    pub name: String,

    /// Registry key of the implementation. Defaults to `name`.
    #[serde(default)]
    pub uses: Option<String>,

    /// Names of the plugins this one waits for.
    #[serde(default)]
    pub after: Vec<String>,

    /// Free-form settings handed to the plugin factory.
    #[serde(default)]
    pub options: toml::Table,
}

impl PluginConfig {
    pub fn kind(&self) -> &str {
        self.uses.as_deref().unwrap_or(&self.name)
    }

    pub fn descriptor(&self) -> TaskDescriptor {
        TaskDescriptor::with_dependencies(self.name.clone(), self.after.iter().cloned())
    }
}

/// A manifest that passed validation.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub config: ConfigSection,
    pub plugins: Vec<PluginConfig>,
    task_timeout: Option<Duration>,
}

impl Manifest {
    /// Only for use by validation.
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        plugins: Vec<PluginConfig>,
        task_timeout: Option<Duration>,
    ) -> Self {
        Self {
            config,
            plugins,
            task_timeout,
        }
    }

    pub fn executor_options(&self) -> ExecutorOptions {
        ExecutorOptions {
            mode: self.config.mode,
            max_workers: self.config.max_workers,
            task_timeout: self.task_timeout,
        }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = TaskDescriptor> + '_ {
        self.plugins.iter().map(PluginConfig::descriptor)
    }
}
