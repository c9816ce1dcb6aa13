// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod plugins;
pub mod registry;
pub mod summary;
pub mod task;
pub mod types;

pub use dag::{DependencyGraph, TaskDescriptor};
pub use engine::{CancelToken, TaskName};
pub use errors::{ConfigError, GraphError, PipelineError};
pub use exec::{ExecutorBackend, ExecutorOptions, PoolExecutor, SequentialExecutor};
pub use pipeline::Pipeline;
pub use registry::PluginRegistry;
pub use summary::{ExecutionSummary, RunResult};
pub use task::{DependencyOutputs, FnTask, SharedTask, Task, TaskFault, TaskOutput, TaskResult};
pub use types::ExecutionMode;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::Manifest;
use crate::config::loader::load_and_validate;
use crate::plugins::{JobInput, builtin_registry};

/// High-level entry point used by `main.rs`.
///
/// Loads the manifest, builds the pipeline from the built-in plugins and
/// runs it once over the given sources. Returns whether every plugin
/// succeeded.
pub async fn run(args: CliArgs) -> Result<bool> {
    let config_path = PathBuf::from(&args.config);
    let manifest = load_and_validate(&config_path)
        .with_context(|| format!("loading manifest '{}'", config_path.display()))?;

    let pipeline = builtin_registry().build_pipeline(&manifest)?;

    if args.dry_run {
        print_dry_run(&manifest, &pipeline)?;
        return Ok(true);
    }

    let job = JobInput::new(args.sources.clone(), args.output_dir.clone());
    info!(
        sources = job.sources.len(),
        plugins = pipeline.len(),
        mode = ?manifest.config.mode,
        "starting pipeline"
    );

    let result = if args.target.is_empty() {
        pipeline.run(job).await?
    } else {
        pipeline.run_targets(job, &args.target).await?
    };

    print_summary(&result);

    let ok = result.all_succeeded();
    if !ok {
        warn!(failed = result.failed().count(), "pipeline finished with failures");
    }
    Ok(ok)
}

/// Print plugins, dependencies and the layer plan without running anything.
fn print_dry_run(manifest: &Manifest, pipeline: &Pipeline<JobInput>) -> Result<()> {
    println!("pipedag dry-run");
    println!("  config.mode = {:?}", manifest.config.mode);
    println!("  config.max_workers = {}", manifest.config.max_workers);
    if let Some(timeout) = &manifest.config.task_timeout {
        println!("  config.task_timeout = {timeout}");
    }
    println!();

    println!("plugins ({}):", manifest.plugins.len());
    for plugin in &manifest.plugins {
        println!("  - {}", plugin.name);
        if plugin.kind() != plugin.name {
            println!("      uses: {}", plugin.kind());
        }
        if !plugin.after.is_empty() {
            println!("      after: {:?}", plugin.after);
        }
        if !plugin.options.is_empty() {
            println!("      options: {}", plugin.options);
        }
    }
    println!();

    println!("layers:");
    for (depth, layer) in pipeline.layers()?.iter().enumerate() {
        println!("  {depth}: {}", layer.join(", "));
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}

fn print_summary(result: &RunResult) {
    let width = result
        .names()
        .map(str::len)
        .max()
        .unwrap_or(0)
        .max("plugin".len());

    println!("{:<width$}  {:>5}  {:>9}  status", "plugin", "layer", "seconds");
    for summary in result {
        let status = if summary.success() {
            "ok".to_string()
        } else {
            match summary.output().as_str() {
                Some(msg) => format!("FAILED ({msg})"),
                None => match summary.output().fault() {
                    Some(fault) => format!("FAILED ({fault})"),
                    None => "FAILED".to_string(),
                },
            }
        };
        println!(
            "{:<width$}  {:>5}  {:>9.3}  {status}",
            summary.task_name(),
            summary.layer(),
            summary.elapsed_seconds(),
        );
    }
    println!(
        "{} ok, {} failed, {:.3}s total",
        result.succeeded().count(),
        result.failed().count(),
        result.total_elapsed().as_secs_f64()
    );
}
