// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `pipedag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipedag",
    version,
    about = "Run a dependency-ordered plugin pipeline over transcript files.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline manifest (TOML).
    #[arg(long, value_name = "PATH", default_value = "Pipeline.toml")]
    pub config: String,

    /// Run only these plugins and what they depend on. Repeatable.
    #[arg(long, value_name = "NAME")]
    pub target: Vec<String>,

    /// Directory the output plugins write to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPEDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the layer plan, but don't run any plugin.
    #[arg(long)]
    pub dry_run: bool,

    /// Transcript files to process.
    #[arg(value_name = "SOURCES")]
    pub sources: Vec<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
