// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `agentdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "agentdag",
    version,
    about = "Validate and plan declarative multi-agent workflow pipelines.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workflow document (YAML).
    ///
    /// Default: `workflow.yaml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "workflow.yaml")]
    pub workflow: String,

    /// Validate only; skip the execution plan output.
    #[arg(long)]
    pub validate_only: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AGENTDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
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

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
