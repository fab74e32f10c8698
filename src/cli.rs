// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::StudioId;

/// Command-line arguments for `assetdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetdag",
    version,
    about = "Plan and run multi-studio asset production in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the project manifest (TOML).
    #[arg(long, value_name = "PATH", default_value = "Assetdag.toml")]
    pub manifest: String,

    /// Validate the manifest and print the wave plan and timeline without
    /// running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Override a studio's capacity, e.g. `--capacity audio=2`. Repeatable.
    #[arg(long, value_name = "STUDIO=N", value_parser = parse_capacity)]
    pub capacity: Vec<(StudioId, usize)>,

    /// Output format for plans and reports.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
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

fn parse_capacity(s: &str) -> Result<(StudioId, usize), String> {
    let (studio, n) = s
        .split_once('=')
        .ok_or_else(|| format!("expected STUDIO=N, got '{s}'"))?;
    let studio = studio.trim();
    if studio.is_empty() {
        return Err(format!("missing studio name in '{s}'"));
    }
    let n: usize = n
        .trim()
        .parse()
        .map_err(|e| format!("invalid capacity in '{s}': {e}"))?;
    if n == 0 {
        return Err(format!("capacity for '{studio}' must be >= 1"));
    }
    Ok((StudioId::new(studio), n))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
