//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bird feeder monitoring: species detection, visit logging, ambient lighting.
#[derive(Debug, Parser)]
#[command(name = "feedercam")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Common options for the monitor loop.
    #[command(flatten)]
    pub monitor: MonitorArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print per-species visit counts from the persisted visit log.
    Tally {
        /// Storage directory containing the visit log (default: from config).
        #[arg(short, long)]
        storage: Option<PathBuf>,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the default monitor loop.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct MonitorArgs {
    /// Path to ONNX model file (overrides config).
    #[arg(short, long, env = "FEEDERCAM_MODEL")]
    pub model: Option<PathBuf>,

    /// Path to labels file (overrides config).
    #[arg(short, long, env = "FEEDERCAM_LABELS")]
    pub labels: Option<PathBuf>,

    /// Frame source directory to read camera frames from.
    #[arg(short = 'i', long, env = "FEEDERCAM_SOURCE")]
    pub source: Option<PathBuf>,

    /// Number of ranked predictions kept per frame.
    #[arg(short = 'k', long, env = "FEEDERCAM_TOP_K")]
    pub top_k: Option<usize>,

    /// Confidence threshold (0.0-1.0).
    #[arg(short = 'c', long, value_parser = parse_confidence, env = "FEEDERCAM_THRESHOLD")]
    pub threshold: Option<f32>,

    /// Storage directory for the visit log and frame artifacts.
    #[arg(short = 'o', long, env = "FEEDERCAM_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Minimum interval between bird visits, in seconds.
    #[arg(long, value_parser = parse_interval, env = "FEEDERCAM_VISIT_INTERVAL")]
    pub visit_interval: Option<u64>,

    /// Consensus sampling interval, in seconds.
    #[arg(long, value_parser = parse_interval, env = "FEEDERCAM_CONSENSUS_INTERVAL")]
    pub consensus_interval: Option<u64>,

    /// Keep polling the source directory for new frames.
    #[arg(short = 'f', long)]
    pub follow: bool,

    /// Training mode: collect frames whose labels differ from the previous
    /// frame instead of logging visits.
    #[arg(long)]
    pub training: bool,

    /// Print per-frame inference timing and results to stdout.
    #[arg(long)]
    pub print_debug: bool,

    /// Disable lighting reactions even if a bridge is configured.
    #[arg(long)]
    pub no_lighting: bool,

    /// Suppress informational output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse and validate confidence value.
fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(0.0..=1.0).contains(&value) {
        return Err(format!(
            "confidence must be between 0.0 and 1.0, got {value}"
        ));
    }

    Ok(value)
}

/// Parse and validate a timer interval in seconds.
fn parse_interval(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number of seconds"))?;

    if value == 0 {
        return Err("interval must be at least 1 second".to_string());
    }

    Ok(value)
}
