//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    batch::BatchArgs, completions::CompletionsArgs, config::ConfigCommands, decode::DecodeArgs,
    log::LogCommands,
};

#[derive(Parser)]
#[command(name = "rqc")]
#[command(author, version, about = "Resistor batch quality control")]
#[command(long_about = "Decode resistor color codes, judge measured samples against the tolerance window, and keep an append-only log of batch results.")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Defaults to the interactive menu
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding batch logs (default: from config, else current directory)
    #[arg(long, global = true, env = "RQC_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive operation menu (default)
    Menu,

    /// Evaluate one batch from flags or prompts
    Batch(BatchArgs),

    /// Nominal value and tolerance window of a color code
    Decode(DecodeArgs),

    /// Print the band color palettes
    Palette,

    /// Batch log management
    #[command(subcommand)]
    Log(LogCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and summaries
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

impl GlobalOpts {
    /// Requested format, falling back to the configured default
    pub fn resolve_format(&self, configured: Option<&str>) -> OutputFormat {
        match self.format {
            OutputFormat::Auto => configured
                .and_then(|s| s.parse().ok())
                .unwrap_or(OutputFormat::Auto),
            f => f,
        }
    }
}
