use clap::{Parser, Subcommand};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Cleaning and statistics extraction for IDE telemetry archives
#[derive(Parser, Debug, Clone)]
#[command(
    name = "telemetry-processor",
    about = "Cleaning and statistics extraction for IDE telemetry archives",
    version
)]
pub struct Settings {
    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (default: ~/.telemetry-processor/logs/telemetry-processor.log)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Clean raw archives into filtered, deduplicated, ordered ones
    Clean {
        /// Directory holding the raw .jsonl archives (default: ~/.telemetry-processor/raw)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Directory the cleaned archives are written to (default: ~/.telemetry-processor/clean)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Number of worker threads (1-64)
        #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..=64))]
        workers: u32,

        /// Keep command events whose identifier is a generated GUID
        #[arg(long)]
        keep_unnamed_commands: bool,

        /// Keep composite version-control events instead of splitting them
        #[arg(long)]
        no_split_version_control: bool,
    },

    /// Extract interaction statistics from cleaned archives
    Stats {
        /// Directory holding the cleaned .jsonl archives (default: ~/.telemetry-processor/clean)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Number of worker threads (1-64)
        #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..=64))]
        workers: u32,
    },
}

// ── Tests ──────────────────────────────────────────────────────────────────────
