mod bootstrap;
mod runner;
mod settings;

use anyhow::Result;
use clap::Parser;
use telemetry_archive::ArchiveIo;

use crate::runner::{CleanRunner, StatsRunner};
use crate::settings::{Command, Settings};

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::ensure_directories()?;
    let log_file = settings
        .log_file
        .clone()
        .unwrap_or_else(bootstrap::default_log_file);
    bootstrap::setup_logging(&settings.log_level, Some(&log_file))?;

    tracing::info!("telemetry-processor v{} starting", env!("CARGO_PKG_VERSION"));

    match settings.command {
        Command::Clean {
            input,
            output,
            workers,
            keep_unnamed_commands,
            no_split_version_control,
        } => {
            let input = input.unwrap_or_else(bootstrap::default_input_dir);
            let output = output.unwrap_or_else(bootstrap::default_output_dir);
            tracing::info!(
                "cleaning {} into {}",
                input.display(),
                output.display()
            );

            CleanRunner::new(ArchiveIo::new(input, output), workers as usize)
                .keep_unnamed_commands(keep_unnamed_commands)
                .split_version_control(!no_split_version_control)
                .run()
        }

        Command::Stats { input, workers } => {
            let input = input.unwrap_or_else(bootstrap::default_output_dir);
            tracing::info!("extracting statistics from {}", input.display());

            StatsRunner::new(input, workers as usize).run()
        }
    }
}
