use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

fn data_root() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".telemetry-processor")
}

/// Default location of the raw input archives.
pub fn default_input_dir() -> PathBuf {
    data_root().join("raw")
}

/// Default location of the cleaned output archives.
pub fn default_output_dir() -> PathBuf {
    data_root().join("clean")
}

/// Default log file, used when `--log-file` is not given.
pub fn default_log_file() -> PathBuf {
    data_root().join("logs").join("telemetry-processor.log")
}

/// Ensure the standard `~/.telemetry-processor/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.telemetry-processor/`
/// - `~/.telemetry-processor/raw/`
/// - `~/.telemetry-processor/clean/`
/// - `~/.telemetry-processor/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let root = data_root();
    std::fs::create_dir_all(&root)?;
    std::fs::create_dir_all(root.join("raw"))?;
    std::fs::create_dir_all(root.join("clean"))?;
    std::fs::create_dir_all(root.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// When `log_file` is given, events go to stderr and are appended to that
/// file (without ANSI colors); its parent directory is created if absent.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    // The CLI accepts Python-style level names; map them to tracing's.
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" | "CRITICAL" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_target(false).with_thread_ids(false);
    let registry = tracing_subscriber::registry().with(filter).with(stderr_layer);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let file_layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file));
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
