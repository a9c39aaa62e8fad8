use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the telemetry processor.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// An event archive could not be opened at all (missing or unreadable
    /// container). Fatal for the clean operation on that archive.
    #[error("Failed to open archive {path}: {source}")]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single archive entry failed to decode. Recoverable: the entry is
    /// skipped and processing continues.
    #[error("Failed to decode entry: {0}")]
    EntryDecode(#[from] serde_json::Error),

    /// A filter or fixer was registered under a name that is already taken.
    #[error("Duplicate pipeline stage name: {0}")]
    DuplicateStageName(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the telemetry crates.
pub type Result<T> = std::result::Result<T, TelemetryError>;
