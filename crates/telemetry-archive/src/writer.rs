//! Serializing an ordered event stream back into an archive.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use telemetry_core::events::IdeEvent;
use telemetry_core::Result;

/// Writes events entry-by-entry as JSON lines, in the order given.
pub struct WritingArchive {
    out: BufWriter<File>,
}

impl WritingArchive {
    /// Create (or truncate) the archive at `path`. The parent directory
    /// must already exist; see [`crate::ArchiveIo::ensure_parent_exists`].
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let file = File::create(path.into())?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    /// Append one event as the next entry.
    pub fn add(&mut self, event: &IdeEvent) -> Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Append all events, preserving their order.
    pub fn add_all<'a>(&mut self, events: impl IntoIterator<Item = &'a IdeEvent>) -> Result<()> {
        for event in events {
            self.add(event)?;
        }
        Ok(())
    }

    /// Flush buffered entries and close the archive.
    pub fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
