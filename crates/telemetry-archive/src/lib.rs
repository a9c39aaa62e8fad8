//! Archive layer for the IDE telemetry processor.
//!
//! An archive is a `.jsonl` file whose non-blank lines are serialized
//! events in storage order; the entry identifier is the 1-based line
//! number. This module provides the failure-tolerant reader, the writer,
//! and the path-resolution collaborator used by the cleaning pipeline.

pub mod io;
pub mod reader;
pub mod writer;

pub use io::ArchiveIo;
pub use reader::{read_events_failsafe, FailsafeEventReader, ReadingArchive};
pub use writer::WritingArchive;
