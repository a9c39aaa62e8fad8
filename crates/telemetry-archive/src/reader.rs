//! Entry-by-entry archive reading with per-entry failure isolation.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use telemetry_core::events::IdeEvent;
use telemetry_core::{Result, TelemetryError};

// ── ReadingArchive ────────────────────────────────────────────────────────────

/// Lazily decodes the entries of one archive in storage order.
///
/// Opening fails when the file is missing or unreadable; after that, each
/// entry yields its own `Result` so callers can skip corrupt entries
/// without aborting the rest. Blank lines are not entries and are skipped
/// silently. The file handle is released when the reader is dropped.
#[derive(Debug)]
pub struct ReadingArchive {
    path: PathBuf,
    lines: std::iter::Enumerate<Lines<BufReader<File>>>,
}

impl ReadingArchive {
    /// Open an archive for reading. A missing or unopenable file is fatal.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path).map_err(|source| TelemetryError::ArchiveOpen {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines().enumerate(),
        })
    }

    /// Location of the archive on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for ReadingArchive {
    /// 1-based entry number plus the decoded event or its decode error.
    type Item = (usize, Result<IdeEvent>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, line) = self.lines.next()?;
            let line_no = idx + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some((line_no, Err(TelemetryError::Io(e)))),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Some((
                line_no,
                serde_json::from_str(trimmed).map_err(TelemetryError::from),
            ));
        }
    }
}

// ── Failsafe reading ──────────────────────────────────────────────────────────

/// Lazy event stream that reports decode failures through a callback
/// instead of interrupting iteration.
pub struct FailsafeEventReader<F> {
    archive: ReadingArchive,
    on_error: F,
}

impl<F> Iterator for FailsafeEventReader<F>
where
    F: FnMut(usize, &TelemetryError),
{
    type Item = IdeEvent;

    fn next(&mut self) -> Option<IdeEvent> {
        loop {
            match self.archive.next()? {
                (_, Ok(event)) => return Some(event),
                (line_no, Err(err)) => (self.on_error)(line_no, &err),
            }
        }
    }
}

/// Open `path` and return a lazy stream of its decodable events.
///
/// Every entry that fails to decode invokes `on_error` exactly once with
/// the entry's line number and the decode error, then is skipped. Entries
/// visited equals events yielded plus failures reported, and yielded order
/// equals storage order.
pub fn read_events_failsafe<F>(path: &Path, on_error: F) -> Result<FailsafeEventReader<F>>
where
    F: FnMut(usize, &TelemetryError),
{
    let archive = ReadingArchive::open(path)?;
    Ok(FailsafeEventReader { archive, on_error })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use telemetry_core::events::{EventEnvelope, EventPayload};
    use tempfile::TempDir;

    fn command(id: &str) -> IdeEvent {
        IdeEvent {
            envelope: EventEnvelope::default(),
            payload: EventPayload::Command {
                command_id: id.to_string(),
            },
        }
    }

    fn write_lines(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn json(event: &IdeEvent) -> String {
        serde_json::to_string(event).unwrap()
    }

    // ── ReadingArchive ─────────────────────────────────────────────────────

    #[test]
    fn test_open_missing_archive_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = ReadingArchive::open(dir.path().join("absent.jsonl")).unwrap_err();
        assert!(matches!(err, TelemetryError::ArchiveOpen { .. }));
    }

    #[test]
    fn test_entries_carry_one_based_line_numbers() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(
            dir.path(),
            "a.jsonl",
            &[&json(&command("cmd1")), "xxx", &json(&command("cmd2"))],
        );

        let entries: Vec<(usize, bool)> = ReadingArchive::open(&path)
            .unwrap()
            .map(|(n, r)| (n, r.is_ok()))
            .collect();
        assert_eq!(entries, vec![(1, true), (2, false), (3, true)]);
    }

    #[test]
    fn test_blank_lines_are_not_entries() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(
            dir.path(),
            "a.jsonl",
            &[&json(&command("cmd1")), "", "   ", &json(&command("cmd2"))],
        );

        let count = ReadingArchive::open(&path).unwrap().count();
        assert_eq!(count, 2);
    }

    // ── read_events_failsafe ───────────────────────────────────────────────

    #[test]
    fn test_failsafe_reads_all_events_in_storage_order() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(
            dir.path(),
            "a.jsonl",
            &[&json(&command("cmd1")), "xxx", &json(&command("cmd2"))],
        );

        let events: Vec<IdeEvent> = read_events_failsafe(&path, |_, _| {}).unwrap().collect();
        assert_eq!(events, vec![command("cmd1"), command("cmd2")]);
    }

    #[test]
    fn test_failsafe_reports_each_failure_once() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(
            dir.path(),
            "a.jsonl",
            &[
                &json(&command("cmd1")),
                "xxx",
                &json(&command("cmd2")),
                "yyy",
            ],
        );

        let mut failures = Vec::new();
        let events: Vec<IdeEvent> =
            read_events_failsafe(&path, |line_no, err| {
                failures.push((line_no, err.to_string()));
            })
            .unwrap()
            .collect();

        assert_eq!(events.len(), 2);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, 2);
        assert_eq!(failures[1].0, 4);
        assert!(failures[0].1.contains("Failed to decode entry"));
    }

    #[test]
    fn test_failsafe_no_failure_no_report() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(
            dir.path(),
            "a.jsonl",
            &[&json(&command("cmd1")), &json(&command("cmd2"))],
        );

        let mut reported = false;
        let events: Vec<IdeEvent> = read_events_failsafe(&path, |_, _| reported = true)
            .unwrap()
            .collect();
        assert_eq!(events.len(), 2);
        assert!(!reported);
    }

    #[test]
    fn test_visited_equals_yielded_plus_failed() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(
            dir.path(),
            "a.jsonl",
            &["bad1", &json(&command("cmd1")), "bad2", "bad3"],
        );

        let mut failed = 0usize;
        let yielded = read_events_failsafe(&path, |_, _| failed += 1)
            .unwrap()
            .count();
        let visited = ReadingArchive::open(&path).unwrap().count();
        assert_eq!(visited, yielded + failed);
    }
}
