//! Worker pools that drive cleaning and statistics extraction over every
//! archive found under an input root.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;

use telemetry_archive::{read_events_failsafe, ArchiveIo};
use telemetry_core::events::IdeEvent;
use telemetry_core::TelemetryError;
use telemetry_pipeline::{Cleaner, CleanerLog, UnnamedCommandFilter, VersionControlEventSplitter};
use telemetry_stats::{InteractionStatistics, InteractionStatsExtractor};
use tracing::{debug, info, warn};

/// Pop the next relative archive identifier, releasing the lock before the
/// archive is processed.
fn next_archive(queue: &Mutex<VecDeque<String>>) -> Option<String> {
    queue
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .pop_front()
}

fn join_all(
    handles: Vec<thread::ScopedJoinHandle<'_, Result<(), TelemetryError>>>,
) -> anyhow::Result<()> {
    let mut first_error: Option<anyhow::Error> = None;
    for handle in handles {
        let outcome = match handle.join() {
            Ok(outcome) => outcome.map_err(anyhow::Error::from),
            Err(_) => Err(anyhow::anyhow!("worker thread panicked")),
        };
        if let Err(err) = outcome {
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// ── Cleaning ───────────────────────────────────────────────────────────────────

/// Cleans every archive under the input root with a fixed-size pool of OS
/// threads. Each worker owns its own [`Cleaner`] and processes one archive
/// to completion before pulling the next.
pub struct CleanRunner {
    io: ArchiveIo,
    workers: usize,
    keep_unnamed_commands: bool,
    split_version_control: bool,
}

impl CleanRunner {
    pub fn new(io: ArchiveIo, workers: usize) -> Self {
        Self {
            io,
            workers: workers.max(1),
            keep_unnamed_commands: false,
            split_version_control: true,
        }
    }

    /// Keep command events whose identifier is a generated GUID.
    pub fn keep_unnamed_commands(mut self, keep: bool) -> Self {
        self.keep_unnamed_commands = keep;
        self
    }

    /// Split composite version-control events into one event per action.
    pub fn split_version_control(mut self, split: bool) -> Self {
        self.split_version_control = split;
        self
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let archives = self.io.find_relative_archives();
        info!(
            "cleaning {} archives with {} workers",
            archives.len(),
            self.workers
        );
        let queue: Mutex<VecDeque<String>> = Mutex::new(archives.into());

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers);
            for _ in 0..self.workers {
                let queue = &queue;
                handles.push(scope.spawn(move || self.clean_worker(queue)));
            }
            join_all(handles)
        })
    }

    /// An unrecoverable error ends this worker's loop; remaining archives
    /// are left to the other workers.
    fn clean_worker(&self, queue: &Mutex<VecDeque<String>>) -> Result<(), TelemetryError> {
        let mut cleaner = self.build_cleaner()?;
        while let Some(rel) = next_archive(queue) {
            cleaner.clean(&rel)?;
        }
        Ok(())
    }

    fn build_cleaner(&self) -> Result<Cleaner<CleanerLog>, TelemetryError> {
        let mut cleaner = Cleaner::new(self.io.clone(), CleanerLog::new());
        if !self.keep_unnamed_commands {
            cleaner.add_filter(Box::new(UnnamedCommandFilter::new()))?;
        }
        if self.split_version_control {
            cleaner.add_fixer(Box::new(VersionControlEventSplitter))?;
        }
        Ok(cleaner)
    }
}

// ── Statistics ─────────────────────────────────────────────────────────────────

/// Extracts interaction statistics from every archive under the input root,
/// using the same pool shape as [`CleanRunner`].
pub struct StatsRunner {
    io: ArchiveIo,
    workers: usize,
}

impl StatsRunner {
    pub fn new(input: impl Into<PathBuf>, workers: usize) -> Self {
        let input = input.into();
        let io = ArchiveIo::new(input.clone(), input);
        Self {
            io,
            workers: workers.max(1),
        }
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let archives = self.io.find_relative_archives();
        info!(
            "extracting statistics from {} archives with {} workers",
            archives.len(),
            self.workers
        );
        let queue: Mutex<VecDeque<String>> = Mutex::new(archives.into());

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers);
            for _ in 0..self.workers {
                let queue = &queue;
                handles.push(scope.spawn(move || self.stats_worker(queue)));
            }
            join_all(handles)
        })
    }

    fn stats_worker(&self, queue: &Mutex<VecDeque<String>>) -> Result<(), TelemetryError> {
        let extractor = InteractionStatsExtractor::new();
        while let Some(rel) = next_archive(queue) {
            let path = self.io.full_path_in(&rel);
            let mut events: Vec<IdeEvent> = read_events_failsafe(&path, |line_no, err| {
                warn!(
                    "Failed to decode entry in {} (line {}): {}",
                    path.display(),
                    line_no,
                    err
                );
            })?
            .collect();
            // Archives cleaned by this tool are already ordered; raw ones
            // may not be, and the extractor requires ordered input.
            events.sort_by_key(|e| e.envelope.triggered_at);

            report_statistics(&rel, &extractor.create_statistics(&events));
        }
        Ok(())
    }
}

fn report_statistics(rel: &str, stats: &InteractionStatistics) {
    info!(
        "{}: {} events on {} days in {} months, {}s active, {} completions, {} test runs",
        rel,
        stats.num_events_total(),
        stats.num_days,
        stats.num_months,
        stats.active_time.num_seconds(),
        stats.num_code_completion,
        stats.num_test_runs
    );
    for (kind, count) in &stats.num_events_detailed {
        debug!("{}:   {} x {}", rel, count, kind);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
    use telemetry_archive::WritingArchive;
    use telemetry_core::events::{
        EventEnvelope, EventPayload, VersionControlAction, VersionControlActionKind,
    };
    use tempfile::TempDir;

    fn ts(secs: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2017, 3, 1, 10, 0, 0)
            .unwrap()
            + TimeDelta::seconds(secs)
    }

    fn command(id: &str, at: i64) -> IdeEvent {
        IdeEvent {
            envelope: EventEnvelope {
                triggered_at: Some(ts(at)),
                ..Default::default()
            },
            payload: EventPayload::Command {
                command_id: id.to_string(),
            },
        }
    }

    fn add_archive(io: &ArchiveIo, rel: &str, events: &[IdeEvent]) {
        let path = io.full_path_in(rel);
        ArchiveIo::ensure_parent_exists(&path).unwrap();
        let mut archive = WritingArchive::create(&path).unwrap();
        archive.add_all(events).unwrap();
        archive.finish().unwrap();
    }

    fn read_output(io: &ArchiveIo, rel: &str) -> Vec<IdeEvent> {
        read_events_failsafe(&io.full_path_out(rel), |_, _| panic!("decode error"))
            .unwrap()
            .collect()
    }

    fn setup() -> (TempDir, ArchiveIo) {
        let dir = TempDir::new().unwrap();
        let io = ArchiveIo::new(dir.path().join("raw"), dir.path().join("clean"));
        std::fs::create_dir_all(io.dir_in()).unwrap();
        (dir, io)
    }

    #[test]
    fn test_clean_runner_cleans_all_archives() {
        let (_dir, io) = setup();
        add_archive(&io, "a.jsonl", &[command("a", 2), command("b", 1), command("a", 2)]);
        add_archive(&io, "sub/b.jsonl", &[command("c", 1)]);

        CleanRunner::new(io.clone(), 2).run().unwrap();

        assert_eq!(
            read_output(&io, "a.jsonl"),
            vec![command("b", 1), command("a", 2)]
        );
        assert_eq!(read_output(&io, "sub/b.jsonl"), vec![command("c", 1)]);
    }

    #[test]
    fn test_clean_runner_drops_unnamed_commands() {
        let (_dir, io) = setup();
        add_archive(
            &io,
            "a.jsonl",
            &[
                command("{5EFC7975-14BC-11CF-9B2B-00AA00573819}:331:", 1),
                command("Edit.Paste", 2),
            ],
        );

        CleanRunner::new(io.clone(), 1).run().unwrap();

        assert_eq!(read_output(&io, "a.jsonl"), vec![command("Edit.Paste", 2)]);
    }

    #[test]
    fn test_clean_runner_splits_version_control_events() {
        let (_dir, io) = setup();
        let composite = IdeEvent {
            envelope: EventEnvelope {
                session_id: "s-1".to_string(),
                triggered_at: Some(ts(0)),
                ..Default::default()
            },
            payload: EventPayload::VersionControl {
                actions: vec![
                    VersionControlAction {
                        kind: VersionControlActionKind::Commit,
                        executed_at: ts(5),
                    },
                    VersionControlAction {
                        kind: VersionControlActionKind::Push,
                        executed_at: ts(9),
                    },
                ],
            },
        };
        add_archive(&io, "a.jsonl", &[composite]);

        CleanRunner::new(io.clone(), 1).run().unwrap();

        let cleaned = read_output(&io, "a.jsonl");
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].envelope.triggered_at, Some(ts(5)));
        assert_eq!(cleaned[1].envelope.triggered_at, Some(ts(9)));
        assert_eq!(cleaned[0].envelope.session_id, "s-1");
    }

    #[test]
    fn test_clean_runner_toggles_disable_stages() {
        let (_dir, io) = setup();
        let unnamed = command("{5EFC7975-14BC-11CF-9B2B-00AA00573819}:331:", 1);
        add_archive(&io, "a.jsonl", &[unnamed.clone()]);

        CleanRunner::new(io.clone(), 1)
            .keep_unnamed_commands(true)
            .split_version_control(false)
            .run()
            .unwrap();

        assert_eq!(read_output(&io, "a.jsonl"), vec![unnamed]);
    }

    #[test]
    fn test_more_workers_than_archives() {
        let (_dir, io) = setup();
        add_archive(&io, "a.jsonl", &[command("a", 1)]);

        CleanRunner::new(io.clone(), 8).run().unwrap();

        assert_eq!(read_output(&io, "a.jsonl"), vec![command("a", 1)]);
    }

    #[test]
    fn test_clean_runner_with_empty_input_root() {
        let (_dir, io) = setup();
        CleanRunner::new(io, 4).run().unwrap();
    }

    #[test]
    fn test_stats_runner_processes_all_archives() {
        let (_dir, io) = setup();
        add_archive(&io, "a.jsonl", &[command("a", 2), command("b", 1)]);
        add_archive(&io, "b.jsonl", &[]);

        StatsRunner::new(io.dir_in(), 2).run().unwrap();
    }
}
