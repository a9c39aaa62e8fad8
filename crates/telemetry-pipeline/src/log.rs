//! Logging collaborator for the cleaning pipeline.

use std::collections::BTreeMap;
use std::path::Path;

use telemetry_core::TelemetryError;
use tracing::{info, warn};

/// Lifecycle notifications emitted while cleaning archives.
pub trait CleanLog {
    /// Input and output working directories, reported once per cleaner.
    fn working_in(&mut self, dir_in: &Path, dir_out: &Path);

    /// Registered filter and fixer names, in registration order. Reported
    /// exactly once, before the first clean call.
    fn registered_config(&mut self, filters: &[String], fixers: &[String]);

    /// A clean call started reading the given archive.
    fn reading_archive(&mut self, rel: &str);

    /// A clean call started writing its output archive.
    fn writing_events(&mut self);

    /// Per-checkpoint surviving counts of one finished clean call, in
    /// pipeline order.
    fn finished_writing(&mut self, counts: &[(String, usize)]);

    /// One archive entry failed to decode and was skipped.
    fn deserialization_error(&mut self, archive: &Path, line_no: usize, error: &TelemetryError);

    /// End-of-run totals, aggregated across all clean calls.
    fn summary(&mut self);
}

// ── CleanerLog ────────────────────────────────────────────────────────────────

/// Production log: forwards every notification to `tracing` and sums
/// identically-named checkpoint counts across clean calls for the
/// end-of-run summary.
#[derive(Debug, Default)]
pub struct CleanerLog {
    aggregated: BTreeMap<String, usize>,
}

impl CleanerLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoint totals accumulated so far, by label.
    pub fn aggregated_counts(&self) -> &BTreeMap<String, usize> {
        &self.aggregated
    }
}

impl CleanLog for CleanerLog {
    fn working_in(&mut self, dir_in: &Path, dir_out: &Path) {
        info!("started cleaning");
        info!("- in:  {}", dir_in.display());
        info!("- out: {}", dir_out.display());
    }

    fn registered_config(&mut self, filters: &[String], fixers: &[String]) {
        info!("registered filters:");
        for name in filters {
            info!("- {}", name);
        }
        info!("registered fixers:");
        for name in fixers {
            info!("- {}", name);
        }
    }

    fn reading_archive(&mut self, rel: &str) {
        info!("reading archive: {}", rel);
    }

    fn writing_events(&mut self) {
        info!("writing cleaned events...");
    }

    fn finished_writing(&mut self, counts: &[(String, usize)]) {
        for (label, count) in counts {
            info!("- {}: {}", label, count);
            *self.aggregated.entry(label.clone()).or_insert(0) += count;
        }
    }

    fn deserialization_error(&mut self, archive: &Path, line_no: usize, error: &TelemetryError) {
        warn!(
            "error during deserialization of {} (line {}): {}",
            archive.display(),
            line_no,
            error
        );
    }

    fn summary(&mut self) {
        info!("cleaning totals over all archives:");
        for (label, count) in &self.aggregated {
            info!("- {}: {}", label, count);
        }
    }
}
