//! The pipeline orchestrator: read → filter → fix → dedup → order → write.

use std::collections::HashSet;

use telemetry_archive::{read_events_failsafe, ArchiveIo, WritingArchive};
use telemetry_core::events::IdeEvent;
use telemetry_core::{Result, TelemetryError};

use crate::filter::EventFilter;
use crate::fixer::EventFixer;
use crate::log::CleanLog;

/// Cleans one archive per [`Cleaner::clean`] call.
///
/// Filters and fixers are applied in registration order, and a checkpoint
/// count is recorded after every stage. A single instance is not designed
/// for concurrent clean calls; parallel cleaning of distinct archives uses
/// one `Cleaner` per worker.
pub struct Cleaner<L: CleanLog> {
    io: ArchiveIo,
    log: L,
    filters: Vec<Box<dyn EventFilter>>,
    fixers: Vec<Box<dyn EventFixer>>,
    has_reported_config: bool,
}

impl<L: CleanLog> Cleaner<L> {
    pub fn new(io: ArchiveIo, mut log: L) -> Self {
        log.working_in(io.dir_in(), io.dir_out());
        Self {
            io,
            log,
            filters: Vec::new(),
            fixers: Vec::new(),
            has_reported_config: false,
        }
    }

    /// Register a filter. Applied after all previously registered filters.
    pub fn add_filter(&mut self, filter: Box<dyn EventFilter>) -> Result<()> {
        let name = filter.name();
        if self.stage_name_taken(&name) {
            return Err(TelemetryError::DuplicateStageName(name));
        }
        self.filters.push(filter);
        Ok(())
    }

    /// Register a fixer. Applied after all filters and all previously
    /// registered fixers.
    pub fn add_fixer(&mut self, fixer: Box<dyn EventFixer>) -> Result<()> {
        let name = fixer.name();
        if self.stage_name_taken(&name) {
            return Err(TelemetryError::DuplicateStageName(name));
        }
        self.fixers.push(fixer);
        Ok(())
    }

    /// Registered filter names, in registration order.
    pub fn filter_names(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Registered fixer names, in registration order.
    pub fn fixer_names(&self) -> Vec<String> {
        self.fixers.iter().map(|f| f.name()).collect()
    }

    /// Clean the archive identified by `rel`.
    ///
    /// A missing input archive aborts the call: no output is written and
    /// no counts are recorded. Per-entry decode failures are reported to
    /// the log and skipped.
    pub fn clean(&mut self, rel: &str) -> Result<()> {
        self.report_config();

        let mut counts: Vec<(String, usize)> = Vec::new();

        self.log.reading_archive(rel);
        let path_in = self.io.full_path_in(rel);
        let mut events: Vec<IdeEvent> = {
            let log = &mut self.log;
            read_events_failsafe(&path_in, |line_no, err| {
                log.deserialization_error(&path_in, line_no, err)
            })?
            .collect()
        };
        counts.push(("before applying any filter".to_string(), events.len()));

        for filter in &self.filters {
            events.retain(|e| filter.keep(e));
            counts.push((
                format!("after applying '{}'", filter.name()),
                events.len(),
            ));
        }

        for fixer in &self.fixers {
            events = fixer.process(events);
            counts.push((format!("after applying '{}'", fixer.name()), events.len()));
        }

        // Structural dedup, first occurrence kept.
        let mut seen: HashSet<IdeEvent> = HashSet::with_capacity(events.len());
        events.retain(|e| seen.insert(e.clone()));
        counts.push(("after removing duplicates".to_string(), events.len()));

        // Stable sort: equal trigger times keep their relative order, and
        // events without a trigger time sort first.
        events.sort_by_key(|e| e.envelope.triggered_at);
        counts.push(("after ordering".to_string(), events.len()));

        self.log.writing_events();
        let path_out = self.io.full_path_out(rel);
        ArchiveIo::ensure_parent_exists(&path_out)?;
        let mut archive = WritingArchive::create(&path_out)?;
        archive.add_all(&events)?;
        archive.finish()?;

        self.log.finished_writing(&counts);
        Ok(())
    }

    fn stage_name_taken(&self, name: &str) -> bool {
        self.filters.iter().any(|f| f.name() == name)
            || self.fixers.iter().any(|f| f.name() == name)
    }

    fn report_config(&mut self) {
        if !self.has_reported_config {
            let filters = self.filter_names();
            let fixers = self.fixer_names();
            self.log.registered_config(&filters, &fixers);
        }
        self.has_reported_config = true;
    }
}

impl<L: CleanLog> Drop for Cleaner<L> {
    fn drop(&mut self) {
        self.log.summary();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
