//! Single-pass interaction statistics over an ordered event stream.

use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, TimeDelta};
use telemetry_core::events::{
    min_timestamp, Education, EventKind, EventPayload, IdeEvent, Position,
};

/// Two intervals of IDE activity closer than this are merged into one.
pub const ACTIVE_TIME_TIMEOUT_SECS: i64 = 16;

/// The full event-kind catalogue. Count maps are pre-seeded from this list
/// so that a kind that never occurs still shows up with a zero count.
pub const ALL_EVENT_KINDS: [EventKind; 20] = [
    EventKind::Command,
    EventKind::VersionControl,
    EventKind::UserProfile,
    EventKind::Completion,
    EventKind::TestRun,
    EventKind::Activity,
    EventKind::Build,
    EventKind::Debugger,
    EventKind::Document,
    EventKind::Edit,
    EventKind::Error,
    EventKind::Find,
    EventKind::IdeState,
    EventKind::Info,
    EventKind::Install,
    EventKind::Navigation,
    EventKind::Solution,
    EventKind::System,
    EventKind::Update,
    EventKind::Window,
];

/// Immutable snapshot of one user's interaction statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionStatistics {
    /// Earliest observed day, or the minimum-timestamp sentinel.
    pub day_first: DateTime<FixedOffset>,
    /// Latest observed day, or the minimum-timestamp sentinel.
    pub day_last: DateTime<FixedOffset>,
    /// Number of distinct days with at least one event.
    pub num_days: usize,
    /// Number of distinct months with at least one event.
    pub num_months: usize,
    /// Per-kind event counts, pre-seeded zero for the full catalogue.
    pub num_events_detailed: BTreeMap<EventKind, usize>,
    pub education: Education,
    pub position: Position,
    pub num_code_completion: usize,
    pub num_test_runs: usize,
    /// Total time spent actively interacting with the IDE.
    pub active_time: TimeDelta,
}

impl Hash for InteractionStatistics {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.day_first.hash(state);
        self.day_last.hash(state);
        self.num_days.hash(state);
        self.num_months.hash(state);
        self.num_events_detailed.hash(state);
        self.education.hash(state);
        self.position.hash(state);
        self.num_code_completion.hash(state);
        self.num_test_runs.hash(state);
        self.active_time.num_milliseconds().hash(state);
    }
}

impl InteractionStatistics {
    /// Sum of all per-kind counts.
    pub fn num_events_total(&self) -> usize {
        self.num_events_detailed.values().sum()
    }
}

/// Truncate a timestamp to local midnight, keeping its UTC offset.
fn day_of(ts: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let offset = *ts.offset();
    let local_midnight = ts.date_naive().and_time(NaiveTime::MIN);
    DateTime::from_naive_utc_and_offset(local_midnight - offset, offset)
}

/// Computes an [`InteractionStatistics`] snapshot from an event stream that
/// is ordered by trigger time, as produced by the cleaning pipeline.
#[derive(Debug, Default)]
pub struct InteractionStatsExtractor;

impl InteractionStatsExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Single pass over `events`.
    ///
    /// # Panics
    ///
    /// Panics if an event with both trigger and termination time has an
    /// earlier trigger time than a previous such event. Ordered input is
    /// the caller's contract; violating it is a programming error.
    pub fn create_statistics(&self, events: &[IdeEvent]) -> InteractionStatistics {
        let sentinel = min_timestamp();
        let timeout = TimeDelta::seconds(ACTIVE_TIME_TIMEOUT_SECS);

        let mut counts: BTreeMap<EventKind, usize> =
            ALL_EVENT_KINDS.iter().map(|k| (*k, 0)).collect();
        let mut days: HashSet<DateTime<FixedOffset>> = HashSet::new();
        let mut months: HashSet<(i32, u32)> = HashSet::new();
        let mut day_first = sentinel;
        let mut day_last = sentinel;
        let mut education = Education::Unknown;
        let mut position = Position::Unknown;
        let mut num_code_completion = 0;
        let mut num_test_runs = 0;

        let mut active_time = TimeDelta::zero();
        let mut last_triggered_at = sentinel;
        let mut open: Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> = None;

        for event in events {
            if let (Some(triggered), Some(terminated)) =
                (event.triggered_at(), event.terminated_at())
            {
                assert!(
                    last_triggered_at <= triggered,
                    "event stream is not ordered by trigger time: {} follows {}",
                    triggered,
                    last_triggered_at
                );
                last_triggered_at = triggered;

                open = match open {
                    Some((start, end)) if end + timeout < triggered => {
                        active_time = active_time + (end - start);
                        Some((triggered, terminated))
                    }
                    Some((start, end)) => Some((start, end.max(terminated))),
                    None => Some((triggered, terminated)),
                };
            }

            *counts.entry(event.kind()).or_insert(0) += 1;

            let triggered = event.triggered_at().unwrap_or(sentinel);
            let day = day_of(&triggered);
            days.insert(day);
            months.insert((day.year(), day.month()));
            if day_first == sentinel || day < day_first {
                day_first = day;
            }
            if day > day_last {
                day_last = day;
            }

            match &event.payload {
                EventPayload::UserProfile {
                    education: edu,
                    position: pos,
                } => {
                    if *edu != Education::Unknown {
                        education = *edu;
                    }
                    if *pos != Position::Unknown {
                        position = *pos;
                    }
                }
                EventPayload::Completion => num_code_completion += 1,
                EventPayload::TestRun => num_test_runs += 1,
                _ => {}
            }
        }

        if let Some((start, end)) = open {
            active_time = active_time + (end - start);
        }

        InteractionStatistics {
            day_first,
            day_last,
            num_days: days.len(),
            num_months: months.len(),
            num_events_detailed: counts,
            education,
            position,
            num_code_completion,
            num_test_runs,
            active_time,
        }
    }
}
