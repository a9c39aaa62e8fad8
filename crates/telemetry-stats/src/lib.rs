//! Interaction statistics over cleaned telemetry event streams.

pub mod interaction;

pub use interaction::{
    InteractionStatistics, InteractionStatsExtractor, ACTIVE_TIME_TIMEOUT_SECS, ALL_EVENT_KINDS,
};
