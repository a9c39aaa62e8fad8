//! Pure event predicates: an event survives a filter iff `keep` is true.

use regex::Regex;
use telemetry_core::events::{EventPayload, IdeEvent};

use crate::short_type_name;

/// A named, side-effect-free predicate over single events.
pub trait EventFilter {
    /// Display name, used as the checkpoint label. Defaults to the
    /// implementing type's name.
    fn name(&self) -> String {
        short_type_name::<Self>()
    }

    /// Whether `event` survives this filter.
    fn keep(&self, event: &IdeEvent) -> bool;
}

// ── UnnamedCommandFilter ──────────────────────────────────────────────────────

/// Drops command events whose identifier is a bare GUID/ordinal pair with
/// no trailing human-readable command name, e.g.
/// `{5EFC7975-14BC-11CF-9B2B-00AA00573819}:331:`.
pub struct UnnamedCommandFilter {
    unnamed: Regex,
}

impl UnnamedCommandFilter {
    pub fn new() -> Self {
        Self {
            unnamed: Regex::new(r"^\{[0-9A-Fa-f-]+\}:\d+:$").expect("regex is valid"),
        }
    }
}

impl Default for UnnamedCommandFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFilter for UnnamedCommandFilter {
    fn keep(&self, event: &IdeEvent) -> bool {
        match &event.payload {
            EventPayload::Command { command_id } => !self.unnamed.is_match(command_id),
            _ => true,
        }
    }
}
