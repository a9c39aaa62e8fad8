//! Stream transforms mapping one event to zero or more events.

use telemetry_core::events::IdeEvent;

use crate::short_type_name;

/// A named event transform.
///
/// The whole-stream behavior defaults to a flat-map of the single-event
/// transform in input order; implementations with stateful whole-stream
/// behavior may override [`EventFixer::process`] directly.
pub trait EventFixer {
    /// Display name, used as the checkpoint label. Defaults to the
    /// implementing type's name.
    fn name(&self) -> String {
        short_type_name::<Self>()
    }

    /// Transform a single event into zero, one, or many output events.
    fn fix(&self, event: IdeEvent) -> Vec<IdeEvent>;

    /// Transform a whole stream. Default: apply [`EventFixer::fix`] to each
    /// event and concatenate the outputs in input order.
    fn process(&self, events: Vec<IdeEvent>) -> Vec<IdeEvent> {
        events.into_iter().flat_map(|e| self.fix(e)).collect()
    }
}
