//! Cleaning pipeline for archived IDE telemetry.
//!
//! Events flow read → filters → fixers → dedup → order → write, with a
//! named checkpoint count recorded after every stage. Filters drop events
//! that fail a predicate; fixers map one event to zero or more events.

pub mod cleaner;
pub mod filter;
pub mod fixer;
pub mod log;
pub mod splitter;

pub use cleaner::Cleaner;
pub use filter::{EventFilter, UnnamedCommandFilter};
pub use fixer::EventFixer;
pub use log::{CleanLog, CleanerLog};
pub use splitter::VersionControlEventSplitter;

/// Last segment of a type path, used as the default stage name.
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full).to_string()
}
