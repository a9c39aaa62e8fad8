//! Core domain model for the IDE telemetry processor.
//!
//! Defines the event envelope shared by every event kind, the closed
//! catalogue of event payloads, and the error type used across all crates.

pub mod error;
pub mod events;

pub use error::{Result, TelemetryError};
