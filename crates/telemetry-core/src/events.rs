use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// The earliest representable timestamp, used as a sentinel wherever a
/// trigger time is absent (mirrors the archive format's minimum-value
/// convention).
pub fn min_timestamp() -> DateTime<FixedOffset> {
    DateTime::<Utc>::MIN_UTC.fixed_offset()
}

/// How an event was triggered inside the IDE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    #[default]
    Unknown,
    Click,
    Shortcut,
    Typing,
    Automatic,
}

/// Fields shared by every event kind.
///
/// Termination time is not stored directly; it is derived from the trigger
/// time plus the duration, when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier of this event.
    #[serde(default)]
    pub id: String,
    /// Identifier of the IDE session that produced the event.
    #[serde(default)]
    pub session_id: String,
    /// Version of the telemetry tooling that recorded the event.
    #[serde(default)]
    pub ide_version: String,
    /// When the event was triggered; the recorded UTC offset is preserved.
    #[serde(default)]
    pub triggered_at: Option<DateTime<FixedOffset>>,
    /// How long the event lasted, in milliseconds.
    #[serde(default)]
    pub duration_ms: Option<i64>,
    /// What kind of interaction triggered the event.
    #[serde(default)]
    pub triggered_by: TriggerSource,
    /// Document that had focus when the event fired.
    #[serde(default)]
    pub active_document: String,
    /// Window that had focus when the event fired.
    #[serde(default)]
    pub active_window: String,
}

impl EventEnvelope {
    /// Trigger time plus duration, when both are recorded.
    pub fn terminated_at(&self) -> Option<DateTime<FixedOffset>> {
        match (self.triggered_at, self.duration_ms) {
            (Some(start), Some(ms)) => Some(start + TimeDelta::milliseconds(ms)),
            _ => None,
        }
    }
}

/// Discrete operation recorded inside a composite version-control event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionControlActionKind {
    #[default]
    Unknown,
    Branch,
    Checkout,
    Clone,
    Commit,
    CommitAmend,
    Merge,
    Pull,
    Push,
    Rebase,
    Reset,
}

/// One version-control operation and the moment it was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionControlAction {
    pub kind: VersionControlActionKind,
    pub executed_at: DateTime<FixedOffset>,
}

/// Self-reported education level from a user-profile event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    #[default]
    Unknown,
    Training,
    Bachelor,
    Master,
    Doctorate,
    Autodidact,
}

/// Self-reported professional position from a user-profile event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Unknown,
    Student,
    SoftwareEngineer,
    Researcher,
    Hobbyist,
    Manager,
}

/// Kind-specific payload. The catalogue is closed: kind-specific logic must
/// match exhaustively so that adding a variant is a reviewable change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// An IDE command invocation.
    Command { command_id: String },
    /// A composite version-control event carrying zero or more actions.
    VersionControl { actions: Vec<VersionControlAction> },
    /// A self-reported user profile.
    UserProfile {
        #[serde(default)]
        education: Education,
        #[serde(default)]
        position: Position,
    },
    /// A code-completion invocation.
    Completion,
    /// A test-run execution.
    TestRun,
    // Structural IDE events, relevant only as count buckets.
    Activity,
    Build,
    Debugger,
    Document,
    Edit,
    Error,
    Find,
    IdeState,
    Info,
    Install,
    Navigation,
    Solution,
    System,
    Update,
    Window,
}

/// Fieldless mirror of [`EventPayload`], used as the key for count buckets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EventKind {
    Command,
    VersionControl,
    UserProfile,
    Completion,
    TestRun,
    Activity,
    Build,
    Debugger,
    Document,
    Edit,
    Error,
    Find,
    IdeState,
    Info,
    Install,
    Navigation,
    Solution,
    System,
    Update,
    Window,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl EventPayload {
    /// The count-bucket kind of this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Command { .. } => EventKind::Command,
            EventPayload::VersionControl { .. } => EventKind::VersionControl,
            EventPayload::UserProfile { .. } => EventKind::UserProfile,
            EventPayload::Completion => EventKind::Completion,
            EventPayload::TestRun => EventKind::TestRun,
            EventPayload::Activity => EventKind::Activity,
            EventPayload::Build => EventKind::Build,
            EventPayload::Debugger => EventKind::Debugger,
            EventPayload::Document => EventKind::Document,
            EventPayload::Edit => EventKind::Edit,
            EventPayload::Error => EventKind::Error,
            EventPayload::Find => EventKind::Find,
            EventPayload::IdeState => EventKind::IdeState,
            EventPayload::Info => EventKind::Info,
            EventPayload::Install => EventKind::Install,
            EventPayload::Navigation => EventKind::Navigation,
            EventPayload::Solution => EventKind::Solution,
            EventPayload::System => EventKind::System,
            EventPayload::Update => EventKind::Update,
            EventPayload::Window => EventKind::Window,
        }
    }
}

/// One telemetry event: the shared envelope plus a kind-specific payload.
///
/// Equality and hashing are structural over every field, which is the basis
/// for deduplication in the cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdeEvent {
    #[serde(flatten)]
    pub envelope: EventEnvelope,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl IdeEvent {
    /// The count-bucket kind of this event.
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// When the event was triggered, if recorded.
    pub fn triggered_at(&self) -> Option<DateTime<FixedOffset>> {
        self.envelope.triggered_at
    }

    /// When the event terminated (trigger + duration), if both are recorded.
    pub fn terminated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.envelope.terminated_at()
    }
}
