//! Splitting composite version-control events into atomic sub-events.

use telemetry_core::events::{EventEnvelope, EventPayload, IdeEvent};

use crate::fixer::EventFixer;

/// Expands one composite version-control event into one event per action.
///
/// Each output copies every envelope field from the input except the
/// trigger time, which is overridden with the action's own execution
/// timestamp, and carries exactly the one action it was derived from.
/// An event with zero actions produces no output; any other event kind
/// passes through unchanged.
pub struct VersionControlEventSplitter;

impl EventFixer for VersionControlEventSplitter {
    fn fix(&self, event: IdeEvent) -> Vec<IdeEvent> {
        let IdeEvent { envelope, payload } = event;
        match payload {
            EventPayload::VersionControl { actions } => actions
                .into_iter()
                .map(|action| IdeEvent {
                    envelope: EventEnvelope {
                        triggered_at: Some(action.executed_at),
                        ..envelope.clone()
                    },
                    payload: EventPayload::VersionControl {
                        actions: vec![action],
                    },
                })
                .collect(),
            other => vec![IdeEvent {
                envelope,
                payload: other,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
    use telemetry_core::events::{
        TriggerSource, VersionControlAction, VersionControlActionKind,
    };

    fn time(offset_min: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2017, 6, 12, 14, 0, 0)
            .unwrap()
            + TimeDelta::minutes(offset_min)
    }

    fn action(kind: VersionControlActionKind, offset_min: i64) -> VersionControlAction {
        VersionControlAction {
            kind,
            executed_at: time(offset_min),
        }
    }

    fn vc_event(offset_min: i64, actions: Vec<VersionControlAction>) -> IdeEvent {
        IdeEvent {
            envelope: EventEnvelope {
                id: "e-vc".to_string(),
                session_id: "s-1".to_string(),
                ide_version: "0.9.2".to_string(),
                triggered_at: Some(time(offset_min)),
                duration_ms: Some(500),
                triggered_by: TriggerSource::Click,
                active_document: "doc".to_string(),
                active_window: "win".to_string(),
            },
            payload: EventPayload::VersionControl { actions },
        }
    }

    fn command(offset_min: i64) -> IdeEvent {
        IdeEvent {
            envelope: EventEnvelope {
                triggered_at: Some(time(offset_min)),
                ..Default::default()
            },
            payload: EventPayload::Command {
                command_id: "cmd".to_string(),
            },
        }
    }

    #[test]
    fn test_other_events_pass_through_unchanged() {
        let e = command(0);
        assert_eq!(VersionControlEventSplitter.fix(e.clone()), vec![e]);
    }

    #[test]
    fn test_zero_actions_is_dropped() {
        let out = VersionControlEventSplitter.fix(vc_event(0, vec![]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_action_yields_one_event_with_time_set() {
        let a = action(VersionControlActionKind::Commit, 3);
        let out = VersionControlEventSplitter.fix(vc_event(0, vec![a]));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].envelope.triggered_at, Some(time(3)));
        assert_eq!(
            out[0].payload,
            EventPayload::VersionControl { actions: vec![a] }
        );
    }

    #[test]
    fn test_n_actions_yield_n_events_with_their_own_times() {
        let a1 = action(VersionControlActionKind::Pull, 1);
        let a2 = action(VersionControlActionKind::Commit, 2);
        let a3 = action(VersionControlActionKind::Push, 4);
        let out = VersionControlEventSplitter.fix(vc_event(0, vec![a1, a2, a3]));

        assert_eq!(out.len(), 3);
        for (e, a) in out.iter().zip([a1, a2, a3]) {
            assert_eq!(e.envelope.triggered_at, Some(a.executed_at));
            assert_eq!(
                e.payload,
                EventPayload::VersionControl { actions: vec![a] }
            );
        }
    }

    #[test]
    fn test_envelope_fields_are_copied() {
        let a = action(VersionControlActionKind::Checkout, 5);
        let input = vc_event(0, vec![a]);
        let out = VersionControlEventSplitter.fix(input.clone());

        let expected = EventEnvelope {
            triggered_at: Some(time(5)),
            ..input.envelope
        };
        assert_eq!(out[0].envelope, expected);
    }

    #[test]
    fn test_default_name() {
        assert_eq!(
            VersionControlEventSplitter.name(),
            "VersionControlEventSplitter"
        );
    }
}
