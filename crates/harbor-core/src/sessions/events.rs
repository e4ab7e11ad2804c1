use serde::{Deserialize, Serialize};

/// Lifecycle transitions observed on a session's event stream.
///
/// Each variant describes _what happened_, not what should happen. Events
/// for one session are delivered in the order the transitions occurred and
/// nothing is delivered after `Terminated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// A launch request was handed to the hosting subsystem.
    LaunchStarted { session_id: String },
    /// The guest's process id resolved; the session is running.
    Running { session_id: String, pid: u32 },
    /// The guest yielded the foreground.
    Backgrounded { session_id: String },
    /// The guest returned to the foreground.
    Foregrounded { session_id: String },
    /// Termination was requested; teardown is in flight.
    Terminating { session_id: String },
    /// The guest process is gone. `error` is set for failed launches and
    /// unexpected exits.
    Terminated {
        session_id: String,
        error: Option<String>,
    },
}

impl LifecycleEvent {
    pub fn session_id(&self) -> &str {
        match self {
            LifecycleEvent::LaunchStarted { session_id }
            | LifecycleEvent::Running { session_id, .. }
            | LifecycleEvent::Backgrounded { session_id }
            | LifecycleEvent::Foregrounded { session_id }
            | LifecycleEvent::Terminating { session_id }
            | LifecycleEvent::Terminated { session_id, .. } => session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde_roundtrip() {
        let event = LifecycleEvent::Running {
            session_id: "com.example.notes:default".to_string(),
            pid: 4321,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: LifecycleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_all_event_variants_serialize() {
        let events = vec![
            LifecycleEvent::LaunchStarted {
                session_id: "s".to_string(),
            },
            LifecycleEvent::Running {
                session_id: "s".to_string(),
                pid: 1,
            },
            LifecycleEvent::Backgrounded {
                session_id: "s".to_string(),
            },
            LifecycleEvent::Foregrounded {
                session_id: "s".to_string(),
            },
            LifecycleEvent::Terminating {
                session_id: "s".to_string(),
            },
            LifecycleEvent::Terminated {
                session_id: "s".to_string(),
                error: Some("guest process exited unexpectedly".to_string()),
            },
        ];
        for event in events {
            assert_eq!(event.session_id(), "s");
            assert!(
                serde_json::to_string(&event).is_ok(),
                "Failed to serialize: {:?}",
                event
            );
        }
    }
}
