//! Inputs to the orchestration pipeline.
//!
//! Raw interaction events come from the host's input layer. Together with the
//! lifecycle signals (startup, display frames, scramble responses) and the
//! commands the pipeline itself emits, they form the single [`Action`] stream
//! every sub-pipeline observes.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::scramble::ScrambleResponse;

// ---------------------------------------------------------------------------
// Interaction events
// ---------------------------------------------------------------------------

/// What the finger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Down,
    Up,
    Cancel,
}

impl EventKind {
    /// All kinds, in a stable order.
    pub const ALL: [EventKind; 3] = [EventKind::Down, EventKind::Up, EventKind::Cancel];
}

/// A timestamped interaction produced by the input layer. Consumed once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub kind: EventKind,
    /// Milliseconds on the host's high-resolution clock.
    pub timestamp: f64,
}

impl InteractionEvent {
    pub fn new(kind: EventKind, timestamp: f64) -> Self {
        Self { kind, timestamp }
    }

    pub fn down(timestamp: f64) -> Self {
        Self::new(EventKind::Down, timestamp)
    }

    pub fn up(timestamp: f64) -> Self {
        Self::new(EventKind::Up, timestamp)
    }

    pub fn cancel(timestamp: f64) -> Self {
        Self::new(EventKind::Cancel, timestamp)
    }
}

// ---------------------------------------------------------------------------
// Action stream
// ---------------------------------------------------------------------------

/// One element of the stream delivered to every sub-pipeline.
///
/// Commands emitted by a sub-pipeline re-enter the stream as
/// [`Action::Command`], which is how sub-pipelines observe each other
/// without calling each other.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The application has started. Delivered exactly once.
    Startup,
    /// A raw interaction from the input layer.
    Interaction(InteractionEvent),
    /// The host's display-frame callback fired.
    Frame,
    /// The scramble generator answered a request.
    ScrambleResponse(ScrambleResponse),
    /// A command emitted by one of the sub-pipelines.
    Command(Command),
}

impl Action {
    /// The interaction carried by this action, if it is one of the given kind.
    pub fn interaction(&self, kind: EventKind) -> Option<&InteractionEvent> {
        match self {
            Action::Interaction(event) if event.kind == kind => Some(event),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        assert_eq!(InteractionEvent::down(1.0).kind, EventKind::Down);
        assert_eq!(InteractionEvent::up(2.0).kind, EventKind::Up);
        assert_eq!(InteractionEvent::cancel(3.0).kind, EventKind::Cancel);
    }

    #[test]
    fn interaction_filter_matches_kind_only() {
        let action = Action::Interaction(InteractionEvent::up(10.0));
        assert_eq!(
            action.interaction(EventKind::Up),
            Some(&InteractionEvent::up(10.0))
        );
        assert!(action.interaction(EventKind::Down).is_none());
        assert!(Action::Frame.interaction(EventKind::Up).is_none());
    }
}
