//! Timer modes and the mode transition table.
//!
//! The table maps the mode the store is in *after* it applied an interaction
//! to the timing command that interaction implies:
//!
//! | event  | mode → command                          |
//! |--------|-----------------------------------------|
//! | Down   | HandOnTimer → Reset, Stopped → Stop     |
//! | Up     | Running → Start, Ready → none           |
//! | Cancel | Ready → Reset                           |
//!
//! Every pair not listed yields no command. That is a no-op, not an error.

use serde::{Deserialize, Serialize};

use crate::command::{Command, TimingCommand};
use crate::context::SharedContext;
use crate::event::{Action, EventKind, InteractionEvent};
use crate::pipeline::{Pipeline, PipelineError};

/// State of the timer finite-state machine. Owned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Idle,
    /// Finger down, about to start.
    HandOnTimer,
    Running,
    Stopped,
    /// Result committed, awaiting the next scramble.
    Ready,
}

impl Mode {
    /// All modes, in lifecycle order.
    pub const ALL: [Mode; 5] = [
        Mode::Idle,
        Mode::HandOnTimer,
        Mode::Running,
        Mode::Stopped,
        Mode::Ready,
    ];
}

/// Which timing command a table entry produces, before it is stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingKind {
    Start,
    Stop,
    Reset,
}

impl TimingKind {
    pub fn at(self, timestamp: f64) -> TimingCommand {
        match self {
            TimingKind::Start => TimingCommand::Start { timestamp },
            TimingKind::Stop => TimingCommand::Stop { timestamp },
            TimingKind::Reset => TimingCommand::Reset { timestamp },
        }
    }
}

/// The transition table.
pub fn timing_for(mode: Mode, kind: EventKind) -> Option<TimingKind> {
    match (kind, mode) {
        (EventKind::Down, Mode::HandOnTimer) => Some(TimingKind::Reset),
        (EventKind::Down, Mode::Stopped) => Some(TimingKind::Stop),
        (EventKind::Up, Mode::Running) => Some(TimingKind::Start),
        // Listed with no command: the recorder and scramble flows own this one.
        (EventKind::Up, Mode::Ready) => None,
        (EventKind::Cancel, Mode::Ready) => Some(TimingKind::Reset),
        _ => None,
    }
}

/// The timing command for `event` observed while the store is in `mode`.
pub fn transition(mode: Mode, event: &InteractionEvent) -> Option<TimingCommand> {
    timing_for(mode, event.kind).map(|kind| kind.at(event.timestamp))
}

// ---------------------------------------------------------------------------
// ModeTransitions sub-pipeline
// ---------------------------------------------------------------------------

/// Turns interactions into timing commands using the current mode.
pub struct ModeTransitions {
    context: SharedContext,
}

impl ModeTransitions {
    pub fn new(context: SharedContext) -> Self {
        Self { context }
    }
}

impl Pipeline for ModeTransitions {
    fn name(&self) -> &'static str {
        "mode-transitions"
    }

    fn handle(&mut self, action: &Action) -> Result<Vec<Command>, PipelineError> {
        let Action::Interaction(event) = action else {
            return Ok(Vec::new());
        };
        let mode = self.context.mode();
        Ok(transition(mode, event)
            .map(Command::Timing)
            .into_iter()
            .collect())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn expected(mode: Mode, kind: EventKind) -> Option<TimingKind> {
        match (kind, mode) {
            (EventKind::Down, Mode::HandOnTimer) => Some(TimingKind::Reset),
            (EventKind::Down, Mode::Stopped) => Some(TimingKind::Stop),
            (EventKind::Up, Mode::Running) => Some(TimingKind::Start),
            (EventKind::Cancel, Mode::Ready) => Some(TimingKind::Reset),
            _ => None,
        }
    }

    #[test]
    fn table_is_exact_for_every_pair() {
        let rows: [(Mode, EventKind, Option<TimingKind>); 15] = [
            (Mode::Idle, EventKind::Down, None),
            (Mode::Idle, EventKind::Up, None),
            (Mode::Idle, EventKind::Cancel, None),
            (Mode::HandOnTimer, EventKind::Down, Some(TimingKind::Reset)),
            (Mode::HandOnTimer, EventKind::Up, None),
            (Mode::HandOnTimer, EventKind::Cancel, None),
            (Mode::Running, EventKind::Down, None),
            (Mode::Running, EventKind::Up, Some(TimingKind::Start)),
            (Mode::Running, EventKind::Cancel, None),
            (Mode::Stopped, EventKind::Down, Some(TimingKind::Stop)),
            (Mode::Stopped, EventKind::Up, None),
            (Mode::Stopped, EventKind::Cancel, None),
            (Mode::Ready, EventKind::Down, None),
            (Mode::Ready, EventKind::Up, None),
            (Mode::Ready, EventKind::Cancel, Some(TimingKind::Reset)),
        ];
        for (mode, kind, want) in rows {
            assert_eq!(timing_for(mode, kind), want, "{mode:?} x {kind:?}");
        }
    }

    #[test]
    fn transition_stamps_event_timestamp() {
        assert_eq!(
            transition(Mode::Running, &InteractionEvent::up(120.5)),
            Some(TimingCommand::Start { timestamp: 120.5 })
        );
        assert_eq!(
            transition(Mode::Stopped, &InteractionEvent::down(900.0)),
            Some(TimingCommand::Stop { timestamp: 900.0 })
        );
        assert_eq!(transition(Mode::Idle, &InteractionEvent::up(1.0)), None);
    }

    fn arb_mode() -> impl Strategy<Value = Mode> {
        prop::sample::select(Mode::ALL.to_vec())
    }

    fn arb_kind() -> impl Strategy<Value = EventKind> {
        prop::sample::select(EventKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn transition_agrees_with_table(
            mode in arb_mode(),
            kind in arb_kind(),
            ts in 0.0f64..1.0e9,
        ) {
            let event = InteractionEvent::new(kind, ts);
            let got = transition(mode, &event);
            prop_assert_eq!(got, expected(mode, kind).map(|k| k.at(ts)));
            if let Some(cmd) = got {
                prop_assert_eq!(cmd.timestamp(), ts);
            }
        }
    }
}
