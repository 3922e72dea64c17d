//! Reference state store.
//!
//! Owns the mode, the elapsed-time bookkeeping and the displayed scramble.
//! Interactions update the mode *before* the orchestrator sees them; every
//! other change arrives as a [`Command`] drained from the orchestrator.

use serde::{Deserialize, Serialize};

use crate::command::{Command, TimingCommand};
use crate::context::{PuzzleSelection, TimerContext, TimerSnapshot};
use crate::event::{EventKind, InteractionEvent};
use crate::id::CommandId;
use crate::mode::Mode;

/// The mode an interaction leads to.
pub fn next_mode(mode: Mode, kind: EventKind) -> Mode {
    match (mode, kind) {
        (Mode::Idle, EventKind::Down) => Mode::HandOnTimer,
        (Mode::HandOnTimer, EventKind::Up) => Mode::Running,
        (Mode::Running, EventKind::Down) => Mode::Stopped,
        (Mode::Stopped, EventKind::Up) => Mode::Ready,
        (Mode::Ready, EventKind::Down) => Mode::HandOnTimer,
        (Mode::Idle, EventKind::Cancel) => Mode::Idle,
        (_, EventKind::Cancel) => Mode::Ready,
        (mode, _) => mode,
    }
}

/// Elapsed-time bookkeeping for the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerTime {
    pub started_at: Option<f64>,
    pub stopped_at: Option<f64>,
    pub elapsed_ms: f64,
}

impl TimerTime {
    fn apply(&mut self, command: &TimingCommand) {
        match *command {
            TimingCommand::Start { timestamp } => {
                *self = TimerTime {
                    started_at: Some(timestamp),
                    stopped_at: None,
                    elapsed_ms: 0.0,
                };
            }
            TimingCommand::Stop { timestamp } => {
                self.stopped_at = Some(timestamp);
                if let Some(started_at) = self.started_at {
                    self.elapsed_ms = timestamp - started_at;
                }
            }
            TimingCommand::Reset { .. } => *self = TimerTime::default(),
        }
    }

    fn tick(&mut self, timestamp: f64) {
        if let (Some(started_at), None) = (self.started_at, self.stopped_at) {
            self.elapsed_ms = (timestamp - started_at).max(0.0);
        }
    }
}

/// Scramble display state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrambleDisplay {
    pub current: Option<String>,
    pub current_id: Option<CommandId>,
    /// Fetches started but not yet answered.
    pub loading: u32,
}

/// In-memory store implementing [`TimerContext`].
#[derive(Debug, Clone, Default)]
pub struct TimerStore {
    mode: Mode,
    time: TimerTime,
    scramble: ScrambleDisplay,
    puzzle: PuzzleSelection,
}

impl TimerStore {
    pub fn new(puzzle: PuzzleSelection) -> Self {
        Self {
            puzzle,
            ..Default::default()
        }
    }

    /// Apply the mode change an interaction causes.
    pub fn apply_interaction(&mut self, event: &InteractionEvent) {
        self.mode = next_mode(self.mode, event.kind);
    }

    /// Apply one command from the orchestrator.
    pub fn apply(&mut self, command: &Command) {
        match command {
            Command::Timing(timing) => self.time.apply(timing),
            Command::Tick(tick) => self.time.tick(tick.timestamp),
            Command::ScrambleFetchStarted { .. } => self.scramble.loading += 1,
            Command::ScrambleFetchSucceeded { .. } => {
                self.scramble.loading = self.scramble.loading.saturating_sub(1);
            }
            Command::ScrambleAdvance {
                command_id,
                scramble,
            } => {
                self.scramble.current = Some(scramble.clone());
                self.scramble.current_id = Some(*command_id);
            }
        }
    }

    pub fn select_puzzle(&mut self, puzzle: PuzzleSelection) {
        self.puzzle = puzzle;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn time(&self) -> &TimerTime {
        &self.time
    }

    pub fn scramble(&self) -> &ScrambleDisplay {
        &self.scramble
    }

    pub fn puzzle(&self) -> &PuzzleSelection {
        &self.puzzle
    }
}

impl TimerContext for TimerStore {
    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            puzzle: self.puzzle.clone(),
            scramble: self.scramble.current.clone(),
            elapsed_ms: self.time.elapsed_ms,
            stopped_at: self.time.stopped_at,
        }
    }

    fn mode(&self) -> Mode {
        self.mode
    }
}
