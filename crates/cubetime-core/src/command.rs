//! Outgoing commands and the merged command queue.
//!
//! Commands are emitted by the sub-pipelines and drained by the state store,
//! which is the only place they take effect. Each command is one tagged
//! value carrying its own payload.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::id::CommandId;

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A change to the timer's elapsed-time bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimingCommand {
    Start { timestamp: f64 },
    Stop { timestamp: f64 },
    Reset { timestamp: f64 },
}

impl TimingCommand {
    /// Timestamp of the interaction that produced this command.
    pub fn timestamp(&self) -> f64 {
        match *self {
            TimingCommand::Start { timestamp }
            | TimingCommand::Stop { timestamp }
            | TimingCommand::Reset { timestamp } => timestamp,
        }
    }
}

/// A display-frame tick emitted while a run is active. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Clock sample taken when the tick was emitted.
    pub timestamp: f64,
}

/// A single command on the outgoing stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Update the timer's time bookkeeping.
    Timing(TimingCommand),
    /// Refresh the elapsed-time display.
    Tick(Tick),
    /// A scramble request is outstanding (loading state).
    ScrambleFetchStarted { command_id: CommandId },
    /// The scramble for `command_id` has arrived.
    ScrambleFetchSucceeded {
        command_id: CommandId,
        scramble: String,
    },
    /// Show the next scramble. Carries the fetch result it was paired with.
    ScrambleAdvance {
        command_id: CommandId,
        scramble: String,
    },
}

impl Command {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Timing(TimingCommand::Start { .. }) => "start",
            Command::Timing(TimingCommand::Stop { .. }) => "stop",
            Command::Timing(TimingCommand::Reset { .. }) => "reset",
            Command::Tick(_) => "tick",
            Command::ScrambleFetchStarted { .. } => "fetch-started",
            Command::ScrambleFetchSucceeded { .. } => "fetch-succeeded",
            Command::ScrambleAdvance { .. } => "advance",
        }
    }
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands emitted since the last drain.
///
/// With a history limit the queue also remembers the most recently drained
/// commands as `(sequence, command)`, where the sequence numbers every
/// command ever drained from 0.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
    history: VecDeque<(u64, Command)>,
    max_history: usize,
    drained: u64,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending command in emission order.
    pub fn drain(&mut self) -> Vec<Command> {
        let commands = std::mem::take(&mut self.pending);
        if self.max_history > 0 {
            for (sequence, command) in (self.drained..).zip(&commands) {
                if self.history.len() == self.max_history {
                    self.history.pop_front();
                }
                self.history.push_back((sequence, command.clone()));
            }
        }
        self.drained += commands.len() as u64;
        commands
    }

    /// Remembered commands, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &(u64, Command)> {
        self.history.iter()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
