//! Read-only view of the state store.
//!
//! Sub-pipelines receive a [`SharedContext`] in their constructor and read it
//! synchronously while handling an action. They never keep a snapshot across
//! actions and never write through it.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::id::PuzzleId;
use crate::mode::Mode;

/// The active puzzle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleSelection {
    pub puzzle_id: PuzzleId,
    pub category: String,
    /// Puzzle kind understood by the scramble generator, e.g. `"333"`.
    pub scrambler: String,
}

impl Default for PuzzleSelection {
    fn default() -> Self {
        Self {
            puzzle_id: PuzzleId(0),
            category: "normal".to_string(),
            scrambler: "333".to_string(),
        }
    }
}

/// Point-in-time read of everything the pipeline needs from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub mode: Mode,
    pub puzzle: PuzzleSelection,
    /// The scramble currently displayed, if one has arrived.
    pub scramble: Option<String>,
    pub elapsed_ms: f64,
    /// Timestamp of the stop that ended the last run, if any.
    pub stopped_at: Option<f64>,
}

/// Synchronous accessor over the store.
pub trait TimerContext {
    fn snapshot(&self) -> TimerSnapshot;

    /// Current mode. Prefer this when nothing else is needed.
    fn mode(&self) -> Mode {
        self.snapshot().mode
    }
}

/// How sub-pipelines hold the context.
pub type SharedContext = Rc<dyn TimerContext>;

impl<T: TimerContext> TimerContext for RefCell<T> {
    fn snapshot(&self) -> TimerSnapshot {
        self.borrow().snapshot()
    }

    fn mode(&self) -> Mode {
        self.borrow().mode()
    }
}
