//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so integration
//! tests in `tests/` and downstream crates can use them through the
//! `test-utils` feature.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{PuzzleSelection, SharedContext, TimerContext, TimerSnapshot};
use crate::id::CommandId;
use crate::mode::Mode;
use crate::scramble::{PortError, ResponseSender, ScramblePort, ScrambleRequest, ScrambleResponse};
use crate::solve::{Solve, SolveSink};

// ===========================================================================
// Context
// ===========================================================================

/// A context whose snapshot the test sets by hand.
#[derive(Debug, Clone)]
pub struct FixedContext {
    snapshot: Rc<RefCell<TimerSnapshot>>,
}

impl FixedContext {
    pub fn new(mode: Mode) -> Self {
        Self {
            snapshot: Rc::new(RefCell::new(TimerSnapshot {
                mode,
                puzzle: PuzzleSelection::default(),
                scramble: None,
                elapsed_ms: 0.0,
                stopped_at: None,
            })),
        }
    }

    /// A handle for pipeline constructors. Later `set_*` calls are visible
    /// through it.
    pub fn shared(&self) -> SharedContext {
        Rc::new(self.clone())
    }

    pub fn set_mode(&self, mode: Mode) {
        self.snapshot.borrow_mut().mode = mode;
    }

    /// Pretend a run started at `start` and stopped at `stop`.
    pub fn set_run(&self, start: f64, stop: f64) {
        let mut snapshot = self.snapshot.borrow_mut();
        snapshot.elapsed_ms = stop - start;
        snapshot.stopped_at = Some(stop);
    }

    pub fn set_scramble(&self, scramble: &str) {
        self.snapshot.borrow_mut().scramble = Some(scramble.to_string());
    }

    pub fn set_puzzle(&self, puzzle: PuzzleSelection) {
        self.snapshot.borrow_mut().puzzle = puzzle;
    }
}

impl TimerContext for FixedContext {
    fn snapshot(&self) -> TimerSnapshot {
        self.snapshot.borrow().clone()
    }
}

// ===========================================================================
// Scramble ports
// ===========================================================================

#[derive(Debug, Default)]
struct ScriptedState {
    requests: Vec<ScrambleRequest>,
}

/// Records every request. Responses are sent only when the test calls
/// [`ScriptedPort::respond`], so the test controls arrival order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPort {
    state: Rc<RefCell<ScriptedState>>,
    sender: Option<ResponseSender>,
}

impl ScriptedPort {
    /// A port with nowhere to send responses.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sender(sender: ResponseSender) -> Self {
        Self {
            state: Rc::default(),
            sender: Some(sender),
        }
    }

    pub fn requests(&self) -> Vec<ScrambleRequest> {
        self.state.borrow().requests.clone()
    }

    /// Queue the response for `command_id` on the channel.
    pub fn respond(&self, command_id: CommandId, scramble: &str) {
        let sender = self
            .sender
            .as_ref()
            .expect("ScriptedPort::respond needs a port built with_sender");
        sender
            .send(ScrambleResponse {
                command_id,
                scramble: scramble.to_string(),
            })
            .expect("response receiver dropped");
    }
}

impl ScramblePort for ScriptedPort {
    fn post(&mut self, request: ScrambleRequest) -> Result<(), PortError> {
        self.state.borrow_mut().requests.push(request);
        Ok(())
    }
}

/// Rejects every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingPort;

impl ScramblePort for FailingPort {
    fn post(&mut self, _request: ScrambleRequest) -> Result<(), PortError> {
        Err(PortError::Disconnected)
    }
}

/// Panics on every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingPort;

impl ScramblePort for PanickingPort {
    fn post(&mut self, request: ScrambleRequest) -> Result<(), PortError> {
        panic!("generator crashed on {}", request.command_id);
    }
}

// ===========================================================================
// Solve sinks
// ===========================================================================

/// Keeps solves in memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySolves {
    solves: Rc<RefCell<Vec<Solve>>>,
}

impl MemorySolves {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn solves(&self) -> Vec<Solve> {
        self.solves.borrow().clone()
    }
}

impl SolveSink for MemorySolves {
    fn add(&mut self, solve: Solve) {
        self.solves.borrow_mut().push(solve);
    }
}
