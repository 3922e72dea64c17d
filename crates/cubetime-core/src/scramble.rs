//! Scramble fetch and barrier-synchronized advance.
//!
//! Two independently triggered flows meet at a [`PairingBarrier`]:
//!
//! - **Fetch**: on startup and on every `Up` while running, a request tagged
//!   with a fresh [`CommandId`] is posted to the scramble port. Each response
//!   is matched to its request by id alone and announced as
//!   `ScrambleFetchSucceeded`. Requests are not serialized; several may be
//!   outstanding at once.
//! - **Advance**: on startup and on every `Up` while ready.
//!
//! A fetch success (observed back on the action stream) pairs with an advance
//! trigger in arrival order, and each pair emits `ScrambleAdvance`. The shown
//! scramble therefore never runs ahead of a freshly fetched one and no fetched
//! scramble is ever skipped. An unmatched success simply waits.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::barrier::PairingBarrier;
use crate::command::Command;
use crate::context::SharedContext;
use crate::event::{Action, EventKind};
use crate::id::CommandId;
use crate::mode::Mode;
use crate::pipeline::{Pipeline, PipelineError};

// ---------------------------------------------------------------------------
// Port types
// ---------------------------------------------------------------------------

/// Request verb understood by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestKind {
    GetRandomScramble,
}

/// A request posted to the scramble generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrambleRequest {
    pub command: RequestKind,
    pub command_id: CommandId,
    pub puzzle_kind: String,
}

impl ScrambleRequest {
    pub fn random(command_id: CommandId, puzzle_kind: impl Into<String>) -> Self {
        Self {
            command: RequestKind::GetRandomScramble,
            command_id,
            puzzle_kind: puzzle_kind.into(),
        }
    }
}

/// The generator's answer to exactly one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrambleResponse {
    pub command_id: CommandId,
    /// Raw generator text. Line breaks may be encoded as `<br>`.
    pub scramble: String,
}

/// The generator could not accept a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("scramble generator is gone")]
    Disconnected,
    #[error("scramble generator rejected {command_id}: {reason}")]
    Rejected { command_id: CommandId, reason: String },
}

/// Where scramble requests go. Responses come back on the channel made by
/// [`scramble_channel`], never through this trait.
pub trait ScramblePort {
    fn post(&mut self, request: ScrambleRequest) -> Result<(), PortError>;
}

/// Sending half handed to a port implementation.
pub type ResponseSender = Sender<ScrambleResponse>;

/// Create the response channel shared by a port and the orchestrator.
pub fn scramble_channel() -> (ResponseSender, Receiver<ScrambleResponse>) {
    mpsc::channel()
}

/// Turn generator text into display text.
pub fn normalize_scramble(raw: &str) -> String {
    raw.replace("<br>", "\n")
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Bookkeeping for one outstanding request.
#[derive(Debug, Clone)]
struct PendingFetch {
    puzzle_kind: String,
}

/// A fetched scramble waiting for its advance trigger.
#[derive(Debug, Clone, PartialEq)]
struct Fetched {
    command_id: CommandId,
    scramble: String,
}

/// Why the display should advance.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AdvanceTrigger {
    Startup,
    Finished { at: f64 },
}

/// Fetch flow, advance flow and the barrier joining them.
pub struct ScrambleCoordinator {
    context: SharedContext,
    port: Box<dyn ScramblePort>,
    next_id: CommandId,
    pending: HashMap<CommandId, PendingFetch>,
    barrier: PairingBarrier<Fetched, AdvanceTrigger>,
}

impl ScrambleCoordinator {
    pub fn new(
        context: SharedContext,
        port: Box<dyn ScramblePort>,
        barrier_soft_limit: usize,
    ) -> Self {
        Self {
            context,
            port,
            next_id: CommandId(0),
            pending: HashMap::new(),
            barrier: PairingBarrier::with_soft_limit(barrier_soft_limit),
        }
    }

    /// Requests posted but not yet answered.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    pub fn is_outstanding(&self, id: CommandId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Fetched scrambles still waiting for an advance trigger.
    pub fn unpaired_fetches(&self) -> usize {
        self.barrier.waiting_left()
    }

    /// Advance triggers still waiting for a fetched scramble.
    pub fn unpaired_triggers(&self) -> usize {
        self.barrier.waiting_right()
    }

    fn fetch(&mut self) -> Result<Command, PipelineError> {
        let command_id = self.next_id;
        self.next_id = command_id.next();
        let puzzle_kind = self.context.snapshot().puzzle.scrambler;

        // Responses are only read on pump, so registering after a successful
        // post cannot miss one.
        let request = ScrambleRequest::random(command_id, puzzle_kind.clone());
        self.port.post(request)?;
        self.pending.insert(
            command_id,
            PendingFetch {
                puzzle_kind: puzzle_kind.clone(),
            },
        );

        debug!(%command_id, puzzle_kind = %puzzle_kind, "scramble requested");
        Ok(Command::ScrambleFetchStarted { command_id })
    }

    fn complete(&mut self, response: &ScrambleResponse) -> Result<Command, PipelineError> {
        let pending = self
            .pending
            .remove(&response.command_id)
            .ok_or(PipelineError::UnknownCommandId(response.command_id))?;
        debug!(
            command_id = %response.command_id,
            puzzle_kind = %pending.puzzle_kind,
            outstanding = self.pending.len(),
            "scramble arrived"
        );
        Ok(Command::ScrambleFetchSucceeded {
            command_id: response.command_id,
            scramble: normalize_scramble(&response.scramble),
        })
    }

    fn advance(pair: Option<(Fetched, AdvanceTrigger)>) -> Vec<Command> {
        let Some((fetched, trigger)) = pair else {
            return Vec::new();
        };
        debug!(command_id = %fetched.command_id, ?trigger, "scramble advanced");
        vec![Command::ScrambleAdvance {
            command_id: fetched.command_id,
            scramble: fetched.scramble,
        }]
    }
}

impl Pipeline for ScrambleCoordinator {
    fn name(&self) -> &'static str {
        "scramble-coordinator"
    }

    fn handle(&mut self, action: &Action) -> Result<Vec<Command>, PipelineError> {
        match action {
            Action::Startup => {
                let advanced = Self::advance(self.barrier.push_right(AdvanceTrigger::Startup));
                let mut out = vec![self.fetch()?];
                out.extend(advanced);
                Ok(out)
            }
            Action::Interaction(event) if event.kind == EventKind::Up => {
                match self.context.mode() {
                    Mode::Running => Ok(vec![self.fetch()?]),
                    Mode::Ready => {
                        let trigger = AdvanceTrigger::Finished {
                            at: event.timestamp,
                        };
                        Ok(Self::advance(self.barrier.push_right(trigger)))
                    }
                    _ => Ok(Vec::new()),
                }
            }
            Action::ScrambleResponse(response) => Ok(vec![self.complete(response)?]),
            Action::Command(Command::ScrambleFetchSucceeded {
                command_id,
                scramble,
            }) => {
                let fetched = Fetched {
                    command_id: *command_id,
                    scramble: scramble.clone(),
                };
                Ok(Self::advance(self.barrier.push_left(fetched)))
            }
            _ => Ok(Vec::new()),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
