//! Composition root: merges the sub-pipelines into one command stream.
//!
//! # Delivery
//!
//! Every action is offered to every sub-pipeline, in a fixed order, through
//! its fault boundary. Each command a sub-pipeline emits is appended to the
//! outgoing queue and fed back into the same work loop as
//! [`Action::Command`], so the tick scheduler sees `Start`/`Stop` and the
//! advance flow sees fetch successes. Actions are processed FIFO; the outgoing
//! stream keeps each sub-pipeline's emission order.
//!
//! Nothing here blocks. Scramble responses produced on another thread wait in
//! a channel until the host calls [`Orchestrator::pump`].

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::{debug, warn};

use crate::barrier::DEFAULT_BARRIER_SOFT_LIMIT;
use crate::command::{Command, CommandQueue};
use crate::context::SharedContext;
use crate::event::{Action, InteractionEvent};
use crate::mode::ModeTransitions;
use crate::pipeline::Isolated;
use crate::scramble::{ScrambleCoordinator, ScramblePort, ScrambleResponse};
use crate::solve::{SolveRecorder, SolveSink};
use crate::tick::{Clock, TickScheduler};

/// Errors from driving the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestratorError {
    #[error("orchestrator already started")]
    AlreadyStarted,
}

/// External collaborators the orchestrator talks to.
pub struct Ports {
    pub clock: Box<dyn Clock>,
    pub solves: Box<dyn SolveSink>,
    pub scrambles: Box<dyn ScramblePort>,
    /// Receiving half of [`crate::scramble::scramble_channel`].
    pub responses: Receiver<ScrambleResponse>,
}

/// Tuning knobs.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Waiting elements per side of the fetch/advance barrier before a
    /// warning. Nothing is ever dropped.
    pub barrier_soft_limit: usize,
    /// Drained commands kept for inspection. 0 = none.
    pub command_history: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            barrier_soft_limit: DEFAULT_BARRIER_SOFT_LIMIT,
            command_history: 0,
        }
    }
}

/// Fault counters per sub-pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultCounts {
    pub transitions: u64,
    pub ticks: u64,
    pub recorder: u64,
    pub scrambles: u64,
}

impl FaultCounts {
    pub fn total(&self) -> u64 {
        self.transitions + self.ticks + self.recorder + self.scrambles
    }
}

/// Owns the sub-pipelines and the merged outgoing stream.
pub struct Orchestrator {
    transitions: Isolated<ModeTransitions>,
    ticks: Isolated<TickScheduler>,
    recorder: Isolated<SolveRecorder>,
    scrambles: Isolated<ScrambleCoordinator>,
    responses: Receiver<ScrambleResponse>,
    responses_closed: bool,
    outgoing: CommandQueue,
    started: bool,
}

impl Orchestrator {
    pub fn new(context: SharedContext, ports: Ports, config: OrchestratorConfig) -> Self {
        let Ports {
            clock,
            solves,
            scrambles,
            responses,
        } = ports;
        Self {
            transitions: Isolated::new(ModeTransitions::new(context.clone())),
            ticks: Isolated::new(TickScheduler::new(clock)),
            recorder: Isolated::new(SolveRecorder::new(context.clone(), solves)),
            scrambles: Isolated::new(ScrambleCoordinator::new(
                context,
                scrambles,
                config.barrier_soft_limit,
            )),
            responses,
            responses_closed: false,
            outgoing: CommandQueue::with_max_history(config.command_history),
            started: false,
        }
    }

    /// Deliver the startup signal. Allowed once.
    pub fn start(&mut self) -> Result<(), OrchestratorError> {
        if self.started {
            return Err(OrchestratorError::AlreadyStarted);
        }
        self.started = true;
        debug!("orchestrator started");
        self.dispatch(Action::Startup);
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Deliver an interaction from the input layer.
    pub fn interact(&mut self, event: InteractionEvent) {
        self.dispatch(Action::Interaction(event));
    }

    /// Deliver the host's display-frame callback.
    pub fn frame(&mut self) {
        self.dispatch(Action::Frame);
    }

    /// Whether a run is active and the host should keep delivering frames.
    pub fn wants_frame(&self) -> bool {
        self.ticks.inner().wants_frame()
    }

    /// Deliver every scramble response already waiting. Never blocks.
    /// Returns how many were delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            match self.responses.try_recv() {
                Ok(response) => {
                    self.dispatch(Action::ScrambleResponse(response));
                    delivered += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.responses_closed {
                        self.responses_closed = true;
                        warn!(
                            outstanding = self.scrambles.inner().outstanding(),
                            "scramble response channel closed"
                        );
                    }
                    break;
                }
            }
        }
        delivered
    }

    /// Run one action, and everything it causes, through the pipelines.
    pub fn dispatch(&mut self, action: Action) {
        let mut work = VecDeque::from([action]);
        while let Some(action) = work.pop_front() {
            let mut emitted = self.transitions.handle(&action);
            emitted.extend(self.ticks.handle(&action));
            emitted.extend(self.recorder.handle(&action));
            emitted.extend(self.scrambles.handle(&action));

            for command in emitted {
                work.push_back(Action::Command(command.clone()));
                self.outgoing.push(command);
            }
        }
    }

    /// Hand the merged commands to the store, in emission order.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        self.outgoing.drain()
    }

    /// Drained commands retained per [`OrchestratorConfig::command_history`].
    pub fn command_history(&self) -> impl ExactSizeIterator<Item = &(u64, Command)> {
        self.outgoing.history()
    }

    pub fn faults(&self) -> FaultCounts {
        FaultCounts {
            transitions: self.transitions.faults(),
            ticks: self.ticks.faults(),
            recorder: self.recorder.faults(),
            scrambles: self.scrambles.faults(),
        }
    }

    pub fn solves_recorded(&self) -> u64 {
        self.recorder.inner().recorded()
    }

    pub fn scrambles(&self) -> &ScrambleCoordinator {
        self.scrambles.inner()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::CommandId;
    use crate::mode::Mode;
    use crate::scramble::scramble_channel;
    use crate::test_utils::*;
    use std::rc::Rc;

    struct Rig {
        context: FixedContext,
        port: ScriptedPort,
        solves: MemorySolves,
        orchestrator: Orchestrator,
    }

    fn rig(mode: Mode) -> Rig {
        let context = FixedContext::new(mode);
        let (tx, rx) = scramble_channel();
        let port = ScriptedPort::with_sender(tx);
        let solves = MemorySolves::new();
        let ports = Ports {
            clock: Box::new(Rc::new(crate::tick::VirtualClock::new(0.0))),
            solves: Box::new(solves.clone()),
            scrambles: Box::new(port.clone()),
            responses: rx,
        };
        let orchestrator =
            Orchestrator::new(context.shared(), ports, OrchestratorConfig::default());
        Rig {
            context,
            port,
            solves,
            orchestrator,
        }
    }

    #[test]
    fn start_only_once() {
        let mut rig = rig(Mode::Idle);
        rig.orchestrator.start().unwrap();
        assert_eq!(
            rig.orchestrator.start(),
            Err(OrchestratorError::AlreadyStarted)
        );
        assert_eq!(rig.port.requests().len(), 1);
    }

    #[test]
    fn start_command_feeds_back_into_tick_scheduler() {
        let mut rig = rig(Mode::Running);
        rig.orchestrator.interact(InteractionEvent::up(100.0));
        assert!(rig.orchestrator.wants_frame());

        rig.orchestrator.frame();
        let labels: Vec<&str> = rig
            .orchestrator
            .drain_commands()
            .iter()
            .map(Command::label)
            .collect();
        // Up while running: start, then a new scramble fetch, then a tick.
        assert_eq!(labels, vec!["start", "fetch-started", "tick"]);
    }

    #[test]
    fn pump_delivers_waiting_responses() {
        let mut rig = rig(Mode::Idle);
        rig.orchestrator.start().unwrap();
        rig.orchestrator.drain_commands();

        rig.port.respond(CommandId(0), "F2 U'");
        assert_eq!(rig.orchestrator.pump(), 1);
        assert_eq!(rig.orchestrator.pump(), 0);

        let commands = rig.orchestrator.drain_commands();
        assert_eq!(
            commands.last(),
            Some(&Command::ScrambleAdvance {
                command_id: CommandId(0),
                scramble: "F2 U'".into()
            })
        );
    }

    #[test]
    fn closed_channel_is_not_fatal() {
        let context = FixedContext::new(Mode::Idle);
        let (tx, rx) = scramble_channel();
        drop(tx);
        let ports = Ports {
            clock: Box::new(crate::tick::MonotonicClock::new()),
            solves: Box::new(MemorySolves::new()),
            scrambles: Box::new(ScriptedPort::new()),
            responses: rx,
        };
        let mut orchestrator =
            Orchestrator::new(context.shared(), ports, OrchestratorConfig::default());
        assert_eq!(orchestrator.pump(), 0);
        assert_eq!(orchestrator.pump(), 0);
    }

    #[test]
    fn history_is_kept_when_configured() {
        let context = FixedContext::new(Mode::Running);
        let (_tx, rx) = scramble_channel();
        let ports = Ports {
            clock: Box::new(crate::tick::MonotonicClock::new()),
            solves: Box::new(MemorySolves::new()),
            scrambles: Box::new(ScriptedPort::new()),
            responses: rx,
        };
        let config = OrchestratorConfig {
            command_history: 16,
            ..Default::default()
        };
        let mut orchestrator = Orchestrator::new(context.shared(), ports, config);
        orchestrator.interact(InteractionEvent::up(1.0));
        orchestrator.drain_commands();
        assert_eq!(orchestrator.command_history().len(), 2);
    }

    #[test]
    fn recorder_sees_ready_up_once() {
        let mut rig = rig(Mode::Ready);
        rig.context.set_run(0.0, 500.0);
        rig.orchestrator.interact(InteractionEvent::up(600.0));
        assert_eq!(rig.solves.solves().len(), 1);
        assert_eq!(rig.orchestrator.solves_recorded(), 1);
        assert_eq!(rig.orchestrator.faults().total(), 0);
    }
}
