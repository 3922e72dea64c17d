//! Host glue: a [`TimerStore`] and an [`Orchestrator`] wired together.
//!
//! Each host call follows the same order: reduce the interaction into the
//! store, dispatch to the orchestrator, then apply every drained command to
//! the store. Sub-pipelines therefore always read the post-interaction mode.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::command::Command;
use crate::context::{PuzzleSelection, SharedContext, TimerContext, TimerSnapshot};
use crate::event::InteractionEvent;
use crate::orchestrator::{FaultCounts, Orchestrator, OrchestratorConfig, OrchestratorError, Ports};
use crate::store::TimerStore;

pub struct Session {
    store: Rc<RefCell<TimerStore>>,
    orchestrator: Orchestrator,
    applied: Vec<Command>,
    keep_applied: bool,
}

impl Session {
    pub fn new(puzzle: PuzzleSelection, ports: Ports, config: OrchestratorConfig) -> Self {
        let keep_applied = config.command_history > 0;
        let store = Rc::new(RefCell::new(TimerStore::new(puzzle)));
        let context: SharedContext = store.clone();
        Self {
            orchestrator: Orchestrator::new(context, ports, config),
            store,
            applied: Vec::new(),
            keep_applied,
        }
    }

    pub fn start(&mut self) -> Result<(), OrchestratorError> {
        self.orchestrator.start()?;
        self.apply_drained();
        Ok(())
    }

    pub fn interact(&mut self, event: InteractionEvent) {
        self.store.borrow_mut().apply_interaction(&event);
        self.orchestrator.interact(event);
        self.apply_drained();
    }

    pub fn frame(&mut self) {
        self.orchestrator.frame();
        self.apply_drained();
    }

    /// Deliver waiting scramble responses. Returns how many arrived.
    pub fn pump(&mut self) -> usize {
        let delivered = self.orchestrator.pump();
        self.apply_drained();
        delivered
    }

    pub fn wants_frame(&self) -> bool {
        self.orchestrator.wants_frame()
    }

    /// Takes effect for the next fetch.
    pub fn select_puzzle(&mut self, puzzle: PuzzleSelection) {
        self.store.borrow_mut().select_puzzle(puzzle);
    }

    pub fn store(&self) -> Ref<'_, TimerStore> {
        self.store.borrow()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.store.borrow().snapshot()
    }

    /// Commands applied to the store so far. Empty unless the config asked
    /// for command history.
    pub fn commands(&self) -> &[Command] {
        &self.applied
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn faults(&self) -> FaultCounts {
        self.orchestrator.faults()
    }

    fn apply_drained(&mut self) {
        let commands = self.orchestrator.drain_commands();
        let mut store = self.store.borrow_mut();
        for command in &commands {
            store.apply(command);
        }
        if self.keep_applied {
            self.applied.extend(commands);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::scramble::scramble_channel;
    use crate::test_utils::*;
    use crate::tick::VirtualClock;

    fn session(clock: Rc<VirtualClock>) -> (Session, ScriptedPort, MemorySolves) {
        let (tx, rx) = scramble_channel();
        let port = ScriptedPort::with_sender(tx);
        let solves = MemorySolves::new();
        let ports = Ports {
            clock: Box::new(clock),
            solves: Box::new(solves.clone()),
            scrambles: Box::new(port.clone()),
            responses: rx,
        };
        let config = OrchestratorConfig {
            command_history: 64,
            ..Default::default()
        };
        (
            Session::new(PuzzleSelection::default(), ports, config),
            port,
            solves,
        )
    }

    #[test]
    fn store_tracks_a_full_run() {
        let clock = Rc::new(VirtualClock::new(0.0));
        let (mut session, port, solves) = session(clock.clone());
        session.start().unwrap();
        port.respond(crate::id::CommandId(0), "R U");
        session.pump();
        assert_eq!(session.snapshot().scramble.as_deref(), Some("R U"));

        session.interact(InteractionEvent::down(100.0));
        session.interact(InteractionEvent::up(200.0));
        assert_eq!(session.store().mode(), Mode::Running);
        assert!(session.wants_frame());

        clock.set(260.0);
        session.frame();
        assert_eq!(session.store().time().elapsed_ms, 60.0);

        session.interact(InteractionEvent::down(1_200.0));
        assert!(!session.wants_frame());
        session.interact(InteractionEvent::up(1_300.0));

        assert_eq!(session.store().mode(), Mode::Ready);
        let solves = solves.solves();
        assert_eq!(solves.len(), 1);
        assert_eq!(solves[0].elapsed_ms, 1_000.0);
        assert_eq!(solves[0].scramble.as_deref(), Some("R U"));
        assert!(!session.commands().is_empty());
    }

    #[test]
    fn selected_puzzle_is_used_for_the_next_fetch() {
        let (mut session, port, _solves) = session(Rc::new(VirtualClock::new(0.0)));
        session.select_puzzle(PuzzleSelection {
            puzzle_id: crate::id::PuzzleId(4),
            category: "normal".into(),
            scrambler: "pyram".into(),
        });
        session.start().unwrap();
        assert_eq!(port.requests()[0].puzzle_kind, "pyram");
    }
}
