//! Completed-run records and the recorder that persists them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::command::Command;
use crate::context::SharedContext;
use crate::event::{Action, EventKind};
use crate::id::PuzzleId;
use crate::mode::Mode;
use crate::pipeline::{Pipeline, PipelineError};

/// One completed timing run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solve {
    pub puzzle_id: PuzzleId,
    pub category: String,
    pub elapsed_ms: f64,
    pub stopped_at: f64,
    /// The scramble that was displayed for this run, if one had arrived.
    pub scramble: Option<String>,
}

/// Persistence port. Fire-and-forget: failures are the sink's own business.
pub trait SolveSink {
    fn add(&mut self, solve: Solve);
}

/// Builds a [`Solve`] when the finger lifts after a finished run.
///
/// Produces no commands. Exactly-once holds because each interaction is
/// delivered to this pipeline once, not because the sink deduplicates.
pub struct SolveRecorder {
    context: SharedContext,
    sink: Box<dyn SolveSink>,
    recorded: u64,
}

impl SolveRecorder {
    pub fn new(context: SharedContext, sink: Box<dyn SolveSink>) -> Self {
        Self {
            context,
            sink,
            recorded: 0,
        }
    }

    /// Solves handed to the sink so far.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }
}

impl Pipeline for SolveRecorder {
    fn name(&self) -> &'static str {
        "solve-recorder"
    }

    fn handle(&mut self, action: &Action) -> Result<Vec<Command>, PipelineError> {
        if action.interaction(EventKind::Up).is_none() {
            return Ok(Vec::new());
        }
        let snapshot = self.context.snapshot();
        if snapshot.mode != Mode::Ready {
            return Ok(Vec::new());
        }
        // Cancel while holding, then release: Ready without a finished run.
        let Some(stopped_at) = snapshot.stopped_at else {
            debug!("release in ready without a stopped run, nothing recorded");
            return Ok(Vec::new());
        };

        let solve = Solve {
            puzzle_id: snapshot.puzzle.puzzle_id,
            category: snapshot.puzzle.category,
            elapsed_ms: snapshot.elapsed_ms,
            stopped_at,
            scramble: snapshot.scramble,
        };
        info!(
            elapsed_ms = solve.elapsed_ms,
            puzzle = solve.puzzle_id.0,
            category = %solve.category,
            "solve recorded"
        );
        self.sink.add(solve);
        self.recorded += 1;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InteractionEvent;
    use crate::test_utils::*;
    use tracing_test::traced_test;

    #[test]
    fn up_while_ready_records_one_solve() {
        let context = FixedContext::new(Mode::Ready);
        context.set_run(1000.0, 13_450.0);
        context.set_scramble("R U R' U'");
        let sink = MemorySolves::new();
        let mut recorder = SolveRecorder::new(context.shared(), Box::new(sink.clone()));

        let out = recorder
            .handle(&Action::Interaction(InteractionEvent::up(13_600.0)))
            .unwrap();

        assert!(out.is_empty());
        let solves = sink.solves();
        assert_eq!(solves.len(), 1);
        assert_eq!(solves[0].elapsed_ms, 12_450.0);
        assert_eq!(solves[0].stopped_at, 13_450.0);
        assert_eq!(solves[0].scramble.as_deref(), Some("R U R' U'"));
        assert_eq!(recorder.recorded(), 1);
    }

    #[test]
    fn other_modes_and_events_record_nothing() {
        let context = FixedContext::new(Mode::Running);
        context.set_run(0.0, 10.0);
        let sink = MemorySolves::new();
        let mut recorder = SolveRecorder::new(context.shared(), Box::new(sink.clone()));

        recorder
            .handle(&Action::Interaction(InteractionEvent::up(1.0)))
            .unwrap();
        context.set_mode(Mode::Ready);
        recorder
            .handle(&Action::Interaction(InteractionEvent::cancel(2.0)))
            .unwrap();
        recorder
            .handle(&Action::Interaction(InteractionEvent::down(3.0)))
            .unwrap();
        recorder.handle(&Action::Frame).unwrap();

        assert!(sink.solves().is_empty());
    }

    #[test]
    #[traced_test]
    fn ready_without_stop_is_skipped_quietly() {
        let context = FixedContext::new(Mode::Ready);
        let sink = MemorySolves::new();
        let mut recorder = SolveRecorder::new(context.shared(), Box::new(sink.clone()));

        let out = recorder
            .handle(&Action::Interaction(InteractionEvent::up(1.0)))
            .unwrap();
        assert!(out.is_empty());
        assert!(sink.solves().is_empty());
        assert_eq!(recorder.recorded(), 0);
        assert!(logs_contain("nothing recorded"));
    }

    #[test]
    fn solve_serializes_with_field_names() {
        let solve = Solve {
            puzzle_id: PuzzleId(2),
            category: "OH".into(),
            elapsed_ms: 25_010.0,
            stopped_at: 90_000.0,
            scramble: None,
        };
        let json = serde_json::to_value(&solve).unwrap();
        assert_eq!(json["puzzle_id"], 2);
        assert_eq!(json["category"], "OH");
        assert!(json["scramble"].is_null());
    }
}
