//! Replays a [`SessionScript`] against a full session.
//!
//! With a virtual clock the run is fully deterministic: interactions are
//! stamped with scripted time, scrambles come from the seeded in-thread
//! generator, and two runs of one script produce the same fingerprint. A
//! realtime clock sleeps through waits and takes scrambles from the worker
//! thread.

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info};

use cubetime_core::command::Command;
use cubetime_core::event::InteractionEvent;
use cubetime_core::orchestrator::{FaultCounts, Ports};
use cubetime_core::scramble::{ScramblePort, scramble_channel};
use cubetime_core::session::Session;
use cubetime_core::solve::{Solve, SolveSink};
use cubetime_core::tick::{Clock, MonotonicClock, VirtualClock};
use cubetime_data::{ClockMode, SessionScript, SolveLog, Step, TimerConfig};
use cubetime_scramble::{InlineScrambler, ScrambleWorker};
use cubetime_stats::{SessionStats, Summary};

use crate::error::DemoError;

// ---------------------------------------------------------------------------
// Clock and sink adapters
// ---------------------------------------------------------------------------

enum ScriptClock {
    Virtual(Rc<VirtualClock>),
    Realtime(MonotonicClock),
}

impl ScriptClock {
    fn new(mode: ClockMode) -> Self {
        match mode {
            ClockMode::Virtual => ScriptClock::Virtual(Rc::new(VirtualClock::new(0.0))),
            ClockMode::Realtime => ScriptClock::Realtime(MonotonicClock::new()),
        }
    }

    fn now_ms(&self) -> f64 {
        match self {
            ScriptClock::Virtual(clock) => clock.now_ms(),
            ScriptClock::Realtime(clock) => clock.now_ms(),
        }
    }

    /// The clock handed to the tick scheduler. Shares time with `self`.
    fn boxed(&self) -> Box<dyn Clock> {
        match self {
            ScriptClock::Virtual(clock) => Box::new(clock.clone()),
            ScriptClock::Realtime(clock) => Box::new(*clock),
        }
    }

    fn pass(&self, ms: f64) {
        match self {
            ScriptClock::Virtual(clock) => clock.advance(ms),
            ScriptClock::Realtime(_) => std::thread::sleep(Duration::from_secs_f64(ms / 1000.0)),
        }
    }
}

/// Keeps every solve for the report and forwards it to the log, if any.
struct RecordingSink {
    solves: Rc<RefCell<Vec<Solve>>>,
    log: Option<SolveLog>,
}

impl SolveSink for RecordingSink {
    fn add(&mut self, solve: Solve) {
        if let Some(log) = self.log.as_mut() {
            log.add(solve.clone());
        }
        self.solves.borrow_mut().push(solve);
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of one scripted session.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub script: String,
    pub solves: Vec<Solve>,
    pub summary: Summary,
    /// Commands applied to the store.
    pub commands: usize,
    pub ticks: usize,
    pub faults: FaultCounts,
    pub final_scramble: Option<String>,
    /// Clock reading when the script ended.
    pub clock_ms: f64,
    /// Hash of the applied command stream and the recorded solves.
    pub fingerprint: u64,
}

fn fingerprint(commands: &[Command], solves: &[Solve]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for command in commands {
        format!("{command:?}").hash(&mut hasher);
    }
    for solve in solves {
        solve.elapsed_ms.to_bits().hash(&mut hasher);
        solve.scramble.hash(&mut hasher);
    }
    hasher.finish()
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct ScriptRunner {
    config: TimerConfig,
}

impl ScriptRunner {
    pub fn new(config: TimerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Play `script` from a fresh session.
    pub fn run(&self, script: &SessionScript) -> Result<RunReport, DemoError> {
        let clock = ScriptClock::new(self.config.clock);
        let (tx, rx) = scramble_channel();
        let scrambles: Box<dyn ScramblePort> = match self.config.clock {
            ClockMode::Virtual => Box::new(InlineScrambler::new(self.config.seed, tx)),
            ClockMode::Realtime => Box::new(ScrambleWorker::spawn(self.config.seed, tx)?),
        };
        let solves = Rc::new(RefCell::new(Vec::new()));
        let log = self
            .config
            .solves_path
            .as_ref()
            .map(|path| SolveLog::open(path.clone()))
            .transpose()?;
        let ports = Ports {
            clock: clock.boxed(),
            solves: Box::new(RecordingSink {
                solves: solves.clone(),
                log,
            }),
            scrambles,
            responses: rx,
        };

        // The report needs the applied stream.
        let mut orchestrator = self.config.orchestrator();
        orchestrator.command_history = orchestrator.command_history.max(1);
        let mut session = Session::new(self.config.puzzle.clone(), ports, orchestrator);

        info!(script = %script.name, steps = script.steps.len(), "session started");
        session.start()?;
        session.pump();

        let interval = self.config.frame_interval_ms();
        for step in &script.steps {
            if let Some(kind) = step.interaction() {
                session.interact(InteractionEvent::new(kind, clock.now_ms()));
                session.pump();
                continue;
            }
            match step {
                Step::Wait(ms) => Self::wait(&mut session, &clock, *ms as f64, interval),
                Step::SelectPuzzle(puzzle) => {
                    debug!(scrambler = %puzzle.scrambler, "puzzle selected");
                    session.select_puzzle(puzzle.clone());
                }
                _ => {}
            }
        }
        session.pump();

        let solves = solves.borrow().clone();
        let commands = session.commands();
        let report = RunReport {
            script: script.name.clone(),
            summary: SessionStats::from_solves(&solves).summary(),
            commands: commands.len(),
            ticks: commands
                .iter()
                .filter(|c| matches!(c, Command::Tick(_)))
                .count(),
            faults: session.faults(),
            final_scramble: session.snapshot().scramble,
            clock_ms: clock.now_ms(),
            fingerprint: fingerprint(commands, &solves),
            solves,
        };
        info!(
            script = %report.script,
            solves = report.solves.len(),
            faults = report.faults.total(),
            "session finished"
        );
        Ok(report)
    }

    /// Let `ms` pass, delivering a frame per interval while a run wants one.
    fn wait(session: &mut Session, clock: &ScriptClock, ms: f64, interval: f64) {
        let mut remaining = ms;
        while remaining > 0.0 {
            let step = interval.min(remaining);
            clock.pass(step);
            remaining -= step;
            if session.wants_frame() {
                session.frame();
            }
            session.pump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(steps: Vec<Step>) -> SessionScript {
        SessionScript {
            name: "test".into(),
            description: String::new(),
            steps,
        }
    }

    fn solve_steps(inspect: u64, solve: u64) -> Vec<Step> {
        vec![
            Step::Down,
            Step::Wait(inspect),
            Step::Up,
            Step::Wait(solve),
            Step::Down,
            Step::Wait(100),
            Step::Up,
        ]
    }

    #[test]
    fn scripted_solve_is_timed_by_the_virtual_clock() {
        let runner = ScriptRunner::new(TimerConfig::default());
        let report = runner.run(&script(solve_steps(500, 10_000))).unwrap();

        assert_eq!(report.solves.len(), 1);
        assert!((report.solves[0].elapsed_ms - 10_000.0).abs() < 1e-6);
        assert!(report.solves[0].scramble.is_some());
        assert_eq!(report.faults.total(), 0);
        // 60 Hz for ten seconds.
        assert!((599..=601).contains(&report.ticks), "{} ticks", report.ticks);
    }

    #[test]
    fn same_script_same_fingerprint() {
        let runner = ScriptRunner::new(TimerConfig {
            seed: 11,
            ..Default::default()
        });
        let steps = [solve_steps(300, 8_000), solve_steps(300, 9_000)].concat();
        let a = runner.run(&script(steps.clone())).unwrap();
        let b = runner.run(&script(steps)).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);

        let other = ScriptRunner::new(TimerConfig {
            seed: 12,
            ..Default::default()
        });
        let c = other.run(&script(solve_steps(300, 8_000))).unwrap();
        assert_ne!(a.fingerprint, c.fingerprint);
    }
}
