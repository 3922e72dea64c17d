//! Frame-paced tick emission.
//!
//! The host calls back once per display frame ([`Action::Frame`]). While a
//! run is active each frame yields one [`Tick`] stamped with the clock sampled
//! at emission time, so consumers compute elapsed time by subtraction.
//!
//! A run's tick stream lives in a single slot: observing `Start` puts a new
//! stream there (superseding any previous one), observing `Stop` takes it out.
//! Once taken, no later frame can produce a tick for that run.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::command::{Command, Tick, TimingCommand};
use crate::event::Action;
use crate::id::RunId;
use crate::pipeline::{Pipeline, PipelineError};

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// High-resolution time source, in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Milliseconds since construction, from the OS monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to. Share it with `Rc`.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<f64>,
}

impl VirtualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

// ---------------------------------------------------------------------------
// TickScheduler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct TickStream {
    run: RunId,
    started_at: f64,
    emitted: u64,
}

/// Emits one tick per frame for the active run, if any.
pub struct TickScheduler {
    clock: Box<dyn Clock>,
    active: Option<TickStream>,
    next_run: u64,
}

impl TickScheduler {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            active: None,
            next_run: 0,
        }
    }

    /// Whether the host should keep delivering frames.
    pub fn wants_frame(&self) -> bool {
        self.active.is_some()
    }

    /// The active run, if a tick stream is open.
    pub fn active_run(&self) -> Option<RunId> {
        self.active.map(|stream| stream.run)
    }

    fn open(&mut self, started_at: f64) {
        let run = RunId(self.next_run);
        self.next_run += 1;
        let previous = self.active.replace(TickStream {
            run,
            started_at,
            emitted: 0,
        });
        if let Some(previous) = previous {
            debug!(superseded = previous.run.0, run = run.0, "tick stream superseded");
        } else {
            debug!(run = run.0, started_at, "tick stream opened");
        }
    }

    fn close(&mut self, reason: &'static str) {
        if let Some(stream) = self.active.take() {
            debug!(
                run = stream.run.0,
                ticks = stream.emitted,
                started_at = stream.started_at,
                reason,
                "tick stream closed"
            );
        }
    }
}

impl Pipeline for TickScheduler {
    fn name(&self) -> &'static str {
        "tick-scheduler"
    }

    fn handle(&mut self, action: &Action) -> Result<Vec<Command>, PipelineError> {
        match action {
            Action::Command(Command::Timing(TimingCommand::Start { timestamp })) => {
                self.open(*timestamp);
                Ok(Vec::new())
            }
            Action::Command(Command::Timing(TimingCommand::Stop { .. })) => {
                self.close("stop");
                Ok(Vec::new())
            }
            Action::Command(Command::Timing(TimingCommand::Reset { .. })) => {
                self.close("reset");
                Ok(Vec::new())
            }
            Action::Frame => {
                let Some(stream) = self.active.as_mut() else {
                    return Ok(Vec::new());
                };
                let timestamp = self.clock.now_ms();
                stream.emitted += 1;
                trace!(run = stream.run.0, timestamp, "tick");
                Ok(vec![Command::Tick(Tick { timestamp })])
            }
            _ => Ok(Vec::new()),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
