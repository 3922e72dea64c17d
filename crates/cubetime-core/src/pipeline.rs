//! Sub-pipeline trait and the fault isolation wrapper.
//!
//! Every sub-pipeline is driven through [`Isolated`]. A failure while handling
//! one action (an error *or* a panic) is caught, counted and reported to the
//! `tracing` sink; the pipeline then carries on with the next action and its
//! siblings never notice.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::error;

use crate::command::Command;
use crate::event::Action;
use crate::id::CommandId;
use crate::scramble::PortError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failure while a sub-pipeline handled one action.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The scramble port refused a request.
    #[error("scramble port: {0}")]
    Port(#[from] PortError),

    /// A scramble response arrived for an id that is not outstanding.
    #[error("no outstanding scramble request {0}")]
    UnknownCommandId(CommandId),
}

// ---------------------------------------------------------------------------
// Pipeline trait
// ---------------------------------------------------------------------------

/// One independent consumer of the action stream.
pub trait Pipeline {
    /// Stable name used in logs and fault counters.
    fn name(&self) -> &'static str;

    /// Handle one action and return the commands it produces, in order.
    fn handle(&mut self, action: &Action) -> Result<Vec<Command>, PipelineError>;
}

// ---------------------------------------------------------------------------
// Isolated
// ---------------------------------------------------------------------------

/// Fault boundary around a single sub-pipeline.
#[derive(Debug)]
pub struct Isolated<P> {
    inner: P,
    faults: u64,
}

impl<P: Pipeline> Isolated<P> {
    pub fn new(inner: P) -> Self {
        Self { inner, faults: 0 }
    }

    /// Run the pipeline on one action. Faults yield no commands.
    pub fn handle(&mut self, action: &Action) -> Vec<Command> {
        let name = self.inner.name();
        let inner = &mut self.inner;
        match catch_unwind(AssertUnwindSafe(|| inner.handle(action))) {
            Ok(Ok(commands)) => commands,
            Ok(Err(err)) => {
                self.faults += 1;
                error!(
                    pipeline = name,
                    error = %err,
                    ?action,
                    "pipeline fault, continuing"
                );
                Vec::new()
            }
            Err(payload) => {
                self.faults += 1;
                let message = panic_message(payload.as_ref());
                error!(
                    pipeline = name,
                    panic = %message,
                    ?action,
                    "pipeline panicked, continuing"
                );
                Vec::new()
            }
        }
    }

    /// Faults caught so far.
    pub fn faults(&self) -> u64 {
        self.faults
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
