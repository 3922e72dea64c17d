//! Cubetime Core -- the reactive orchestration core of a speedcubing timer.
//!
//! The host pushes interactions (finger down, finger up, cancel), display
//! frames and scramble responses in; the core pushes [`command::Command`]s
//! out for the state store to apply. Everything runs on one thread and
//! nothing blocks.
//!
//! # Sub-pipelines
//!
//! Each action is offered, in order, to four independent sub-pipelines:
//!
//! 1. **Mode transitions** -- interaction + current mode to `Start`, `Stop`
//!    or `Reset`.
//! 2. **Tick scheduler** -- one `Tick` per frame between `Start` and `Stop`.
//! 3. **Solve recorder** -- persists a [`solve::Solve`] when a finished run
//!    is acknowledged.
//! 4. **Scramble coordinator** -- correlates generator responses by
//!    [`id::CommandId`] and pairs them with advance triggers through a
//!    [`barrier::PairingBarrier`].
//!
//! Each runs behind a [`pipeline::Isolated`] fault boundary: an error or a
//! panic in one is logged and counted, and the others keep working.
//!
//! # Key Types
//!
//! - [`orchestrator::Orchestrator`] -- composition root and merged stream.
//! - [`session::Session`] -- orchestrator plus [`store::TimerStore`], wired
//!   the way a UI host does it.
//! - [`context::TimerContext`] -- read-only store access for sub-pipelines.
//! - [`scramble::ScramblePort`] / [`solve::SolveSink`] -- external ports.
//! - [`tick::Clock`] -- monotonic or virtual time source.

pub mod barrier;
pub mod command;
pub mod context;
pub mod event;
pub mod id;
pub mod mode;
pub mod orchestrator;
pub mod pipeline;
pub mod scramble;
pub mod session;
pub mod solve;
pub mod store;
pub mod tick;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
