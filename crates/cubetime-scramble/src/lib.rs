//! Reference scramble ports for the cubetime core.
//!
//! - [`generator::Generator`] -- seeded random-move scrambles for cubes
//!   2x2x2 to 7x7x7, pyraminx, skewb and megaminx.
//! - [`inline::InlineScrambler`] -- answers on the calling thread; optional
//!   batching reverses arrival order to exercise id correlation.
//! - [`worker::ScrambleWorker`] -- answers from a dedicated thread.
//!
//! Both ports answer through the channel made by
//! [`cubetime_core::scramble::scramble_channel`].

pub mod generator;
pub mod inline;
pub mod rng;
pub mod worker;

pub use generator::{Generator, PuzzleKind, ScrambleError};
pub use inline::InlineScrambler;
pub use worker::ScrambleWorker;
