//! Headless demo for the cubetime core.
//!
//! Loads a session manifest and its scripts, replays each script against a
//! full [`cubetime_core::session::Session`] frame by frame, and reports the
//! solves, statistics and a fingerprint of the command stream.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cubetime_demo::{ScriptRunner, load_manifest};
//!
//! let manifest = load_manifest(dir)?;
//! let runner = ScriptRunner::new(manifest.load_config(dir)?);
//! let report = runner.run(&manifest.load_script(dir, "single_solve")?)?;
//! println!("{}", report.fingerprint);
//! ```

pub mod error;
pub mod manifest;
pub mod runner;

pub use error::DemoError;
pub use manifest::{SessionEntry, SessionManifest, load_manifest};
pub use runner::{RunReport, ScriptRunner};
