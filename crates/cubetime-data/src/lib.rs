//! Data files for the cubetime timer: configuration, session scripts and the
//! on-disk solve log.

pub mod config;
pub mod loader;
pub mod script;
pub mod solve_log;

pub use config::{ClockMode, TimerConfig};
pub use loader::{DataLoadError, Format};
pub use script::{SessionScript, Step};
pub use solve_log::{SolveLog, SolveLogError};
