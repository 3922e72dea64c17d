//! Timer configuration.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```ron
//! (
//!     puzzle: (puzzle_id: 1, scrambler: "444"),
//!     clock: realtime,
//!     solves_path: Some("solves.jsonl"),
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cubetime_core::barrier::DEFAULT_BARRIER_SOFT_LIMIT;
use cubetime_core::context::PuzzleSelection;
use cubetime_core::orchestrator::OrchestratorConfig;

use crate::loader::{DataLoadError, load_file, locate};

/// Where ticks and interaction timestamps come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    /// Time advances only as a script says. Runs are reproducible.
    #[default]
    Virtual,
    /// The OS monotonic clock.
    Realtime,
}

const MAX_FRAME_RATE: u32 = 1000;
const CONFIG_STEM: &str = "timer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub puzzle: PuzzleSelection,
    /// Display frames per second delivered while a run is active.
    pub frame_rate: u32,
    pub clock: ClockMode,
    /// Scramble generator seed.
    pub seed: u64,
    pub barrier_soft_limit: usize,
    /// Commands kept for inspection after being applied. 0 = none.
    pub command_history: usize,
    /// JSON-lines solve log. `None` keeps solves in memory only.
    pub solves_path: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            puzzle: PuzzleSelection::default(),
            frame_rate: 60,
            clock: ClockMode::Virtual,
            seed: 0,
            barrier_soft_limit: DEFAULT_BARRIER_SOFT_LIMIT,
            command_history: 0,
            solves_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl TimerConfig {
    /// Load and validate a config file (RON, TOML or JSON).
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let config: TimerConfig = load_file(path)?;
        config.validate().map_err(|detail| DataLoadError::Invalid {
            file: path.to_path_buf(),
            detail,
        })?;
        Ok(config)
    }

    /// Load `timer.{ron,toml,json}` from `dir`, or the defaults if there is
    /// none.
    pub fn discover(dir: &Path) -> Result<Self, DataLoadError> {
        match locate(dir, CONFIG_STEM)? {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.frame_rate == 0 || self.frame_rate > MAX_FRAME_RATE {
            return Err(format!(
                "frame_rate must be in 1..={MAX_FRAME_RATE}, got {}",
                self.frame_rate
            ));
        }
        if self.barrier_soft_limit == 0 {
            return Err("barrier_soft_limit must be at least 1".to_string());
        }
        if self.puzzle.scrambler.is_empty() {
            return Err("puzzle.scrambler must not be empty".to_string());
        }
        Ok(())
    }

    /// Milliseconds between display frames.
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.frame_rate.max(1))
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            barrier_soft_limit: self.barrier_soft_limit,
            command_history: self.command_history,
        }
    }
}
