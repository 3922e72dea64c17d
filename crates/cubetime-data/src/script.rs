//! Scripted sessions for headless playback.
//!
//! A script is a list of steps replayed against a session on a virtual
//! clock. `Wait` advances the clock; the host delivers display frames while
//! it waits.

use std::path::Path;

use serde::{Deserialize, Serialize};

use cubetime_core::context::PuzzleSelection;
use cubetime_core::event::EventKind;

use crate::loader::{DataLoadError, load_file};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Down,
    Up,
    Cancel,
    /// Let this many milliseconds pass.
    Wait(u64),
    SelectPuzzle(PuzzleSelection),
}

impl Step {
    /// The interaction this step delivers, if any.
    pub fn interaction(&self) -> Option<EventKind> {
        match self {
            Step::Down => Some(EventKind::Down),
            Step::Up => Some(EventKind::Up),
            Step::Cancel => Some(EventKind::Cancel),
            Step::Wait(_) | Step::SelectPuzzle(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<Step>,
}

impl SessionScript {
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let script: SessionScript = load_file(path)?;
        if script.steps.is_empty() {
            return Err(DataLoadError::Invalid {
                file: path.to_path_buf(),
                detail: format!("script '{}' has no steps", script.name),
            });
        }
        Ok(script)
    }

    /// Total scripted waiting time.
    pub fn duration_ms(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Wait(ms) => *ms,
                _ => 0,
            })
            .sum()
    }

    /// Steps that deliver an interaction.
    pub fn interactions(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.interaction().is_some())
            .count()
    }
}
