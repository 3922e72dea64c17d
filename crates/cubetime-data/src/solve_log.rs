//! Append-only solve log.
//!
//! One JSON object per line:
//!
//! ```text
//! {"puzzle_id":0,"category":"normal","elapsed_ms":12450.0,"stopped_at":13450.0,"scramble":"R U"}
//! ```
//!
//! As a [`SolveSink`] the log is fire-and-forget: a failed write is logged
//! and counted here and never reaches the core.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use cubetime_core::solve::{Solve, SolveSink};

#[derive(Debug, thiserror::Error)]
pub enum SolveLogError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt record on line {line} of {file}: {source}")]
    Corrupt {
        file: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

pub type Result<T> = core::result::Result<T, SolveLogError>;

/// JSON-lines file of [`Solve`] records.
#[derive(Debug)]
pub struct SolveLog {
    path: PathBuf,
    written: u64,
    failed: u64,
}

impl SolveLog {
    /// Open (creating if needed) the log at `path`, and its parent directory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(path = %path.display(), "solve log opened");
        Ok(Self {
            path,
            written: 0,
            failed: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn append(&self, solve: &Solve) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut line = serde_json::to_string(solve)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Every record in the file, oldest first. Blank lines are skipped.
    pub fn load(&self) -> Result<Vec<Solve>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut solves = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let solve = serde_json::from_str(&line).map_err(|source| SolveLogError::Corrupt {
                file: self.path.clone(),
                line: i + 1,
                source,
            })?;
            solves.push(solve);
        }
        Ok(solves)
    }

    /// Records written through [`SolveSink::add`] since opening.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Records [`SolveSink::add`] failed to write.
    pub fn failed(&self) -> u64 {
        self.failed
    }
}

impl SolveSink for SolveLog {
    fn add(&mut self, solve: Solve) {
        match self.append(&solve) {
            Ok(()) => self.written += 1,
            Err(err) => {
                self.failed += 1;
                warn!(path = %self.path.display(), error = %err, "solve not persisted");
            }
        }
    }
}
