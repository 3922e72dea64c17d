//! Session statistics over recorded solves.
//!
//! Tracks every solve time of a session and answers the numbers a timer
//! displays: best, worst, mean and the trimmed rolling averages `ao5` and
//! `ao12`.
//!
//! # Usage
//!
//! ```ignore
//! let mut stats = SessionStats::new();
//! for solve in &solves {
//!     stats.record(solve);
//! }
//! println!("ao5 {}", stats.ao5().map(format_time).unwrap_or_default());
//! ```

use serde::{Deserialize, Serialize};

use cubetime_core::solve::Solve;

/// Solve times of one session, oldest first.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    times: Vec<f64>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_solves<'a>(solves: impl IntoIterator<Item = &'a Solve>) -> Self {
        let mut stats = Self::new();
        for solve in solves {
            stats.record(solve);
        }
        stats
    }

    pub fn record(&mut self, solve: &Solve) {
        self.times.push(solve.elapsed_ms);
    }

    pub fn count(&self) -> usize {
        self.times.len()
    }

    pub fn best(&self) -> Option<f64> {
        self.times.iter().copied().reduce(f64::min)
    }

    pub fn worst(&self) -> Option<f64> {
        self.times.iter().copied().reduce(f64::max)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.times.is_empty() {
            return None;
        }
        Some(self.times.iter().sum::<f64>() / self.times.len() as f64)
    }

    /// Average of the last `n` solves with the single best and worst
    /// dropped. `None` until `n` solves exist, or when `n < 3`.
    pub fn average_of(&self, n: usize) -> Option<f64> {
        if n < 3 || self.times.len() < n {
            return None;
        }
        let mut window = self.times[self.times.len() - n..].to_vec();
        window.sort_by(f64::total_cmp);
        let kept = &window[1..n - 1];
        Some(kept.iter().sum::<f64>() / kept.len() as f64)
    }

    pub fn ao5(&self) -> Option<f64> {
        self.average_of(5)
    }

    pub fn ao12(&self) -> Option<f64> {
        self.average_of(12)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            count: self.count(),
            best: self.best(),
            worst: self.worst(),
            mean: self.mean(),
            ao5: self.ao5(),
            ao12: self.ao12(),
        }
    }
}

/// Snapshot of the headline numbers, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub best: Option<f64>,
    pub worst: Option<f64>,
    pub mean: Option<f64>,
    pub ao5: Option<f64>,
    pub ao12: Option<f64>,
}

/// Render milliseconds as `s.cc` under a minute and `m:ss.cc` above.
/// Hundredths are truncated, never rounded up.
pub fn format_time(ms: f64) -> String {
    let centis = (ms.max(0.0) / 10.0).floor() as u64;
    let (minutes, rest) = (centis / 6000, centis % 6000);
    let (seconds, hundredths) = (rest / 100, rest % 100);
    if minutes == 0 {
        format!("{seconds}.{hundredths:02}")
    } else {
        format!("{minutes}:{seconds:02}.{hundredths:02}")
    }
}

// ===========================================================================
// Tests
// ===========================================================================
