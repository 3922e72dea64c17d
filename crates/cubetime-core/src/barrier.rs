//! Two-input rendezvous.
//!
//! A [`PairingBarrier`] releases a pair only once both sides have produced an
//! element, pairing strictly in arrival order: the first left element with
//! the first right element, the second with the second, and so on. Whichever
//! side runs ahead waits in its queue. At most one side is ever non-empty.
//!
//! Queues never discard. A side that grows past the soft limit is reported
//! with `warn!` each time it crosses the limit and keeps queueing.

use std::collections::VecDeque;

use tracing::warn;

/// Which input of the barrier an element arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Default number of waiting elements per side before a warning.
pub const DEFAULT_BARRIER_SOFT_LIMIT: usize = 32;

/// Unbounded FIFO rendezvous between two independent sources.
#[derive(Debug)]
pub struct PairingBarrier<L, R> {
    left: VecDeque<L>,
    right: VecDeque<R>,
    soft_limit: usize,
    released: u64,
}

impl<L, R> Default for PairingBarrier<L, R> {
    fn default() -> Self {
        Self::with_soft_limit(DEFAULT_BARRIER_SOFT_LIMIT)
    }
}

impl<L, R> PairingBarrier<L, R> {
    /// A limit of 0 is clamped to 1.
    pub fn with_soft_limit(soft_limit: usize) -> Self {
        Self {
            left: VecDeque::new(),
            right: VecDeque::new(),
            soft_limit: soft_limit.max(1),
            released: 0,
        }
    }

    /// Offer a left element. Returns the released pair if a right element
    /// was waiting.
    pub fn push_left(&mut self, item: L) -> Option<(L, R)> {
        if let Some(right) = self.right.pop_front() {
            self.released += 1;
            return Some((item, right));
        }
        self.left.push_back(item);
        self.check_limit(Side::Left, self.left.len());
        None
    }

    /// Offer a right element. Returns the released pair if a left element
    /// was waiting.
    pub fn push_right(&mut self, item: R) -> Option<(L, R)> {
        if let Some(left) = self.left.pop_front() {
            self.released += 1;
            return Some((left, item));
        }
        self.right.push_back(item);
        self.check_limit(Side::Right, self.right.len());
        None
    }

    fn check_limit(&self, side: Side, waiting: usize) {
        if waiting == self.soft_limit + 1 {
            warn!(
                ?side,
                waiting,
                soft_limit = self.soft_limit,
                "pairing barrier over soft limit"
            );
        }
    }

    pub fn waiting_left(&self) -> usize {
        self.left.len()
    }

    pub fn waiting_right(&self) -> usize {
        self.right.len()
    }

    pub fn is_over_limit(&self) -> bool {
        self.left.len().max(self.right.len()) > self.soft_limit
    }

    /// Pairs released since creation.
    pub fn released(&self) -> u64 {
        self.released
    }

    pub fn soft_limit(&self) -> usize {
        self.soft_limit
    }
}

// ===========================================================================
// Tests
// ===========================================================================
