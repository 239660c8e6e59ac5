//! Round-robin placement cursor.
//!
//! Selects indices into a node snapshot using an atomic counter. Each
//! `Scheduler` owns its own cursor, so multiple independent placement
//! loops never share selection state. The cursor is not persisted and
//! resets to zero on restart.

use std::sync::atomic::{AtomicUsize, Ordering};

/// A round-robin cursor over a snapshot of candidate nodes.
///
/// Uses `AtomicUsize` for lock-free selection. The counter wraps around
/// the snapshot size at selection time, so the same cursor stays valid
/// across ticks even as the node set grows or shrinks.
pub struct RoundRobinCursor {
    counter: AtomicUsize,
}

impl RoundRobinCursor {
    /// Create a new cursor starting at zero.
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }

    /// Select the next index, wrapping around `count`.
    ///
    /// Returns `None` if count is zero.
    pub fn next(&self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let idx = self.counter.fetch_add(1, Ordering::Relaxed);
        Some(idx % count)
    }

    /// Current counter value (for diagnostics).
    pub fn current(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for RoundRobinCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_cycles_through_indices() {
        let cursor = RoundRobinCursor::new();

        assert_eq!(cursor.next(3), Some(0));
        assert_eq!(cursor.next(3), Some(1));
        assert_eq!(cursor.next(3), Some(2));
        assert_eq!(cursor.next(3), Some(0)); // wraps
    }

    #[test]
    fn cursor_zero_count_returns_none() {
        let cursor = RoundRobinCursor::new();
        assert_eq!(cursor.next(0), None);
        // A None selection must not advance the counter.
        assert_eq!(cursor.current(), 0);
    }

    #[test]
    fn cursor_single_candidate() {
        let cursor = RoundRobinCursor::new();
        for _ in 0..5 {
            assert_eq!(cursor.next(1), Some(0));
        }
    }

    #[test]
    fn cursor_adapts_to_changing_snapshot_size() {
        let cursor = RoundRobinCursor::new();

        assert_eq!(cursor.next(2), Some(0));
        assert_eq!(cursor.next(2), Some(1));

        // Node set grows to 4 between ticks.
        assert_eq!(cursor.next(4), Some(2));
        assert_eq!(cursor.next(4), Some(3));
        assert_eq!(cursor.next(4), Some(0));

        // And shrinks back to 2.
        assert_eq!(cursor.next(2), Some(1));
    }

    #[test]
    fn independent_cursors_do_not_share_state() {
        let a = RoundRobinCursor::new();
        let b = RoundRobinCursor::new();

        a.next(2);
        a.next(2);
        assert_eq!(b.next(2), Some(0));
    }
}
