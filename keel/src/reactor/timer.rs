use crate::future::Promise;

use std::cmp::Ordering;
use std::time::Instant;

/// An entry in the reactor timer queue.
///
/// Stored in a `BinaryHeap`; ordered by deadline, then by insertion order so
/// timers sharing a deadline fire first-in first-out.
pub(crate) struct TimerEntry {
    /// The time at which the timer should fire.
    pub(crate) deadline: Instant,

    /// Insertion sequence number.
    pub(crate) seq: u64,

    /// Resolved when the deadline is reached.
    pub(crate) promise: Promise<()>,
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Ord for TimerEntry {
    /// The comparison is **reversed** so that a `BinaryHeap<TimerEntry>`
    /// behaves as a min-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
