//! Event records and deterministic heap ordering.
//!
//! An event is an immutable `(time, priority, sequence, action)` record.
//! Ordering is total and deterministic: earlier time first, ties broken by
//! higher priority, then by first-in-first-out insertion order. Cancellation
//! is tracked by id on the scheduler side; a cancelled event is dropped at
//! dispatch and its action never runs.

use std::cmp::Ordering;

use crate::common::Cycle;

/// Event priority; larger values dispatch first among same-cycle events.
pub type Priority = u32;

/// Opaque handle to a scheduled event, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub(crate) u64);

/// A dispatched event, as returned by the scheduler's pop operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<A> {
    /// Handle assigned at schedule time.
    pub id: EventId,
    /// Cycle at which the event fired.
    pub time: Cycle,
    /// Priority it was scheduled with.
    pub priority: Priority,
    /// The action payload.
    pub action: A,
}

/// Heap entry: ordering key plus payload.
///
/// `Ord` is implemented so that the `BinaryHeap` (a max-heap) pops the event
/// that must dispatch first: smallest time, then largest priority, then
/// smallest sequence number.
#[derive(Debug)]
pub(crate) struct QueuedEvent<A> {
    pub(crate) time: Cycle,
    pub(crate) priority: Priority,
    /// Insertion sequence; doubles as the event id.
    pub(crate) seq: u64,
    pub(crate) action: A,
}

impl<A> PartialEq for QueuedEvent<A> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<A> Eq for QueuedEvent<A> {}

impl<A> PartialOrd for QueuedEvent<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for QueuedEvent<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: "greater" means "pops first".
        other
            .time
            .cmp(&self.time)
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
