//! The event queue and simulation clock.
//!
//! The scheduler owns the monotonic cycle clock and a min-heap of pending
//! events. It enforces the simulator's ordering contract:
//! 1. **Monotonic time:** the clock never moves backwards, and an event
//!    scheduled behind the clock is rejected, never silently executed.
//! 2. **Deterministic ties:** same-cycle events dispatch by descending
//!    priority, then in schedule order.
//! 3. **Cancellation:** a cancelled event is skipped at dispatch time; its
//!    action is dropped unexecuted.
//!
//! The queue is generic over its action payload. Components never live
//! inside the scheduler; their owner pops due events with [`Scheduler::pop_due`]
//! and dispatches the actions itself, which keeps the queue free of component
//! borrows (the arena-and-handle shape of the simulator).

use std::collections::BinaryHeap;
use std::collections::HashSet;

use tracing::trace;

use crate::common::{Cycle, SimError};

use super::event::{Event, EventId, Priority, QueuedEvent};

/// Min-heap event scheduler with a monotonic clock.
#[derive(Debug)]
pub struct Scheduler<A> {
    now: Cycle,
    queue: BinaryHeap<QueuedEvent<A>>,
    cancelled: HashSet<EventId>,
    /// Count of cancelled events still sitting in the heap.
    cancelled_pending: usize,
    next_seq: u64,
    executed: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    /// Creates an empty scheduler with the clock at cycle 0.
    pub fn new() -> Self {
        Self {
            now: 0,
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            cancelled_pending: 0,
            next_seq: 0,
            executed: 0,
        }
    }

    /// Current simulation time. Non-decreasing across the scheduler's life.
    pub fn current_time(&self) -> Cycle {
        self.now
    }

    /// Number of pending, non-cancelled events.
    pub fn pending_count(&self) -> usize {
        self.queue.len() - self.cancelled_pending
    }

    /// Number of events dispatched so far (cancelled events excluded).
    pub fn executed_count(&self) -> u64 {
        self.executed
    }

    /// True when no non-cancelled events remain.
    pub fn is_empty(&self) -> bool {
        self.pending_count() == 0
    }

    /// Schedules an action at the given cycle.
    ///
    /// Scheduling at exactly the current time is allowed; scheduling behind
    /// the clock fails with [`SimError::ScheduleInPast`] and leaves the queue
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ScheduleInPast`] when `time < current_time()`.
    pub fn schedule(&mut self, time: Cycle, priority: Priority, action: A) -> Result<EventId, SimError> {
        if time < self.now {
            return Err(SimError::ScheduleInPast {
                requested: time,
                now: self.now,
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(QueuedEvent {
            time,
            priority,
            seq,
            action,
        });
        trace!(target: "scsim::sched", "schedule t={time} prio={priority} seq={seq}");
        Ok(EventId(seq))
    }

    /// Cancels a pending event.
    ///
    /// Returns `true` if the event was pending and is now marked cancelled.
    /// Cancelling twice, or cancelling an already-dispatched event, is a
    /// no-op returning `false`.
    pub fn cancel(&mut self, id: EventId) -> bool {
        if id.0 >= self.next_seq || self.cancelled.contains(&id) {
            return false;
        }
        // The id may belong to an already-popped event; inserting it anyway
        // is harmless because pop removes ids as it encounters them, and ids
        // are never reused. Track only ids still in the heap for the count.
        if self.queue.iter().any(|e| e.seq == id.0) {
            let _ = self.cancelled.insert(id);
            self.cancelled_pending += 1;
            trace!(target: "scsim::sched", "cancel seq={}", id.0);
            return true;
        }
        false
    }

    /// Pops the next due event, advancing the clock to its time.
    ///
    /// Cancelled events are discarded silently. When `horizon` is given and
    /// the next event lies beyond it, nothing is popped: the clock advances
    /// to the horizon and the event stays queued for a later run.
    pub fn pop_due(&mut self, horizon: Option<Cycle>) -> Option<Event<A>> {
        loop {
            let next_time = self.queue.peek()?.time;
            if let Some(limit) = horizon
                && next_time > limit
            {
                self.now = self.now.max(limit);
                return None;
            }
            // Peek succeeded above, so the heap is non-empty here.
            let entry = self.queue.pop()?;
            let id = EventId(entry.seq);
            if self.cancelled.remove(&id) {
                self.cancelled_pending -= 1;
                continue;
            }
            self.now = self.now.max(entry.time);
            self.executed += 1;
            trace!(target: "scsim::sched", "dispatch t={} seq={}", entry.time, entry.seq);
            return Some(Event {
                id,
                time: entry.time,
                priority: entry.priority,
                action: entry.action,
            });
        }
    }

    /// Clears all pending events and rewinds the clock to cycle 0.
    ///
    /// Event ids are not reused after a reset; the sequence counter keeps
    /// running so stale ids can never cancel new events.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.cancelled.clear();
        self.cancelled_pending = 0;
        self.now = 0;
        self.executed = 0;
    }
}
