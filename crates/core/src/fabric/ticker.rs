//! Periodic tick state for self-rescheduling components.
//!
//! Every active component (units, connections, the register file, the core
//! itself) owns a [`Ticker`]. Starting it schedules the first tick; after
//! each tick the owner calls [`Ticker::advance`] to post the next one at
//! `now + period`. Stopping is idempotent and cancellation-safe: a tick
//! already in the queue when `stop` is called is cancelled by id and dropped
//! at dispatch.

use crate::common::{Cycle, SimError};
use crate::sched::{EventId, Scheduler};

/// Tick priority shared by all periodic components; deliveries outrank it so
/// an in-flight packet lands before any same-cycle tick observes the port.
pub const TICK_PRIORITY: u32 = 0;

/// Self-rescheduling periodic tick state.
#[derive(Debug)]
pub struct Ticker {
    period: Cycle,
    started: bool,
    stopped: bool,
    pending: Option<EventId>,
}

impl Ticker {
    /// Creates a ticker with the given period, not yet started.
    pub fn new(period: Cycle) -> Self {
        Self {
            period,
            started: false,
            stopped: false,
            pending: None,
        }
    }

    /// The tick period in cycles.
    pub fn period(&self) -> Cycle {
        self.period
    }

    /// True once `start` has been called (and before any reset).
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True once `stop` has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Schedules the first tick at cycle `at`. A second call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ScheduleInPast`] when `at` is behind the
    /// scheduler's clock.
    pub fn start<A>(
        &mut self,
        sched: &mut Scheduler<A>,
        at: Cycle,
        action: A,
    ) -> Result<(), SimError> {
        if self.started {
            return Ok(());
        }
        let id = sched.schedule(at, TICK_PRIORITY, action)?;
        self.pending = Some(id);
        self.started = true;
        self.stopped = false;
        Ok(())
    }

    /// Posts the next tick at `now + period`, unless stopped.
    ///
    /// Called by the owner at the end of each tick. Scheduling into the
    /// future cannot fail, so any error is impossible by construction and
    /// simply clears the pending handle.
    pub fn advance<A>(&mut self, sched: &mut Scheduler<A>, now: Cycle, action: A) {
        if self.stopped {
            self.pending = None;
            return;
        }
        self.pending = sched.schedule(now + self.period, TICK_PRIORITY, action).ok();
    }

    /// Prevents further self-rescheduling and cancels any queued tick.
    ///
    /// Idempotent: stopping twice is indistinguishable from stopping once.
    pub fn stop<A>(&mut self, sched: &mut Scheduler<A>) {
        self.stopped = true;
        if let Some(id) = self.pending.take() {
            let _ = sched.cancel(id);
        }
    }

    /// Returns the ticker to its post-construction state.
    pub fn reset(&mut self) {
        self.started = false;
        self.stopped = false;
        self.pending = None;
    }
}
