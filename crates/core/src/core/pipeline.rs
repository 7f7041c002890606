//! Generic N-stage pipeline engine.
//!
//! This module implements the pipeline machinery shared by every functional
//! unit and by the SCore's own instruction pipeline:
//! 1. **Slots:** each stage holds at most one packet plus the cycle it
//!    entered the stage.
//! 2. **Stage behavior:** supplied by a [`StageLogic`] implementation with
//!    explicit, typed state — admit (stage 0, may synthesize), a per-stage
//!    in-place transform, and a per-stage hold predicate.
//! 3. **Timing:** per-stage latencies gate advancement; stalls are counted
//!    by cause (global, latency, structural, predicate).
//!
//! A packet advances out of stage `s` only when it has resided there for
//! `latency[s]` cycles, the next slot is free, and `hold(s)` is false. While
//! it cannot advance, its stage's transform is re-applied in place each tick
//! so iterative stages (the divider) accumulate progress under their own
//! stall predicate. On a successful move the *destination* stage's transform
//! runs once; transforms therefore match on the payload variant they consume
//! and ignore anything else, making re-application harmless.

use crate::common::{Cycle, SimError};
use crate::fabric::packet::Packet;

/// Stage behavior with explicit, typed state.
///
/// `C` is the context threaded through every call — `()` for self-contained
/// units, the core's component aggregate for the SCore instruction pipeline.
pub trait StageLogic<C> {
    /// Stage 0 entry: turn the optional input packet into the stage-0
    /// occupant, or synthesize one from internal state. Returning `None`
    /// leaves stage 0 empty this cycle.
    fn admit(&mut self, ctx: &mut C, input: Option<Packet>, now: Cycle) -> Option<Packet>;

    /// In-place transform for `stage`. Runs once when a packet enters the
    /// stage and again on every cycle the packet is held there.
    fn transform(&mut self, ctx: &mut C, stage: usize, packet: &mut Packet, now: Cycle);

    /// Hold predicate for `stage`: while true, the packet stays put.
    fn hold(&self, ctx: &C, stage: usize, packet: &Packet, now: Cycle) -> bool {
        let _ = (ctx, stage, packet, now);
        false
    }
}

/// One pipeline stage: an optional occupant and its entry cycle.
#[derive(Debug, Clone, Default)]
struct StageSlot {
    slot: Option<Packet>,
    entry_time: Cycle,
}

/// Breakdown of stall cycles by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StallCounts {
    /// Whole-pipeline stalls from the external stall signal.
    pub global: u64,
    /// Packets held because their stage latency had not elapsed.
    pub latency: u64,
    /// Packets held because the next stage was occupied.
    pub structural: u64,
    /// Packets held by their stage's hold predicate.
    pub predicate: u64,
}

impl StallCounts {
    /// Sum over all causes.
    pub fn total(&self) -> u64 {
        self.global + self.latency + self.structural + self.predicate
    }
}

/// Generic N-stage pipeline.
#[derive(Debug)]
pub struct Pipeline {
    period: Cycle,
    stages: Vec<StageSlot>,
    latencies: Vec<Cycle>,
    processed: u64,
    stalls: StallCounts,
}

impl Pipeline {
    /// Creates a pipeline with `num_stages` stages, unit latencies, and the
    /// given tick period.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] for zero stages or a zero period.
    pub fn new(period: Cycle, num_stages: usize) -> Result<Self, SimError> {
        if num_stages == 0 {
            return Err(SimError::InvalidConfig(
                "pipeline must have at least one stage".into(),
            ));
        }
        if period == 0 {
            return Err(SimError::InvalidConfig(
                "pipeline period must be non-zero".into(),
            ));
        }
        Ok(Self {
            period,
            stages: vec![StageSlot::default(); num_stages],
            latencies: vec![1; num_stages],
            processed: 0,
            stalls: StallCounts::default(),
        })
    }

    /// Sets the residency latency of one stage.
    ///
    /// # Panics
    ///
    /// Panics if `stage` is out of range — a construction-time programming
    /// error, not a runtime condition.
    pub fn set_stage_latency(&mut self, stage: usize, cycles: Cycle) {
        self.latencies[stage] = cycles;
    }

    /// Tick period.
    pub fn period(&self) -> Cycle {
        self.period
    }

    /// Number of stages.
    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    /// Number of occupied stages.
    pub fn occupancy(&self) -> usize {
        self.stages.iter().filter(|s| s.slot.is_some()).count()
    }

    /// True when no stage is occupied.
    pub fn is_empty(&self) -> bool {
        self.occupancy() == 0
    }

    /// True when every stage is occupied.
    pub fn is_full(&self) -> bool {
        self.occupancy() == self.stages.len()
    }

    /// Packets drained from the final stage so far.
    pub fn total_processed(&self) -> u64 {
        self.processed
    }

    /// Total stall count over all causes.
    pub fn total_stalls(&self) -> u64 {
        self.stalls.total()
    }

    /// Stall counts broken down by cause.
    pub fn stalls(&self) -> StallCounts {
        self.stalls
    }

    /// Empties every stage without touching the counters.
    pub fn flush(&mut self) {
        for stage in &mut self.stages {
            stage.slot = None;
        }
    }

    /// Empties every stage and zeroes the counters.
    pub fn reset(&mut self) {
        self.flush();
        self.processed = 0;
        self.stalls = StallCounts::default();
    }

    /// Runs one tick of the pipeline.
    ///
    /// Order of operations: global-stall check, drain of the final stage,
    /// back-to-front propagation, then the stage-0 load via
    /// [`StageLogic::admit`]. The input is supplied lazily and consulted
    /// only when stage 0 is actually free, so an un-admitted packet stays on
    /// its port and backpressures the producer. Returns the packet drained
    /// from the final stage, timestamp refreshed, for the owner to put on
    /// its output port.
    pub fn advance<C, L: StageLogic<C>>(
        &mut self,
        logic: &mut L,
        ctx: &mut C,
        input: impl FnOnce() -> Option<Packet>,
        stalled: bool,
        now: Cycle,
    ) -> Option<Packet> {
        if stalled {
            self.stalls.global += 1;
            return None;
        }

        let n = self.stages.len();

        // Drain the final stage.
        let mut output = None;
        if let Some(mut packet) = self.stages[n - 1].slot.take() {
            packet.timestamp = now;
            self.processed += 1;
            output = Some(packet);
        }

        // Propagate back-to-front so each packet moves at most one stage.
        for s in (0..n.saturating_sub(1)).rev() {
            if self.stages[s].slot.is_none() {
                continue;
            }
            let elapsed = now.saturating_sub(self.stages[s].entry_time);
            if elapsed < self.latencies[s] {
                self.stalls.latency += 1;
                if let Some(packet) = self.stages[s].slot.as_mut() {
                    logic.transform(ctx, s, packet, now);
                }
                continue;
            }
            if self.stages[s + 1].slot.is_some() {
                self.stalls.structural += 1;
                if let Some(packet) = self.stages[s].slot.as_mut() {
                    logic.transform(ctx, s, packet, now);
                }
                continue;
            }
            let held = self.stages[s]
                .slot
                .as_ref()
                .is_some_and(|packet| logic.hold(ctx, s, packet, now));
            if held {
                self.stalls.predicate += 1;
                if let Some(packet) = self.stages[s].slot.as_mut() {
                    logic.transform(ctx, s, packet, now);
                }
                continue;
            }
            if let Some(mut packet) = self.stages[s].slot.take() {
                logic.transform(ctx, s + 1, &mut packet, now);
                self.stages[s + 1] = StageSlot {
                    slot: Some(packet),
                    entry_time: now,
                };
            }
        }

        // Load stage 0.
        if self.stages[0].slot.is_none()
            && let Some(packet) = logic.admit(ctx, input(), now)
        {
            self.stages[0] = StageSlot {
                slot: Some(packet),
                entry_time: now,
            };
        }

        output
    }
}
