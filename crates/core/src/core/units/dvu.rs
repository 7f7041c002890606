//! Iterative divider unit (DVU).
//!
//! 3-stage pipeline whose middle stage is a multi-cycle restoring divider:
//! 1. **Decode (admit):** detect a zero divisor (short-circuit with the
//!    defined result pattern), record operand signs for the signed
//!    operations, and take absolute values.
//! 2. **Iterate:** restoring division, 8 quotient bits per cycle over 32
//!    bits — four applications. The stage's hold predicate keeps the packet
//!    in place until the iteration completes; each held cycle re-applies the
//!    stage transform, which is where the progress accumulates.
//! 3. **Format:** re-apply signs (quotient sign is the XOR of the operand
//!    signs, remainder sign follows the dividend).
//!
//! Division by zero yields `0xFFFF_FFFF` for the quotient family and the
//! dividend for the remainder family, and bumps a counter. Typical latency
//! is six ticks (1 + 4 + 1).

use crate::common::{Cycle, SimError};
use crate::core::pipeline::{Pipeline, StageLogic};
use crate::fabric::packet::{Packet, Payload};
use crate::fabric::port::{Direction, PortId, PortTable};
use crate::fabric::ticker::Ticker;

use super::ops::DvuOp;

/// Quotient bits retired per iteration cycle.
const BITS_PER_CYCLE: u32 = 8;

/// Working state of the division in flight.
#[derive(Debug, Clone)]
struct DivState {
    op: DvuOp,
    dividend: u32,
    neg_quotient: bool,
    neg_remainder: bool,
    abs_divisor: u32,
    abs_dividend: u32,
    remainder: u64,
    quotient: u32,
    bits_done: u32,
    done: bool,
    div_by_zero: bool,
}

/// Stage state for the DVU: the in-flight division plus counters.
#[derive(Debug, Default)]
pub struct DvuLogic {
    state: Option<DivState>,
    ops_executed: u64,
    div_by_zero: u64,
}

impl DvuLogic {
    /// Divisions completed so far.
    pub fn ops_executed(&self) -> u64 {
        self.ops_executed
    }

    /// Zero-divisor short circuits so far.
    pub fn div_by_zero_count(&self) -> u64 {
        self.div_by_zero
    }

    /// True while a division is in flight. The unit holds one working state,
    /// so a new command waits on the input port until the current one
    /// formats its result.
    pub fn busy(&self) -> bool {
        self.state.is_some()
    }

    /// Runs up to [`BITS_PER_CYCLE`] restoring-division steps.
    fn iterate(state: &mut DivState) {
        if state.done {
            return;
        }
        let divisor = u64::from(state.abs_divisor);
        for _ in 0..BITS_PER_CYCLE {
            let bit_index = 31 - state.bits_done;
            let bit = u64::from((state.abs_dividend >> bit_index) & 1);
            state.remainder = (state.remainder << 1) | bit;
            if state.remainder >= divisor {
                state.remainder -= divisor;
                state.quotient |= 1 << bit_index;
            }
            state.bits_done += 1;
            if state.bits_done == 32 {
                state.done = true;
                return;
            }
        }
    }

    /// Final result with signs re-applied.
    fn format(state: &DivState) -> u32 {
        if state.div_by_zero {
            return if state.op.is_remainder() {
                state.dividend
            } else {
                0xFFFF_FFFF
            };
        }
        if state.op.is_remainder() {
            let rem = state.remainder as u32;
            if state.neg_remainder { rem.wrapping_neg() } else { rem }
        } else if state.neg_quotient {
            state.quotient.wrapping_neg()
        } else {
            state.quotient
        }
    }
}

impl StageLogic<()> for DvuLogic {
    fn admit(&mut self, _: &mut (), input: Option<Packet>, _now: Cycle) -> Option<Packet> {
        let packet = input?;
        if let Payload::DvuCmd {
            op,
            dividend,
            divisor,
            ..
        } = packet.payload
        {
            let signed = op.is_signed();
            let dividend_neg = signed && (dividend as i32) < 0;
            let divisor_neg = signed && (divisor as i32) < 0;
            let div_by_zero = divisor == 0;
            if div_by_zero {
                self.div_by_zero += 1;
            }
            self.state = Some(DivState {
                op,
                dividend,
                neg_quotient: dividend_neg != divisor_neg,
                neg_remainder: dividend_neg,
                abs_divisor: if divisor_neg {
                    (divisor as i32).unsigned_abs()
                } else {
                    divisor
                },
                abs_dividend: if dividend_neg {
                    (dividend as i32).unsigned_abs()
                } else {
                    dividend
                },
                remainder: 0,
                quotient: 0,
                bits_done: 0,
                // A zero divisor needs no iteration.
                done: div_by_zero,
                div_by_zero,
            });
        }
        Some(packet)
    }

    fn transform(&mut self, _: &mut (), stage: usize, packet: &mut Packet, _now: Cycle) {
        match stage {
            1 => {
                if let Some(state) = self.state.as_mut() {
                    Self::iterate(state);
                }
            }
            2 => {
                if let Payload::DvuCmd { rd, .. } = packet.payload
                    && let Some(state) = self.state.take()
                {
                    self.ops_executed += 1;
                    packet.payload = Payload::DvuResult {
                        value: Self::format(&state),
                        rd,
                    };
                }
            }
            _ => {}
        }
    }

    fn hold(&self, _: &(), stage: usize, _packet: &Packet, _now: Cycle) -> bool {
        stage == 1 && self.state.as_ref().is_some_and(|s| !s.done)
    }
}

/// The divider unit: pipeline, stage state, ports, tick state.
#[derive(Debug)]
pub struct Dvu {
    /// Unit name.
    pub name: String,
    /// The 3-stage pipeline.
    pub pipe: Pipeline,
    /// Stage state.
    pub logic: DvuLogic,
    /// Periodic tick state.
    pub ticker: Ticker,
    /// Command input port.
    pub in_port: PortId,
    /// Result output port.
    pub out_port: PortId,
    /// External stall signal input.
    pub stall_port: PortId,
}

impl Dvu {
    /// Creates the unit, allocating its ports in the arena.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] for a zero period.
    pub fn new(name: &str, period: Cycle, ports: &mut PortTable) -> Result<Self, SimError> {
        Ok(Self {
            name: name.to_string(),
            pipe: Pipeline::new(period, 3)?,
            logic: DvuLogic::default(),
            ticker: Ticker::new(period),
            in_port: ports.add(name, "in", Direction::In),
            out_port: ports.add(name, "out", Direction::Out),
            stall_port: ports.add(name, "stall", Direction::In),
        })
    }

    /// Divisions completed so far.
    pub fn ops_executed(&self) -> u64 {
        self.logic.ops_executed()
    }

    /// Zero-divisor short circuits so far.
    pub fn div_by_zero_count(&self) -> u64 {
        self.logic.div_by_zero_count()
    }

    /// Runs one tick.
    pub fn tick(&mut self, now: Cycle, ports: &mut PortTable) {
        let stalled = ports.signal_level(self.stall_port);
        let in_port = self.in_port;
        let busy = self.logic.busy();
        let drained = {
            let input = || {
                if busy {
                    None
                } else {
                    ports.port_mut(in_port).read()
                }
            };
            self.pipe.advance(&mut self.logic, &mut (), input, stalled, now)
        };
        if let Some(packet) = drained {
            ports.write(self.out_port, packet);
        }
    }

    /// Returns the unit to its post-construction state.
    pub fn reset(&mut self) {
        self.pipe.reset();
        self.logic = DvuLogic::default();
        self.ticker.reset();
    }
}
