//! Multiplier unit (MLU).
//!
//! 3-stage pipeline over a pre-computed product: the dispatcher widens the
//! operands with the operation's signedness and hands the unit a 64-bit
//! product, so the pipeline models timing while the final stage merely
//! selects the low (`Mul`) or high (`Mulh`/`Mulhsu`/`Mulhu`) 32 bits.
//! Throughput is one result per tick once warm.

use crate::common::{Cycle, SimError};
use crate::core::pipeline::{Pipeline, StageLogic};
use crate::fabric::packet::{Packet, Payload};
use crate::fabric::port::{Direction, PortId, PortTable};
use crate::fabric::ticker::Ticker;

use super::ops::MluOp;

/// Selects the result half from the pre-signed 64-bit product.
fn select_half(product: i64, op: MluOp) -> u32 {
    if op.is_high() {
        ((product as u64) >> 32) as u32
    } else {
        product as u32
    }
}

/// Stage state for the MLU: just an op counter.
#[derive(Debug, Default)]
pub struct MluLogic {
    ops_executed: u64,
}

impl StageLogic<()> for MluLogic {
    fn admit(&mut self, _: &mut (), input: Option<Packet>, _now: Cycle) -> Option<Packet> {
        input
    }

    fn transform(&mut self, _: &mut (), stage: usize, packet: &mut Packet, _now: Cycle) {
        // Stages 0 and 1 are transit; the half-select happens entering
        // stage 2.
        if stage != 2 {
            return;
        }
        if let Payload::MluCmd { rd, op, product } = packet.payload {
            self.ops_executed += 1;
            packet.payload = Payload::MluResult {
                value: select_half(product, op),
                rd,
            };
        }
    }
}

/// The multiplier unit: pipeline, stage state, ports, tick state.
#[derive(Debug)]
pub struct Mlu {
    /// Unit name.
    pub name: String,
    /// The 3-stage pipeline.
    pub pipe: Pipeline,
    /// Stage state.
    pub logic: MluLogic,
    /// Periodic tick state.
    pub ticker: Ticker,
    /// Command input port.
    pub in_port: PortId,
    /// Result output port.
    pub out_port: PortId,
    /// External stall signal input.
    pub stall_port: PortId,
}

impl Mlu {
    /// Creates the unit, allocating its ports in the arena.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] for a zero period.
    pub fn new(name: &str, period: Cycle, ports: &mut PortTable) -> Result<Self, SimError> {
        Ok(Self {
            name: name.to_string(),
            pipe: Pipeline::new(period, 3)?,
            logic: MluLogic::default(),
            ticker: Ticker::new(period),
            in_port: ports.add(name, "in", Direction::In),
            out_port: ports.add(name, "out", Direction::Out),
            stall_port: ports.add(name, "stall", Direction::In),
        })
    }

    /// Operations completed so far.
    pub fn ops_executed(&self) -> u64 {
        self.logic.ops_executed
    }

    /// Runs one tick.
    pub fn tick(&mut self, now: Cycle, ports: &mut PortTable) {
        let stalled = ports.signal_level(self.stall_port);
        let in_port = self.in_port;
        let drained = {
            let input = || ports.port_mut(in_port).read();
            self.pipe.advance(&mut self.logic, &mut (), input, stalled, now)
        };
        if let Some(packet) = drained {
            ports.write(self.out_port, packet);
        }
    }

    /// Returns the unit to its post-construction state.
    pub fn reset(&mut self) {
        self.pipe.reset();
        self.logic = MluLogic::default();
        self.ticker.reset();
    }
}

/// Widens two 32-bit operands into the 64-bit product the unit consumes,
/// applying the operation's signedness. Lives here so the dispatcher and the
/// tests agree on the semantics.
pub fn widen_product(a: u32, b: u32, op: MluOp) -> i64 {
    match op {
        MluOp::Mul | MluOp::Mulh => i64::from(a as i32).wrapping_mul(i64::from(b as i32)),
        MluOp::Mulhsu => i64::from(a as i32).wrapping_mul(i64::from(b)),
        // The u64 product reinterpreted as i64: bit pattern is what the
        // half-select reads, so nothing is lost.
        MluOp::Mulhu => (u64::from(a).wrapping_mul(u64::from(b))) as i64,
    }
}
