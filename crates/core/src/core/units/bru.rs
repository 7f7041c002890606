//! Branch-resolution unit (BRU).
//!
//! Single-instance, 3-stage pipeline. Consumes a branch command carrying the
//! operand *values* and the dispatcher-computed next sequential PC, and
//! produces the branch outcome plus link data. Target arithmetic from
//! immediates is not this unit's job — `target` is the `pc_next` it was
//! handed. `Ecall`/`Mret` pass through as non-linking, not-taken system ops
//! so the CSR instruction class retires through the ordinary writeback path.

use crate::common::{Cycle, SimError};
use crate::core::pipeline::{Pipeline, StageLogic};
use crate::fabric::packet::{Packet, Payload};
use crate::fabric::port::{Direction, PortId, PortTable};
use crate::fabric::ticker::Ticker;

use super::ops::BruOp;

/// Resolves a branch condition over operand values.
fn branch_taken(op: BruOp, rs1: u32, rs2: u32) -> bool {
    match op {
        BruOp::Beq => rs1 == rs2,
        BruOp::Bne => rs1 != rs2,
        BruOp::Blt => (rs1 as i32) < (rs2 as i32),
        BruOp::Bge => (rs1 as i32) >= (rs2 as i32),
        BruOp::Bltu => rs1 < rs2,
        BruOp::Bgeu => rs1 >= rs2,
        BruOp::Jal | BruOp::Jalr => true,
        BruOp::Ecall | BruOp::Mret => false,
    }
}

/// Stage state for the BRU: just an op counter.
#[derive(Debug, Default)]
pub struct BruLogic {
    ops_executed: u64,
}

impl StageLogic<()> for BruLogic {
    fn admit(&mut self, _: &mut (), input: Option<Packet>, _now: Cycle) -> Option<Packet> {
        input
    }

    fn transform(&mut self, _: &mut (), stage: usize, packet: &mut Packet, _now: Cycle) {
        if stage != 1 {
            return;
        }
        if let Payload::BruCmd {
            pc,
            pc_next,
            op,
            rs1,
            rs2,
            rd,
        } = packet.payload
        {
            let link = op.is_jump();
            self.ops_executed += 1;
            packet.payload = Payload::BruResult {
                link_data: if link { pc.wrapping_add(4) } else { 0 },
                rd,
                link_valid: link,
                taken: branch_taken(op, rs1, rs2),
                target: pc_next,
            };
        }
    }
}

/// The branch-resolution unit: pipeline, stage state, ports, tick state.
#[derive(Debug)]
pub struct Bru {
    /// Unit name.
    pub name: String,
    /// The 3-stage pipeline.
    pub pipe: Pipeline,
    /// Stage state.
    pub logic: BruLogic,
    /// Periodic tick state.
    pub ticker: Ticker,
    /// Command input port.
    pub in_port: PortId,
    /// Result output port.
    pub out_port: PortId,
    /// External stall signal input.
    pub stall_port: PortId,
}

impl Bru {
    /// Creates the unit, allocating its ports in the arena.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] for a zero period.
    pub fn new(name: &str, period: Cycle, ports: &mut PortTable) -> Result<Self, SimError> {
        Ok(Self {
            name: name.to_string(),
            pipe: Pipeline::new(period, 3)?,
            logic: BruLogic::default(),
            ticker: Ticker::new(period),
            in_port: ports.add(name, "in", Direction::In),
            out_port: ports.add(name, "out", Direction::Out),
            stall_port: ports.add(name, "stall", Direction::In),
        })
    }

    /// Operations resolved so far.
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
        self.logic = BruLogic::default();
        self.ticker.reset();
    }
}
