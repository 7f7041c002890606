//! Dispatch controller: hazard detection and resource tracking.
//!
//! Each cycle the dispatch stage offers the controller the instructions at
//! the front of the fetch buffer, one per lane, in order. The controller
//! applies the dispatch rules:
//! 1. CSR/FENCE instructions dispatch from slot 0 only.
//! 2. A busy source register (RAW hazard against the scoreboard) denies.
//! 3. The MLU, DVU, and LSU each accept at most one dispatch per cycle.
//!
//! The first denial ends the cycle — later candidates never skip ahead — and
//! a dispatched control-flow instruction ends the cycle too. On allow the
//! controller reads the operands and builds the unit command packet; the
//! core writes the port, marks the scoreboard, and consumes the fetch-buffer
//! entry.

use crate::common::Cycle;
use crate::fabric::packet::{Packet, Payload};

use super::arch::RegisterFile;
use super::decode::{DecodedInst, OpType, UnitOp};
use super::units::mlu;

/// Why a candidate was denied this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// CSR/FENCE offered to a lane other than 0.
    SpecialSlot,
    /// A source register is marked busy in the scoreboard.
    RawHazard,
    /// The target unit already accepted a dispatch this cycle.
    UnitBusy,
    /// The target unit's input port still holds the previous command.
    PortBusy,
    /// The instruction decoded as invalid.
    Invalid,
}

/// Per-cycle dispatch state.
#[derive(Debug, Default)]
pub struct DispatchController {
    mlu_used: bool,
    dvu_used: bool,
    lsu_used: bool,
    next_request_id: u32,
}

impl DispatchController {
    /// Creates a controller with all per-cycle flags clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the per-cycle resource flags. Called at the top of each
    /// dispatch cycle.
    pub fn begin_cycle(&mut self) {
        self.mlu_used = false;
        self.dvu_used = false;
        self.lsu_used = false;
    }

    /// Applies the dispatch rules to one candidate.
    ///
    /// Returns `None` on allow, or the first failing rule. The input-port
    /// check is the core's (it owns the ports) and layers on top of this.
    pub fn check(
        &self,
        inst: &DecodedInst,
        lane: usize,
        regfile: &RegisterFile,
    ) -> Option<DenyReason> {
        if inst.op_type == OpType::Invalid {
            return Some(DenyReason::Invalid);
        }
        if lane > 0 && matches!(inst.op_type, OpType::Csr | OpType::Fence) {
            return Some(DenyReason::SpecialSlot);
        }
        let rs1 = inst.effective_rs1();
        if rs1 != 0 && regfile.is_busy(rs1 as usize) {
            return Some(DenyReason::RawHazard);
        }
        let rs2 = inst.effective_rs2();
        if rs2 != 0 && regfile.is_busy(rs2 as usize) {
            return Some(DenyReason::RawHazard);
        }
        let unit_taken = match inst.op_type {
            OpType::Mlu => self.mlu_used,
            OpType::Dvu => self.dvu_used,
            OpType::Lsu => self.lsu_used,
            _ => false,
        };
        if unit_taken {
            return Some(DenyReason::UnitBusy);
        }
        None
    }

    /// Records that the instruction's unit accepted a dispatch this cycle.
    pub fn mark_dispatched(&mut self, op_type: OpType) {
        match op_type {
            OpType::Mlu => self.mlu_used = true,
            OpType::Dvu => self.dvu_used = true,
            OpType::Lsu => self.lsu_used = true,
            _ => {}
        }
    }

    /// Reads the operands and builds the unit command packet.
    ///
    /// The register reads here are the modeled read-port traffic. The MLU
    /// product is widened with the operation's signedness; the LSU address
    /// is `rs1 + imm` in word units, and the request id is a running
    /// sequence number.
    pub fn build_command(
        &mut self,
        inst: &DecodedInst,
        regfile: &mut RegisterFile,
        now: Cycle,
    ) -> Packet {
        let payload = match inst.op {
            UnitOp::Alu(op) => {
                let a = regfile.read(inst.rs1 as usize);
                let b = if inst.uses_imm {
                    inst.imm as u32
                } else {
                    regfile.read(inst.rs2 as usize)
                };
                Payload::AluCmd {
                    a,
                    b,
                    op,
                    rd: inst.rd,
                }
            }
            UnitOp::Bru(op) => Payload::BruCmd {
                pc: inst.addr,
                pc_next: inst.addr.wrapping_add(4),
                op,
                rs1: regfile.read(inst.effective_rs1() as usize),
                rs2: regfile.read(inst.effective_rs2() as usize),
                rd: inst.effective_rd(),
            },
            UnitOp::Mlu(op) => {
                let a = regfile.read(inst.rs1 as usize);
                let b = regfile.read(inst.rs2 as usize);
                Payload::MluCmd {
                    rd: inst.rd,
                    op,
                    product: mlu::widen_product(a, b, op),
                }
            }
            UnitOp::Dvu(op) => Payload::DvuCmd {
                rd: inst.rd,
                op,
                dividend: regfile.read(inst.rs1 as usize),
                divisor: regfile.read(inst.rs2 as usize),
            },
            UnitOp::Lsu(op) => {
                let base = regfile.read(inst.rs1 as usize);
                let data = if op.is_store() {
                    regfile.read(inst.rs2 as usize)
                } else {
                    0
                };
                let request_id = self.next_request_id;
                self.next_request_id = self.next_request_id.wrapping_add(1);
                Payload::MemRequest {
                    op,
                    address: base.wrapping_add(inst.imm as u32),
                    data,
                    request_id,
                    rd: if op.is_store() { 0 } else { inst.rd },
                }
            }
            // Invalid instructions never pass `check`; nothing to build.
            UnitOp::None => Payload::Value(0),
        };
        Packet::new(payload, now)
    }

    /// Returns to the post-construction state.
    pub fn reset(&mut self) {
        self.begin_cycle();
        self.next_request_id = 0;
    }
}
