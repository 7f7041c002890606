//! Packet payloads flowing between ports.
//!
//! The packet zoo is finite and closed, so payloads are a single tagged
//! union rather than downcast-able trait objects: commands into each
//! functional unit, results out of each unit, memory traffic, raw integers,
//! and boolean signal levels. Every packet carries the cycle it was produced
//! and a validity flag; cloning is derived and lossless.

use crate::common::Cycle;
use crate::core::units::ops::{AluOp, BruOp, DvuOp, LsuOp, MluOp};

/// The closed union of payloads that can cross a port.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// A raw integer value.
    Value(u32),

    /// Command into an integer ALU lane.
    AluCmd {
        /// First operand value.
        a: u32,
        /// Second operand value (or immediate).
        b: u32,
        /// Operation to perform.
        op: AluOp,
        /// Destination register.
        rd: u8,
    },
    /// Result out of an integer ALU lane.
    AluResult {
        /// Computed value.
        value: u32,
        /// Destination register.
        rd: u8,
    },

    /// Command into the branch-resolution unit.
    ///
    /// `rs1`/`rs2` carry operand *values* read at dispatch; target
    /// arithmetic stays with the dispatcher, which supplies `pc_next`.
    BruCmd {
        /// Program counter of the branch.
        pc: u32,
        /// Dispatcher-computed next sequential PC.
        pc_next: u32,
        /// Branch operation.
        op: BruOp,
        /// First operand value.
        rs1: u32,
        /// Second operand value.
        rs2: u32,
        /// Destination register (link register for jumps).
        rd: u8,
    },
    /// Result out of the branch-resolution unit.
    BruResult {
        /// Link value (`pc + 4`) for jumps; 0 otherwise.
        link_data: u32,
        /// Destination register.
        rd: u8,
        /// True when `link_data` must be written back.
        link_valid: bool,
        /// Branch outcome.
        taken: bool,
        /// Resolved target (the dispatcher-provided `pc_next`).
        target: u32,
    },

    /// Command into the multiplier unit; the 64-bit product is computed
    /// with the operation's signedness at dispatch.
    MluCmd {
        /// Destination register.
        rd: u8,
        /// Which half of the product to select.
        op: MluOp,
        /// Pre-signed 64-bit product.
        product: i64,
    },
    /// Result out of the multiplier unit.
    MluResult {
        /// Selected 32-bit half.
        value: u32,
        /// Destination register.
        rd: u8,
    },

    /// Command into the divider unit.
    DvuCmd {
        /// Destination register.
        rd: u8,
        /// Divide operation.
        op: DvuOp,
        /// Dividend operand.
        dividend: u32,
        /// Divisor operand.
        divisor: u32,
    },
    /// Result out of the divider unit.
    DvuResult {
        /// Quotient or remainder, signs applied.
        value: u32,
        /// Destination register.
        rd: u8,
    },

    /// Memory request into the load/store unit.
    MemRequest {
        /// Load/store operation.
        op: LsuOp,
        /// Word address.
        address: u32,
        /// Store data (ignored for loads).
        data: u32,
        /// Request identifier echoed in the response.
        request_id: u32,
        /// Destination register stamped into the response (0 for stores).
        rd: u8,
    },
    /// Memory response out of the load/store unit.
    MemResponse {
        /// Loaded data (0 for stores and out-of-range loads).
        data: u32,
        /// Word address of the access.
        address: u32,
        /// Request identifier from the matching request.
        request_id: u32,
        /// Destination register (0 for stores).
        rd: u8,
    },

    /// A boolean signal level (ready/valid, stall).
    Signal(bool),
}

/// A timestamped payload as it crosses the fabric.
#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    /// The payload.
    pub payload: Payload,
    /// Cycle the packet was produced or last forwarded.
    pub timestamp: Cycle,
    /// Validity flag; ports treat invalid packets as absent data.
    pub valid: bool,
}

impl Packet {
    /// Creates a valid packet stamped with the given cycle.
    pub fn new(payload: Payload, timestamp: Cycle) -> Self {
        Self {
            payload,
            timestamp,
            valid: true,
        }
    }

    /// Creates the zero-value bookkeeping packet used by pipeline stages
    /// that only need something flowing.
    pub fn stub(timestamp: Cycle) -> Self {
        Self::new(Payload::Value(0), timestamp)
    }

    /// Creates a signal-level packet.
    pub fn signal(level: bool, timestamp: Cycle) -> Self {
        Self::new(Payload::Signal(level), timestamp)
    }

    /// Destination register carried by a result payload, if any.
    pub fn result_rd(&self) -> Option<u8> {
        match self.payload {
            Payload::AluResult { rd, .. }
            | Payload::MluResult { rd, .. }
            | Payload::DvuResult { rd, .. }
            | Payload::MemResponse { rd, .. }
            | Payload::BruResult { rd, .. } => Some(rd),
            _ => None,
        }
    }
}
