//! Instruction decoder.
//!
//! A pure function from a 32-bit word to a decoded instruction record:
//! field extraction (opcode, rd, rs1, rs2, immediates) plus a deliberately
//! coarse classification into functional-unit classes. All `0x13`/`0x33`
//! words decode as ALU `Add` and all `0x63` branches as `Beq` — the one
//! refinement is the M-extension row (`0x33` with funct7 1), which routes to
//! the MLU or DVU by funct3 so multiply and divide words reach their
//! pipelined units. Stores assemble the S-type immediate; everything else
//! carries the I-type immediate.

use super::units::ops::{AluOp, BruOp, DvuOp, LsuOp, MluOp};

/// Functional-unit class of a decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpType {
    /// Integer ALU lane.
    Alu,
    /// Branch-resolution unit.
    Bru,
    /// Multiplier unit.
    Mlu,
    /// Divider unit.
    Dvu,
    /// Load/store unit.
    Lsu,
    /// CSR/system class (executes on the BRU path, slot 0 only).
    Csr,
    /// Fence class (executes on the BRU path, slot 0 only).
    Fence,
    /// Unrecognized encoding.
    #[default]
    Invalid,
}

/// Unit-local operation of a decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOp {
    /// ALU operation.
    Alu(AluOp),
    /// Branch operation (also used for the CSR/FENCE pass-through).
    Bru(BruOp),
    /// Multiply operation.
    Mlu(MluOp),
    /// Divide operation.
    Dvu(DvuOp),
    /// Load/store operation.
    Lsu(LsuOp),
    /// No unit (invalid encodings).
    None,
}

/// A decoded instruction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInst {
    /// Address the word was fetched from.
    pub addr: u32,
    /// The raw 32-bit word.
    pub word: u32,
    /// Functional-unit class.
    pub op_type: OpType,
    /// Destination register.
    pub rd: u8,
    /// First source register.
    pub rs1: u8,
    /// Second source register.
    pub rs2: u8,
    /// Sign-extended immediate (S-type for stores, I-type otherwise).
    pub imm: i32,
    /// Unit-local operation.
    pub op: UnitOp,
    /// True when the second ALU operand is the immediate (`0x13` row).
    pub uses_imm: bool,
}

impl DecodedInst {
    /// Destination register this instruction actually writes, or 0 for the
    /// classes that write nothing (stores, conditional branches, system,
    /// fence — their raw `rd` field holds immediate bits).
    pub fn effective_rd(&self) -> u8 {
        match self.op {
            UnitOp::Alu(_) | UnitOp::Mlu(_) | UnitOp::Dvu(_) => self.rd,
            UnitOp::Bru(op) => {
                if op.is_jump() {
                    self.rd
                } else {
                    0
                }
            }
            UnitOp::Lsu(op) => {
                if op.is_store() {
                    0
                } else {
                    self.rd
                }
            }
            UnitOp::None => 0,
        }
    }

    /// First source register this instruction actually reads, or 0 when the
    /// class has none (JAL, system — the field holds immediate bits).
    pub fn effective_rs1(&self) -> u8 {
        match self.op {
            UnitOp::Bru(BruOp::Jal | BruOp::Ecall | BruOp::Mret) => 0,
            UnitOp::None => 0,
            _ => self.rs1,
        }
    }

    /// Second source register this instruction actually reads, or 0 when
    /// the operand is an immediate or absent.
    pub fn effective_rs2(&self) -> u8 {
        match self.op {
            UnitOp::Alu(_) if self.uses_imm => 0,
            UnitOp::Alu(_) | UnitOp::Mlu(_) | UnitOp::Dvu(_) => self.rs2,
            UnitOp::Bru(op) if op.is_conditional() => self.rs2,
            UnitOp::Bru(_) => 0,
            UnitOp::Lsu(op) if op.is_store() => self.rs2,
            UnitOp::Lsu(_) | UnitOp::None => 0,
        }
    }
}

/// RISC-V major opcodes recognized by the coarse classifier.
mod opcodes {
    /// OP-IMM: register-immediate ALU.
    pub const OP_IMM: u32 = 0x13;
    /// OP: register-register ALU (and the M extension under funct7 1).
    pub const OP: u32 = 0x33;
    /// Conditional branches.
    pub const BRANCH: u32 = 0x63;
    /// Jump and link.
    pub const JAL: u32 = 0x6F;
    /// Jump and link register.
    pub const JALR: u32 = 0x67;
    /// Loads.
    pub const LOAD: u32 = 0x03;
    /// Stores.
    pub const STORE: u32 = 0x23;
    /// System (ECALL/MRET/CSR).
    pub const SYSTEM: u32 = 0x73;
    /// Fences.
    pub const MISC_MEM: u32 = 0x0F;
}

/// I-type immediate: bits [31:20], sign-extended.
fn imm_i(word: u32) -> i32 {
    (word as i32) >> 20
}

/// S-type immediate: bits [31:25] | [11:7], sign-extended.
fn imm_s(word: u32) -> i32 {
    ((word & 0xFE00_0000) as i32 >> 20) | (((word >> 7) & 0x1F) as i32)
}

/// Decodes one instruction word.
///
/// Pure and total: every word decodes to *something*, with unrecognized
/// opcodes classified [`OpType::Invalid`].
pub fn decode(addr: u32, word: u32) -> DecodedInst {
    let opcode = word & 0x7F;
    let rd = ((word >> 7) & 0x1F) as u8;
    let rs1 = ((word >> 15) & 0x1F) as u8;
    let rs2 = ((word >> 20) & 0x1F) as u8;
    let funct3 = (word >> 12) & 0x7;
    let funct7 = (word >> 25) & 0x7F;

    let mut inst = DecodedInst {
        addr,
        word,
        op_type: OpType::Invalid,
        rd,
        rs1,
        rs2,
        imm: imm_i(word),
        op: UnitOp::None,
        uses_imm: false,
    };

    match opcode {
        opcodes::OP_IMM => {
            inst.op_type = OpType::Alu;
            inst.op = UnitOp::Alu(AluOp::Add);
            inst.uses_imm = true;
        }
        opcodes::OP => {
            if funct7 == 0x01 {
                // M extension: funct3 0-3 multiply, 4-7 divide.
                match funct3 {
                    0 => {
                        inst.op_type = OpType::Mlu;
                        inst.op = UnitOp::Mlu(MluOp::Mul);
                    }
                    1 => {
                        inst.op_type = OpType::Mlu;
                        inst.op = UnitOp::Mlu(MluOp::Mulh);
                    }
                    2 => {
                        inst.op_type = OpType::Mlu;
                        inst.op = UnitOp::Mlu(MluOp::Mulhsu);
                    }
                    3 => {
                        inst.op_type = OpType::Mlu;
                        inst.op = UnitOp::Mlu(MluOp::Mulhu);
                    }
                    4 => {
                        inst.op_type = OpType::Dvu;
                        inst.op = UnitOp::Dvu(DvuOp::Div);
                    }
                    5 => {
                        inst.op_type = OpType::Dvu;
                        inst.op = UnitOp::Dvu(DvuOp::Divu);
                    }
                    6 => {
                        inst.op_type = OpType::Dvu;
                        inst.op = UnitOp::Dvu(DvuOp::Rem);
                    }
                    _ => {
                        inst.op_type = OpType::Dvu;
                        inst.op = UnitOp::Dvu(DvuOp::Remu);
                    }
                }
            } else {
                inst.op_type = OpType::Alu;
                inst.op = UnitOp::Alu(AluOp::Add);
            }
        }
        opcodes::BRANCH => {
            inst.op_type = OpType::Bru;
            inst.op = UnitOp::Bru(BruOp::Beq);
        }
        opcodes::JAL => {
            inst.op_type = OpType::Bru;
            inst.op = UnitOp::Bru(BruOp::Jal);
        }
        opcodes::JALR => {
            inst.op_type = OpType::Bru;
            inst.op = UnitOp::Bru(BruOp::Jalr);
        }
        opcodes::LOAD => {
            inst.op_type = OpType::Lsu;
            inst.op = UnitOp::Lsu(LsuOp::Lw);
            inst.uses_imm = true;
        }
        opcodes::STORE => {
            inst.op_type = OpType::Lsu;
            inst.op = UnitOp::Lsu(LsuOp::Sw);
            inst.imm = imm_s(word);
            inst.uses_imm = true;
        }
        opcodes::SYSTEM => {
            inst.op_type = OpType::Csr;
            // MRET is the one system encoding the core tells apart.
            inst.op = if imm_i(word) == 0x302 {
                UnitOp::Bru(BruOp::Mret)
            } else {
                UnitOp::Bru(BruOp::Ecall)
            };
        }
        opcodes::MISC_MEM => {
            inst.op_type = OpType::Fence;
            inst.op = UnitOp::Bru(BruOp::Ecall);
        }
        _ => {}
    }
    inst
}
