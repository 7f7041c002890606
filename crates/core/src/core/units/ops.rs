//! Functional-unit operation codes.
//!
//! Each functional unit has its own local operation enum; decoded
//! instructions and command packets carry these rather than raw instruction
//! fields. The ALU set is RV32I plus the ZBB bit-manipulation extension plus
//! a few conveniences (`Mac`, `PassA`, `PassB`).

/// Integer ALU operations (RV32I + ZBB + extras).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// Integer addition (default / decode placeholder).
    #[default]
    Add,
    /// Integer subtraction.
    Sub,
    /// Set less than (signed).
    Slt,
    /// Set less than (unsigned).
    Sltu,
    /// Bitwise XOR.
    Xor,
    /// Bitwise OR.
    Or,
    /// Bitwise AND.
    And,
    /// Shift left logical (amount masked to 5 bits).
    Sll,
    /// Shift right logical (amount masked to 5 bits).
    Srl,
    /// Shift right arithmetic (amount masked to 5 bits).
    Sra,
    /// Load upper immediate: `b << 12`.
    Lui,
    /// Integer multiply, low 32 bits (convenience; the MLU is the pipelined path).
    Mul,
    /// Integer divide, signed (convenience; divisor 0 yields 0 on this path).
    Div,

    /// AND with inverted second operand.
    Andn,
    /// OR with inverted second operand.
    Orn,
    /// XNOR.
    Xnor,
    /// Count leading zeros; `Clz(0) = 32`.
    Clz,
    /// Count trailing zeros; `Ctz(0) = 32`.
    Ctz,
    /// Population count.
    Cpop,
    /// Maximum (signed).
    Max,
    /// Maximum (unsigned).
    Maxu,
    /// Minimum (signed).
    Min,
    /// Minimum (unsigned).
    Minu,
    /// Sign-extend low byte.
    Sextb,
    /// Sign-extend low half-word.
    Sexth,
    /// Rotate left (amount masked to 5 bits).
    Rol,
    /// Rotate right (amount masked to 5 bits).
    Ror,
    /// OR-combine each byte: a byte becomes 0xFF if any of its bits is set.
    Orcb,
    /// Reverse byte order.
    Rev8,
    /// Zero-extend low half-word.
    Zexth,

    /// Multiply-accumulate into the unit's 64-bit accumulator.
    Mac,
    /// Pass first operand through unchanged.
    PassA,
    /// Pass second operand through unchanged.
    PassB,
}

/// Branch-resolution unit operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BruOp {
    /// Branch if equal.
    #[default]
    Beq,
    /// Branch if not equal.
    Bne,
    /// Branch if less than (signed).
    Blt,
    /// Branch if greater or equal (signed).
    Bge,
    /// Branch if less than (unsigned).
    Bltu,
    /// Branch if greater or equal (unsigned).
    Bgeu,
    /// Jump and link.
    Jal,
    /// Jump and link register.
    Jalr,
    /// Environment call (system pass-through; no link, not taken).
    Ecall,
    /// Machine return (system pass-through; no link, not taken).
    Mret,
}

impl BruOp {
    /// True for the linking jumps (`Jal`, `Jalr`).
    pub fn is_jump(self) -> bool {
        matches!(self, Self::Jal | Self::Jalr)
    }

    /// True for the conditional branches.
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            Self::Beq | Self::Bne | Self::Blt | Self::Bge | Self::Bltu | Self::Bgeu
        )
    }
}

/// Multiplier unit operations: which 32-bit half of the 64-bit product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MluOp {
    /// Low 32 bits of signed × signed.
    #[default]
    Mul,
    /// High 32 bits of signed × signed.
    Mulh,
    /// High 32 bits of signed × unsigned.
    Mulhsu,
    /// High 32 bits of unsigned × unsigned.
    Mulhu,
}

impl MluOp {
    /// True for the high-half selecting operations.
    pub fn is_high(self) -> bool {
        !matches!(self, Self::Mul)
    }
}

/// Divider unit operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DvuOp {
    /// Signed quotient.
    #[default]
    Div,
    /// Unsigned quotient.
    Divu,
    /// Signed remainder.
    Rem,
    /// Unsigned remainder.
    Remu,
}

impl DvuOp {
    /// True for `Div`/`Rem` (operand signs participate).
    pub fn is_signed(self) -> bool {
        matches!(self, Self::Div | Self::Rem)
    }

    /// True for the remainder family.
    pub fn is_remainder(self) -> bool {
        matches!(self, Self::Rem | Self::Remu)
    }
}

/// Load/store unit operations.
///
/// The vector variants are enumerated for completeness; the scalar core
/// processes their first element only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LsuOp {
    /// Load byte, sign-extended.
    Lb,
    /// Load half-word, sign-extended.
    Lh,
    /// Load word.
    #[default]
    Lw,
    /// Load byte, zero-extended.
    Lbu,
    /// Load half-word, zero-extended.
    Lhu,
    /// Store byte (low byte of the addressed word).
    Sb,
    /// Store half-word (low half of the addressed word).
    Sh,
    /// Store word.
    Sw,
    /// Unit-stride vector load (first element only).
    Vle32,
    /// Unit-stride vector store (first element only).
    Vse32,
    /// Strided vector load (first element only).
    Vlse32,
    /// Strided vector store (first element only).
    Vsse32,
}

impl LsuOp {
    /// True for every load flavor, vector included.
    pub fn is_load(self) -> bool {
        matches!(
            self,
            Self::Lb | Self::Lh | Self::Lw | Self::Lbu | Self::Lhu | Self::Vle32 | Self::Vlse32
        )
    }

    /// True for every store flavor, vector included.
    pub fn is_store(self) -> bool {
        !self.is_load()
    }
}
