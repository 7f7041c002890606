//! Functional units.
//!
//! The five execution engines of the core, each a 3-stage pipeline over the
//! generic engine with its own typed stage state:
//! 1. **INTU:** integer ALU (RV32I + ZBB + extras), one instance per lane.
//! 2. **BRU:** branch resolver producing link data and outcomes.
//! 3. **MLU:** multiplier with low/high-half selection.
//! 4. **DVU:** iterative restoring divider.
//! 5. **LSU:** load/store unit over interleaved banks.
//!
//! Units are passive aggregates: the core ticks them, handing in the port
//! arena; each reads its input port, advances its pipeline, and places
//! results on its output ports.

/// Branch-resolution unit.
pub mod bru;
/// Iterative divider unit.
pub mod dvu;
/// Integer ALU lane.
pub mod intu;
/// Load/store unit.
pub mod lsu;
/// Multiplier unit.
pub mod mlu;
/// Functional-unit operation codes.
pub mod ops;

pub use bru::Bru;
pub use dvu::Dvu;
pub use intu::Intu;
pub use lsu::Lsu;
pub use mlu::Mlu;
