//! Architectural state.
//!
//! This module holds the register file with its hazard scoreboard; the rest
//! of the architectural surface (the instruction buffer, the LSU's data
//! banks) lives next to the machinery that owns it.

/// Register file with scoreboard and forwarding.
pub mod regfile;

pub use regfile::RegisterFile;
