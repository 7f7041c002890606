//! Cycle-accurate SCore scalar-core simulator library.
//!
//! This crate implements a discrete-event, cycle-accurate simulator of a small
//! scalar in-order CPU core ("SCore") with pipelined functional units:
//! 1. **Scheduler:** min-heap event queue with priorities, deterministic
//!    tie-breaking, and cancellation.
//! 2. **Fabric:** packets, single-slot ports, ticking components, and the two
//!    connection types (combinational `Wire`, FIFO-buffered `ReadyValid`).
//! 3. **Core:** a generic N-stage pipeline engine, the five functional units
//!    (INTU, BRU, MLU, DVU, LSU), the register file with scoreboard, the
//!    decoder, and the dispatch controller.
//! 4. **SCore:** the composed three-stage fetch/dispatch/writeback machine,
//!    lifecycle management, and performance counters.
//!
//! Simulation is single-threaded and cooperative: all work happens inside
//! scheduler event dispatch, and two runs from the same initial state retire
//! the same instructions on the same cycles.

/// Common types: the cycle clock and the misuse error taxonomy.
pub mod common;
/// Simulator configuration (defaults, hierarchical config structures).
pub mod config;
/// The core: pipeline engine, functional units, architectural state, SCore.
pub mod core;
/// Inter-component fabric: packets, ports, tickers, and connections.
pub mod fabric;
/// Discrete-event scheduler and event records.
pub mod sched;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The composed scalar core; constructed from a scheduler and a config.
pub use crate::core::score::ScalarCore;
/// Misuse error type surfaced by scheduling and lifecycle operations.
pub use crate::common::SimError;
/// The event scheduler; owns the simulation clock.
pub use crate::sched::scheduler::Scheduler;
