//! Inter-component fabric.
//!
//! This module provides the pieces components use to talk to each other:
//! 1. **Packets:** the closed payload union flowing between ports.
//! 2. **Ports:** named single-slot data slots, arena-allocated and addressed
//!    by handle.
//! 3. **Tickers:** the self-rescheduling periodic-tick state machine.
//! 4. **Connections:** the combinational [`Wire`](wire::Wire) and the
//!    FIFO-buffered [`ReadyValid`](ready_valid::ReadyValid) edge.
//!
//! Connections with a non-zero latency do not write their destination port
//! directly; they hand back a [`Delivery`] that the owner schedules as a
//! standalone future event.

/// Packet payloads and the packet record.
pub mod packet;
/// Ports and the port arena.
pub mod port;
/// Ready/valid FIFO connection.
pub mod ready_valid;
/// Periodic tick state.
pub mod ticker;
/// Combinational wire connection.
pub mod wire;

pub use packet::{Packet, Payload};
pub use port::{Direction, Port, PortId, PortTable};
pub use ready_valid::ReadyValid;
pub use ticker::Ticker;
pub use wire::Wire;

use crate::common::Cycle;

/// Priority for deferred-delivery events: higher than [`ticker::TICK_PRIORITY`]
/// so a packet due at cycle `t` lands before any component tick at `t`
/// observes the destination port.
pub const DELIVERY_PRIORITY: u32 = 1;

/// A deferred port write produced by a connection with latency.
///
/// The connection's other state is updated immediately at its tick; only the
/// destination write is deferred. The component owner turns this into a
/// scheduled event.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Cycle at which the packet reaches the destination port.
    pub due: Cycle,
    /// Destination port.
    pub port: PortId,
    /// The packet in flight.
    pub packet: Packet,
}
