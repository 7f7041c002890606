//! Combinational wire connection.
//!
//! A `Wire` joins one source port to at most one destination port. It holds
//! two internal single-packet slots, `current` and `next`, so that a
//! consumer polling the wire a cycle late does not lose data. Each tick it
//! performs at most one logical transfer:
//! 1. Promote `next` into `current` when `current` is free.
//! 2. Read at most one packet from the source port.
//! 3. If a destination is bound, deliver it there (immediately, or via a
//!    [`Delivery`] event when the wire has latency); otherwise buffer it in
//!    `current`, spilling to `next`.
//!
//! When both slots are occupied a newly read packet overwrites `next`; under
//! sustained overflow packets are lost, and the wire counts each loss.

use tracing::trace;

use crate::common::Cycle;

use super::packet::Packet;
use super::port::{PortId, PortTable};
use super::ticker::Ticker;
use super::Delivery;

/// One-way buffered edge between two ports.
#[derive(Debug)]
pub struct Wire {
    /// Connection name, used in traces.
    pub name: String,
    src: PortId,
    dst: Option<PortId>,
    latency: Cycle,
    current: Option<Packet>,
    next: Option<Packet>,
    /// Periodic tick state.
    pub ticker: Ticker,
    transfers: u64,
    drops: u64,
}

impl Wire {
    /// Creates a wire from `src` to an optional `dst`.
    ///
    /// A destination-less wire buffers packets in its slots for a polling
    /// consumer (the SCore writeback stage polls its unit wires this way).
    pub fn new(name: &str, src: PortId, dst: Option<PortId>, latency: Cycle, period: Cycle) -> Self {
        Self {
            name: name.to_string(),
            src,
            dst,
            latency,
            current: None,
            next: None,
            ticker: Ticker::new(period),
            transfers: 0,
            drops: 0,
        }
    }

    /// Packets moved off the source port so far.
    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    /// Packets lost to slot overflow so far.
    pub fn drops(&self) -> u64 {
        self.drops
    }

    /// Looks at the `current` slot without consuming it.
    pub fn peek_current(&self) -> Option<&Packet> {
        self.current.as_ref()
    }

    /// Drains the `current` slot. `next` promotes at the wire's own tick.
    pub fn take_current(&mut self) -> Option<Packet> {
        self.current.take()
    }

    /// Runs one tick: promote, read, deliver-or-buffer.
    ///
    /// Returns a [`Delivery`] when the wire has latency and moved a packet;
    /// the owner schedules it as a standalone event.
    pub fn tick(&mut self, now: Cycle, ports: &mut PortTable) -> Option<Delivery> {
        if self.current.is_none() && self.next.is_some() {
            self.current = self.next.take();
        }

        let mut packet = ports.read(self.src)?;
        self.transfers += 1;
        packet.timestamp = now;
        trace!(target: "scsim::fabric", "{} transfer t={now}", self.name);

        if let Some(dst) = self.dst {
            if self.latency == 0 {
                ports.write(dst, packet);
                return None;
            }
            return Some(Delivery {
                due: now + self.latency,
                port: dst,
                packet,
            });
        }

        if self.current.is_none() {
            self.current = Some(packet);
        } else {
            if self.next.is_some() {
                self.drops += 1;
                trace!(target: "scsim::fabric", "{} overflow drop t={now}", self.name);
            }
            self.next = Some(packet);
        }
        None
    }

    /// Empties both slots and zeroes the counters.
    pub fn reset(&mut self) {
        self.current = None;
        self.next = None;
        self.transfers = 0;
        self.drops = 0;
        self.ticker.reset();
    }
}
