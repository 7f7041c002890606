//! Ready/valid FIFO connection.
//!
//! A `ReadyValid` edge buffers packets in a bounded FIFO and moves them only
//! under a two-sided handshake observed on external signal ports:
//! 1. **Ingress:** when the `valid` level is high and the FIFO has room,
//!    dequeue one packet from the source port into the FIFO.
//! 2. **Egress:** when the `ready` level is high, the FIFO is nonempty, and
//!    the destination port is empty, pop one packet and deliver it.
//!
//! Backpressure falls out of the rules: a full FIFO stops ingress, an
//! occupied destination stops egress. Both signal ports must be bound before
//! the first tick; `ScalarCore::initialize`-style validation surfaces the
//! misuse as [`SimError::UnboundSignal`], and the tick itself panics as a
//! backstop if forced anyway.

use std::collections::VecDeque;

use tracing::trace;

use crate::common::{Cycle, SimError};

use super::packet::Packet;
use super::port::{PortId, PortTable};
use super::ticker::Ticker;
use super::Delivery;

/// FIFO-buffered edge with an external ready/valid handshake.
#[derive(Debug)]
pub struct ReadyValid {
    /// Connection name, used in traces and errors.
    pub name: String,
    src: PortId,
    dst: PortId,
    ready: Option<PortId>,
    valid: Option<PortId>,
    fifo: VecDeque<Packet>,
    capacity: usize,
    latency: Cycle,
    /// Periodic tick state.
    pub ticker: Ticker,
    transfers: u64,
}

impl ReadyValid {
    /// Creates a ready/valid connection from `src` to `dst` with the given
    /// FIFO capacity. The signal ports start unbound.
    pub fn new(
        name: &str,
        src: PortId,
        dst: PortId,
        capacity: usize,
        latency: Cycle,
        period: Cycle,
    ) -> Self {
        Self {
            name: name.to_string(),
            src,
            dst,
            ready: None,
            valid: None,
            fifo: VecDeque::with_capacity(capacity),
            capacity,
            latency,
            ticker: Ticker::new(period),
            transfers: 0,
        }
    }

    /// Binds the external `ready` signal port.
    pub fn bind_ready(&mut self, port: PortId) {
        self.ready = Some(port);
    }

    /// Binds the external `valid` signal port.
    pub fn bind_valid(&mut self, port: PortId) {
        self.valid = Some(port);
    }

    /// Checks that both signal ports are bound.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnboundSignal`] naming the missing signal.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.ready.is_none() {
            return Err(SimError::UnboundSignal {
                connection: self.name.clone(),
                signal: "ready",
            });
        }
        if self.valid.is_none() {
            return Err(SimError::UnboundSignal {
                connection: self.name.clone(),
                signal: "valid",
            });
        }
        Ok(())
    }

    /// Current FIFO occupancy.
    pub fn occupancy(&self) -> usize {
        self.fifo.len()
    }

    /// Packets delivered to the destination so far.
    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    /// Runs one tick: ingress under `valid`, then egress under `ready`.
    ///
    /// Returns a [`Delivery`] when the connection has latency and moved a
    /// packet toward the destination.
    ///
    /// # Panics
    ///
    /// Panics if either signal port is unbound — validate with
    /// [`ReadyValid::validate`] before starting the connection.
    pub fn tick(&mut self, now: Cycle, ports: &mut PortTable) -> Option<Delivery> {
        let (Some(ready), Some(valid)) = (self.ready, self.valid) else {
            panic!(
                "ready/valid connection `{}` ticked with unbound signal port",
                self.name
            );
        };

        if ports.signal_level(valid)
            && self.fifo.len() < self.capacity
            && let Some(mut packet) = ports.read(self.src)
        {
            packet.timestamp = now;
            self.fifo.push_back(packet);
            trace!(target: "scsim::fabric", "{} enqueue t={now} depth={}", self.name, self.fifo.len());
        }

        if ports.signal_level(ready) && !self.fifo.is_empty() && !ports.has_data(self.dst) {
            // Nonempty checked above, so the pop always yields a packet.
            let mut packet = self.fifo.pop_front()?;
            packet.timestamp = now;
            self.transfers += 1;
            trace!(target: "scsim::fabric", "{} deliver t={now}", self.name);
            if self.latency == 0 {
                ports.write(self.dst, packet);
            } else {
                return Some(Delivery {
                    due: now + self.latency,
                    port: self.dst,
                    packet,
                });
            }
        }
        None
    }

    /// Empties the FIFO and zeroes the counters; bindings survive.
    pub fn reset(&mut self) {
        self.fifo.clear();
        self.transfers = 0;
        self.ticker.reset();
    }
}
