//! Ports and the port arena.
//!
//! A port is a named, directional, single-slot packet holder owned by a
//! component. All ports live in one [`PortTable`] arena and are addressed by
//! [`PortId`] handles; components store handles, connections store handles,
//! and nobody holds a reference into anybody else.
//!
//! A port holds at most one packet. Writing while full overwrites — the
//! connection types buffer internally precisely so that well-formed fabrics
//! never lose packets this way. Reading consumes.

use super::packet::Packet;

/// Handle to a port in the [`PortTable`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(pub(crate) u32);

/// Dataflow direction of a port, from its owner's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The owner reads from this port.
    In,
    /// The owner writes to this port.
    Out,
}

/// A named single-slot data slot owned by a component.
#[derive(Debug)]
pub struct Port {
    /// Port name, unique within its owner.
    pub name: String,
    /// Dataflow direction.
    pub direction: Direction,
    /// Name of the owning component.
    pub owner: String,
    data: Option<Packet>,
}

impl Port {
    /// True iff the port holds a valid packet.
    pub fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|p| p.valid)
    }

    /// Takes the packet out of the port.
    pub fn read(&mut self) -> Option<Packet> {
        self.data.take().filter(|p| p.valid)
    }

    /// Looks at the packet without consuming it.
    pub fn peek(&self) -> Option<&Packet> {
        self.data.as_ref().filter(|p| p.valid)
    }

    /// Writes a packet, replacing whatever was there.
    pub fn write(&mut self, packet: Packet) {
        self.data = Some(packet);
    }

    /// Drops any held packet.
    pub fn clear(&mut self) {
        self.data = None;
    }
}

/// Arena of all ports in a machine.
#[derive(Debug, Default)]
pub struct PortTable {
    ports: Vec<Port>,
}

impl PortTable {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new empty port and returns its handle.
    pub fn add(&mut self, owner: &str, name: &str, direction: Direction) -> PortId {
        let id = PortId(self.ports.len() as u32);
        self.ports.push(Port {
            name: name.to_string(),
            direction,
            owner: owner.to_string(),
            data: None,
        });
        id
    }

    /// Borrows a port.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this arena. Handles are only
    /// produced by [`PortTable::add`], so this cannot happen in a machine
    /// built through the normal constructors.
    pub fn port(&self, id: PortId) -> &Port {
        &self.ports[id.0 as usize]
    }

    /// Mutably borrows a port.
    ///
    /// # Panics
    ///
    /// Panics under the same (unreachable-by-construction) condition as
    /// [`PortTable::port`].
    pub fn port_mut(&mut self, id: PortId) -> &mut Port {
        &mut self.ports[id.0 as usize]
    }

    /// Convenience: true iff the port holds a valid packet.
    pub fn has_data(&self, id: PortId) -> bool {
        self.port(id).has_data()
    }

    /// Convenience: consumes and returns the port's packet.
    pub fn read(&mut self, id: PortId) -> Option<Packet> {
        self.port_mut(id).read()
    }

    /// Convenience: writes a packet to the port.
    pub fn write(&mut self, id: PortId, packet: Packet) {
        self.port_mut(id).write(packet);
    }

    /// Level of a signal port: true iff it holds a valid `Signal(true)`.
    ///
    /// Signal ports are level-sensitive, so observing them does not consume.
    pub fn signal_level(&self, id: PortId) -> bool {
        matches!(
            self.port(id).peek(),
            Some(Packet {
                payload: super::packet::Payload::Signal(true),
                ..
            })
        )
    }

    /// Number of allocated ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// True when no ports have been allocated.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Empties every port slot, leaving the arena layout intact.
    pub fn clear_all(&mut self) {
        for port in &mut self.ports {
            port.clear();
        }
    }
}
