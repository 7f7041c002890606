//! Wire connection behavior through the public API.

use scsim_core::common::Cycle;
use scsim_core::fabric::packet::{Packet, Payload};
use scsim_core::fabric::port::{Direction, PortId, PortTable};
use scsim_core::fabric::wire::Wire;

fn rig() -> (PortTable, PortId, PortId) {
    let mut ports = PortTable::new();
    let src = ports.add("unit", "out", Direction::Out);
    let dst = ports.add("sink", "in", Direction::In);
    (ports, src, dst)
}

fn value(v: u32, t: Cycle) -> Packet {
    Packet::new(Payload::Value(v), t)
}

#[test]
fn one_transfer_per_tick() {
    let (mut ports, src, dst) = rig();
    let mut wire = Wire::new("w", src, Some(dst), 0, 1);
    ports.write(src, value(1, 0));
    let _ = wire.tick(0, &mut ports);
    assert_eq!(wire.transfers(), 1);
    // Nothing new on the source: no transfer.
    let _ = wire.tick(1, &mut ports);
    assert_eq!(wire.transfers(), 1);
}

#[test]
fn timestamp_refreshes_at_transfer() {
    let (mut ports, src, dst) = rig();
    let mut wire = Wire::new("w", src, Some(dst), 0, 1);
    ports.write(src, value(1, 0));
    let _ = wire.tick(7, &mut ports);
    assert_eq!(ports.read(dst).map(|p| p.timestamp), Some(7));
}

#[test]
fn latency_produces_deferred_delivery() {
    let (mut ports, src, dst) = rig();
    let mut wire = Wire::new("w", src, Some(dst), 2, 1);
    ports.write(src, value(9, 0));
    let delivery = wire.tick(3, &mut ports).unwrap();
    assert_eq!(delivery.due, 5);
    assert_eq!(delivery.port, dst);
    assert!(matches!(delivery.packet.payload, Payload::Value(9)));
    // The destination port is untouched until the owner delivers.
    assert!(!ports.has_data(dst));
}

#[test]
fn sustained_overflow_drops_and_counts() {
    let (mut ports, src, _) = rig();
    let mut wire = Wire::new("w", src, None, 0, 1);
    for t in 0..5u64 {
        ports.write(src, value(t as u32, t));
        let _ = wire.tick(t, &mut ports);
    }
    // Two slots survive out of five packets; the rest overwrote `next`.
    assert_eq!(wire.drops(), 3);
    assert_eq!(
        wire.take_current().map(|p| p.payload),
        Some(Payload::Value(0))
    );
    let _ = wire.tick(5, &mut ports);
    assert_eq!(
        wire.take_current().map(|p| p.payload),
        Some(Payload::Value(4))
    );
}

#[test]
fn reset_clears_slots_and_counters() {
    let (mut ports, src, _) = rig();
    let mut wire = Wire::new("w", src, None, 0, 1);
    ports.write(src, value(1, 0));
    let _ = wire.tick(0, &mut ports);
    wire.reset();
    assert!(wire.peek_current().is_none());
    assert_eq!(wire.transfers(), 0);
    assert_eq!(wire.drops(), 0);
}
