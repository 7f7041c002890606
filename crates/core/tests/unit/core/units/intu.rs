//! ALU operation tables and lane pipelining.
//!
//! The pure evaluator gets a deterministic vector table per operation
//! group; the lane test drives commands through the ports to check the
//! 3-stage timing and the duplicated outputs.

use proptest::prelude::*;
use rstest::rstest;
use scsim_core::core::units::intu::{execute_operation, Intu};
use scsim_core::core::units::ops::AluOp;
use scsim_core::fabric::packet::{Packet, Payload};
use scsim_core::fabric::port::PortTable;

// ─── Pure evaluator tables ─────────────────────────────────────────────

#[rstest]
#[case(AluOp::Add, 5, 7, 12)]
#[case(AluOp::Add, u32::MAX, 1, 0)]
#[case(AluOp::Sub, 5, 7, (-2i32) as u32)]
#[case(AluOp::Slt, (-1i32) as u32, 0, 1)]
#[case(AluOp::Slt, 0, (-1i32) as u32, 0)]
#[case(AluOp::Sltu, (-1i32) as u32, 0, 0)]
#[case(AluOp::Xor, 0b1100, 0b1010, 0b0110)]
#[case(AluOp::Or, 0b1100, 0b1010, 0b1110)]
#[case(AluOp::And, 0b1100, 0b1010, 0b1000)]
#[case(AluOp::Lui, 0, 0x12345, 0x1234_5000)]
fn rv32i_vectors(#[case] op: AluOp, #[case] a: u32, #[case] b: u32, #[case] expect: u32) {
    assert_eq!(execute_operation(a, b, op), expect);
}

#[rstest]
#[case(AluOp::Sll, 1, 4, 0x10)]
#[case(AluOp::Sll, 1, 33, 2)]
#[case(AluOp::Srl, 0x8000_0000, 31, 1)]
#[case(AluOp::Sra, 0x8000_0000, 31, 0xFFFF_FFFF)]
#[case(AluOp::Rol, 0x8000_0001, 1, 3)]
#[case(AluOp::Ror, 3, 1, 0x8000_0001)]
#[case(AluOp::Ror, 3, 33, 0x8000_0001)]
fn shift_and_rotate_vectors(#[case] op: AluOp, #[case] a: u32, #[case] b: u32, #[case] expect: u32) {
    assert_eq!(execute_operation(a, b, op), expect);
}

#[rstest]
#[case(AluOp::Andn, 0b1111, 0b0101, 0b1010)]
#[case(AluOp::Orn, 0, 0xFFFF_FFF0, 0xF)]
#[case(AluOp::Xnor, 0xFFFF_FFFF, 0, 0)]
#[case(AluOp::Clz, 0x0000_FFFF, 0, 16)]
#[case(AluOp::Ctz, 0x8000_0000, 0, 31)]
#[case(AluOp::Cpop, 0xF0F0_F0F0, 0, 16)]
#[case(AluOp::Max, (-5i32) as u32, 3, 3)]
#[case(AluOp::Maxu, (-5i32) as u32, 3, (-5i32) as u32)]
#[case(AluOp::Min, (-5i32) as u32, 3, (-5i32) as u32)]
#[case(AluOp::Minu, (-5i32) as u32, 3, 3)]
#[case(AluOp::Sextb, 0x80, 0, 0xFFFF_FF80)]
#[case(AluOp::Sextb, 0x7F, 0, 0x7F)]
#[case(AluOp::Sexth, 0x8000, 0, 0xFFFF_8000)]
#[case(AluOp::Zexth, 0xABCD_8000, 0, 0x8000)]
#[case(AluOp::Rev8, 0x1122_3344, 0, 0x4433_2211)]
#[case(AluOp::Orcb, 0x0001_0100, 0, 0x00FF_FF00)]
fn zbb_vectors(#[case] op: AluOp, #[case] a: u32, #[case] b: u32, #[case] expect: u32) {
    assert_eq!(execute_operation(a, b, op), expect);
}

#[test]
fn pass_through_operations() {
    assert_eq!(execute_operation(11, 22, AluOp::PassA), 11);
    assert_eq!(execute_operation(11, 22, AluOp::PassB), 22);
}

proptest! {
    /// Referential transparency: same inputs, same output, across every op.
    #[test]
    fn evaluator_is_deterministic(a: u32, b: u32) {
        for op in [
            AluOp::Add, AluOp::Sub, AluOp::Slt, AluOp::Sltu, AluOp::Xor,
            AluOp::Or, AluOp::And, AluOp::Sll, AluOp::Srl, AluOp::Sra,
            AluOp::Clz, AluOp::Ctz, AluOp::Cpop, AluOp::Rol, AluOp::Ror,
        ] {
            prop_assert_eq!(execute_operation(a, b, op), execute_operation(a, b, op));
        }
    }

    /// A rotate right undoes the matching rotate left.
    #[test]
    fn rotates_are_inverses(a: u32, s in 0u32..32) {
        let rolled = execute_operation(a, s, AluOp::Rol);
        prop_assert_eq!(execute_operation(rolled, s, AluOp::Ror), a);
    }

    /// Shift amounts reduce mod 32.
    #[test]
    fn shift_masking(a: u32, s in 0u32..256) {
        prop_assert_eq!(
            execute_operation(a, s, AluOp::Sll),
            execute_operation(a, s & 0x1F, AluOp::Sll)
        );
    }
}

// ─── Lane pipelining ───────────────────────────────────────────────────

#[test]
fn lane_latency_and_duplicated_outputs() {
    let mut ports = PortTable::new();
    let mut lane = Intu::new("intu0", 1, &mut ports).unwrap();
    ports.write(
        lane.in_port,
        Packet::new(
            Payload::AluCmd {
                a: 5,
                b: 7,
                op: AluOp::Add,
                rd: 3,
            },
            0,
        ),
    );
    for t in 0..3u64 {
        lane.tick(t, &mut ports);
        assert!(!ports.has_data(lane.out_port));
    }
    lane.tick(3, &mut ports);
    let out = ports.read(lane.out_port).unwrap();
    assert!(matches!(out.payload, Payload::AluResult { value: 12, rd: 3 }));
    assert!(matches!(
        ports.read(lane.rd_out).map(|p| p.payload),
        Some(Payload::Value(3))
    ));
    assert!(matches!(
        ports.read(lane.data_out).map(|p| p.payload),
        Some(Payload::Value(12))
    ));
    assert_eq!(lane.ops_executed(), 1);
}

#[test]
fn lane_sustains_one_result_per_tick() {
    let mut ports = PortTable::new();
    let mut lane = Intu::new("intu0", 1, &mut ports).unwrap();
    let mut results = Vec::new();
    for t in 0..10u64 {
        ports.write(
            lane.in_port,
            Packet::new(
                Payload::AluCmd {
                    a: t as u32,
                    b: 1,
                    op: AluOp::Add,
                    rd: 1,
                },
                t,
            ),
        );
        lane.tick(t, &mut ports);
        if let Some(p) = ports.read(lane.out_port) {
            if let Payload::AluResult { value, .. } = p.payload {
                results.push(value);
            }
        }
    }
    assert_eq!(results, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn stall_signal_freezes_the_lane() {
    let mut ports = PortTable::new();
    let mut lane = Intu::new("intu0", 1, &mut ports).unwrap();
    ports.write(
        lane.in_port,
        Packet::new(
            Payload::AluCmd {
                a: 1,
                b: 1,
                op: AluOp::Add,
                rd: 1,
            },
            0,
        ),
    );
    lane.tick(0, &mut ports);
    ports.write(lane.stall_port, Packet::signal(true, 1));
    for t in 1..5u64 {
        lane.tick(t, &mut ports);
        assert!(!ports.has_data(lane.out_port));
    }
    ports.write(lane.stall_port, Packet::signal(false, 5));
    lane.tick(5, &mut ports);
    lane.tick(6, &mut ports);
    lane.tick(7, &mut ports);
    assert!(ports.has_data(lane.out_port));
    assert!(lane.pipe.total_stalls() >= 4);
}
