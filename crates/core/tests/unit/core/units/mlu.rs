//! Multiplier timing and half selection through the ports.

use rstest::rstest;
use scsim_core::core::units::mlu::{widen_product, Mlu};
use scsim_core::core::units::ops::MluOp;
use scsim_core::fabric::packet::{Packet, Payload};
use scsim_core::fabric::port::PortTable;

fn run_product(op: MluOp, a: u32, b: u32) -> u32 {
    let mut ports = PortTable::new();
    let mut mlu = Mlu::new("mlu", 1, &mut ports).unwrap();
    ports.write(
        mlu.in_port,
        Packet::new(
            Payload::MluCmd {
                rd: 1,
                op,
                product: widen_product(a, b, op),
            },
            0,
        ),
    );
    for t in 0..8u64 {
        mlu.tick(t, &mut ports);
        if let Some(p) = ports.read(mlu.out_port) {
            if let Payload::MluResult { value, .. } = p.payload {
                return value;
            }
        }
    }
    panic!("no result");
}

#[rstest]
#[case(MluOp::Mul, 7, 6, 42)]
#[case(MluOp::Mul, 0xFFFF_FFFF, 0xFFFF_FFFF, 1)] // (-1)*(-1)
#[case(MluOp::Mulh, 0xFFFF_FFFF, 0xFFFF_FFFF, 0)]
#[case(MluOp::Mulhu, 0xFFFF_FFFF, 0xFFFF_FFFF, 0xFFFF_FFFE)]
#[case(MluOp::Mulhsu, 0xFFFF_FFFF, 0xFFFF_FFFF, 0xFFFF_FFFF)]
#[case(MluOp::Mulh, 0x4000_0000, 4, 1)] // 2^30 * 4 = 2^32
fn product_halves(#[case] op: MluOp, #[case] a: u32, #[case] b: u32, #[case] expect: u32) {
    assert_eq!(run_product(op, a, b), expect);
}

#[test]
fn effective_latency_is_three_ticks() {
    let mut ports = PortTable::new();
    let mut mlu = Mlu::new("mlu", 1, &mut ports).unwrap();
    ports.write(
        mlu.in_port,
        Packet::new(
            Payload::MluCmd {
                rd: 2,
                op: MluOp::Mul,
                product: widen_product(3, 3, MluOp::Mul),
            },
            0,
        ),
    );
    let mut seen_at = None;
    for t in 0..6u64 {
        mlu.tick(t, &mut ports);
        if ports.read(mlu.out_port).is_some() && seen_at.is_none() {
            seen_at = Some(t);
        }
    }
    assert_eq!(seen_at, Some(3));
}

#[test]
fn warm_pipeline_streams_results() {
    let mut ports = PortTable::new();
    let mut mlu = Mlu::new("mlu", 1, &mut ports).unwrap();
    let mut results = 0;
    for t in 0..10u64 {
        ports.write(
            mlu.in_port,
            Packet::new(
                Payload::MluCmd {
                    rd: 1,
                    op: MluOp::Mul,
                    product: widen_product(t as u32, 2, MluOp::Mul),
                },
                t,
            ),
        );
        mlu.tick(t, &mut ports);
        if ports.read(mlu.out_port).is_some() {
            results += 1;
        }
    }
    assert_eq!(results, 7);
    assert_eq!(mlu.ops_executed(), 8);
}
