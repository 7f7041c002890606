//! Dispatch-rule tests over decoded groups (controller-level; the
//! end-to-end grouping scenarios live in `score`).

use scsim_core::core::arch::RegisterFile;
use scsim_core::core::decode::{decode, OpType};
use scsim_core::core::dispatch::{DenyReason, DispatchController};

use crate::common::encode;

fn regfile() -> RegisterFile {
    RegisterFile::new(32, 16, 8, true, 1)
}

#[test]
fn in_order_rule_first_deny_would_stop_the_cycle() {
    let ctrl = DispatchController::new();
    let mut rf = regfile();
    rf.set_busy(3);
    // Candidate 0 hazards on x3; the core stops there even though
    // candidate 1 would be clean.
    let blocked = decode(0, encode::add(4, 3, 1));
    let clean = decode(4, encode::add(5, 1, 2));
    assert_eq!(ctrl.check(&blocked, 0, &rf), Some(DenyReason::RawHazard));
    assert_eq!(ctrl.check(&clean, 1, &rf), None);
}

#[test]
fn waw_on_busy_destination_is_not_checked_only_sources() {
    // The scoreboard rule is RAW: a busy *destination* alone does not deny.
    let ctrl = DispatchController::new();
    let mut rf = regfile();
    rf.set_busy(5);
    let inst = decode(0, encode::add(5, 1, 2));
    assert_eq!(ctrl.check(&inst, 0, &rf), None);
}

#[test]
fn mlu_dvu_lsu_each_once_per_cycle() {
    let mut ctrl = DispatchController::new();
    let rf = regfile();
    for (word, op_type) in [
        (encode::mul(1, 2, 3), OpType::Mlu),
        (encode::div(4, 5, 6), OpType::Dvu),
        (encode::lw(7, 8, 0), OpType::Lsu),
    ] {
        let inst = decode(0, word);
        assert_eq!(ctrl.check(&inst, 0, &rf), None);
        ctrl.mark_dispatched(op_type);
        assert_eq!(ctrl.check(&inst, 1, &rf), Some(DenyReason::UnitBusy));
    }
    // A new cycle clears all three.
    ctrl.begin_cycle();
    for word in [encode::mul(1, 2, 3), encode::div(4, 5, 6), encode::lw(7, 8, 0)] {
        assert_eq!(ctrl.check(&decode(0, word), 0, &rf), None);
    }
}

#[test]
fn special_classes_slot_zero_only() {
    let ctrl = DispatchController::new();
    let rf = regfile();
    for word in [encode::ecall(), encode::mret(), encode::fence()] {
        let inst = decode(0, word);
        assert_eq!(ctrl.check(&inst, 0, &rf), None);
        assert_eq!(ctrl.check(&inst, 1, &rf), Some(DenyReason::SpecialSlot));
    }
}

#[test]
fn branches_are_not_slot_restricted() {
    let ctrl = DispatchController::new();
    let rf = regfile();
    let inst = decode(0, encode::beq(1, 2, 8));
    assert_eq!(ctrl.check(&inst, 1, &rf), None);
}
