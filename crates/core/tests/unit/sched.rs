//! Scheduler behavior through the public API: ordering, cancellation,
//! horizons, and determinism.

use proptest::prelude::*;
use scsim_core::sched::Scheduler;
use scsim_core::SimError;

#[test]
fn events_dispatch_in_time_order() {
    let mut sched: Scheduler<u32> = Scheduler::new();
    for (t, v) in [(9, 3), (1, 1), (5, 2)] {
        sched.schedule(t, 0, v).unwrap();
    }
    let order: Vec<u32> = std::iter::from_fn(|| sched.pop_due(None).map(|e| e.action)).collect();
    assert_eq!(order, vec![1, 2, 3]);
}

#[test]
fn priority_then_fifo_within_a_cycle() {
    let mut sched: Scheduler<&str> = Scheduler::new();
    sched.schedule(4, 0, "third").unwrap();
    sched.schedule(4, 2, "first").unwrap();
    sched.schedule(4, 1, "second").unwrap();
    sched.schedule(4, 0, "fourth").unwrap();
    let order: Vec<&str> = std::iter::from_fn(|| sched.pop_due(None).map(|e| e.action)).collect();
    assert_eq!(order, vec!["first", "second", "third", "fourth"]);
}

#[test]
fn current_time_is_monotonic() {
    let mut sched: Scheduler<u32> = Scheduler::new();
    sched.schedule(3, 0, 0).unwrap();
    sched.schedule(3, 0, 1).unwrap();
    sched.schedule(7, 0, 2).unwrap();
    let mut last = 0;
    while let Some(ev) = sched.pop_due(None) {
        assert!(ev.time >= last);
        last = ev.time;
        assert_eq!(sched.current_time(), ev.time);
    }
}

#[test]
fn past_time_scheduling_is_rejected_not_executed() {
    let mut sched: Scheduler<u32> = Scheduler::new();
    sched.schedule(10, 0, 0).unwrap();
    let _ = sched.pop_due(None);
    let err = sched.schedule(9, 0, 99).unwrap_err();
    assert!(matches!(err, SimError::ScheduleInPast { requested: 9, now: 10 }));
    // The rejected event left no trace.
    assert_eq!(sched.pending_count(), 0);
    assert!(sched.pop_due(None).is_none());
}

#[test]
fn cancellation_skips_without_executing() {
    let mut sched: Scheduler<u32> = Scheduler::new();
    let a = sched.schedule(1, 0, 1).unwrap();
    let b = sched.schedule(2, 0, 2).unwrap();
    let c = sched.schedule(3, 0, 3).unwrap();
    assert!(sched.cancel(b));
    let survivors: Vec<u32> =
        std::iter::from_fn(|| sched.pop_due(None).map(|e| e.action)).collect();
    assert_eq!(survivors, vec![1, 3]);
    // Ids of executed events no longer cancel.
    assert!(!sched.cancel(a));
    assert!(!sched.cancel(c));
}

#[test]
fn run_horizon_is_inclusive() {
    let mut sched: Scheduler<u32> = Scheduler::new();
    sched.schedule(5, 0, 1).unwrap();
    sched.schedule(6, 0, 2).unwrap();
    assert!(sched.pop_due(Some(5)).is_some());
    assert!(sched.pop_due(Some(5)).is_none());
    assert_eq!(sched.pending_count(), 1);
}

proptest! {
    /// Whatever order events are scheduled in, they dispatch sorted by
    /// (time, priority desc, insertion order) — fully deterministic.
    #[test]
    fn dispatch_order_is_canonical(events in prop::collection::vec((0u64..50, 0u32..4), 1..40)) {
        let mut sched: Scheduler<usize> = Scheduler::new();
        for (i, (t, p)) in events.iter().enumerate() {
            sched.schedule(*t, *p, i).unwrap();
        }
        let popped: Vec<usize> =
            std::iter::from_fn(|| sched.pop_due(None).map(|e| e.action)).collect();
        let mut expect: Vec<usize> = (0..events.len()).collect();
        expect.sort_by_key(|&i| (events[i].0, std::cmp::Reverse(events[i].1), i));
        prop_assert_eq!(popped, expect);
    }
}
