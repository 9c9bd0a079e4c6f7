//! Event Scheduler Unit Tests.
//!
//! Verifies deterministic ordering of same-time wakeups, delta-cycle
//! semantics, livelock detection, and bounded/unbounded run control.

use pretty_assertions::assert_eq;
use rstest::rstest;

use tlmsim_core::SimTime;
use tlmsim_core::common::SimError;
use tlmsim_core::sim::{
    Process, ProcessContext, ProcessState, RunLimit, Scheduler, StopReason, Suspend,
};

#[derive(Debug, Default)]
struct Journal {
    entries: Vec<(String, SimTime, u32)>,
    flag: bool,
}

impl Journal {
    fn names_at(&self, time: SimTime) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, t, _)| *t == time)
            .map(|(n, _, _)| n.as_str())
            .collect()
    }
}

/// Logs every resumption and waits `period` up to `count` times.
struct Periodic {
    name: String,
    period: SimTime,
    count: u32,
}

impl Periodic {
    fn new(name: &str, period_ns: u64, count: u32) -> Self {
        Self {
            name: name.to_owned(),
            period: SimTime::from_ns(period_ns),
            count,
        }
    }
}

impl Process<Journal> for Periodic {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, Journal>) -> Suspend {
        let entry = (self.name.clone(), ctx.now(), ctx.delta());
        ctx.shared_mut().entries.push(entry);
        if self.count == 0 {
            return Suspend::Done;
        }
        self.count -= 1;
        Suspend::For(self.period)
    }
}

/// Waits in zero-time steps until another process raises the flag.
struct Poller;

impl Process<Journal> for Poller {
    fn name(&self) -> &str {
        "poller"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, Journal>) -> Suspend {
        let entry = ("poller".to_owned(), ctx.now(), ctx.delta());
        ctx.shared_mut().entries.push(entry);
        if ctx.shared().flag {
            Suspend::Done
        } else {
            Suspend::For(SimTime::ZERO)
        }
    }
}

struct Raiser;

impl Process<Journal> for Raiser {
    fn name(&self) -> &str {
        "raiser"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, Journal>) -> Suspend {
        ctx.shared_mut().flag = true;
        Suspend::Forever
    }
}

/// Never lets time pass.
struct Spinner;

impl Process<Journal> for Spinner {
    fn name(&self) -> &str {
        "spinner"
    }

    fn resume(&mut self, _ctx: &mut ProcessContext<'_, Journal>) -> Suspend {
        Suspend::For(SimTime::ZERO)
    }
}

// ══════════════════════════════════════════════════════════
// 1. Ordering
// ══════════════════════════════════════════════════════════

fn three_way_race() -> Vec<(String, SimTime, u32)> {
    let mut sched = Scheduler::new(Journal::default());
    let _ = sched.spawn(Periodic::new("c", 5, 3));
    let _ = sched.spawn(Periodic::new("a", 5, 3));
    let _ = sched.spawn(Periodic::new("b", 5, 3));
    let _ = sched.run(RunLimit::Unbounded).unwrap();
    sched.into_shared().entries
}

#[test]
fn same_time_wakeups_run_in_registration_order() {
    let entries = three_way_race();
    let journal = Journal {
        entries,
        flag: false,
    };
    for t in [0, 5, 10, 15] {
        assert_eq!(journal.names_at(SimTime::from_ns(t)), vec!["c", "a", "b"]);
    }
}

#[test]
fn repeated_runs_replay_identically() {
    assert_eq!(three_way_race(), three_way_race());
}

#[test]
fn earlier_wakeups_run_first_regardless_of_registration() {
    let mut sched = Scheduler::new(Journal::default());
    let _ = sched.spawn_at(SimTime::from_ns(7), Periodic::new("late", 1, 0));
    let _ = sched.spawn_at(SimTime::from_ns(3), Periodic::new("early", 1, 0));
    let _ = sched.run(RunLimit::Unbounded).unwrap();
    let names: Vec<&str> = sched.shared().entries.iter().map(|e| e.0.as_str()).collect();
    assert_eq!(names, vec!["early", "late"]);
}

// ══════════════════════════════════════════════════════════
// 2. Delta cycles
// ══════════════════════════════════════════════════════════

#[test]
fn zero_wait_resumes_in_next_delta_after_peers() {
    let mut sched = Scheduler::new(Journal::default());
    let poller = sched.spawn(Poller);
    let _ = sched.spawn(Raiser);
    let summary = sched.run(RunLimit::Unbounded).unwrap();

    assert_eq!(
        sched.shared().entries,
        vec![
            ("poller".to_owned(), SimTime::ZERO, 0),
            ("poller".to_owned(), SimTime::ZERO, 1),
        ]
    );
    assert_eq!(summary.delta_cycles, 1);
    assert_eq!(sched.now(), SimTime::ZERO);
    assert_eq!(sched.state(poller), Some(ProcessState::Terminated));
}

#[test]
fn zero_time_livelock_hits_the_delta_limit() {
    let mut sched = Scheduler::new(Journal::default()).with_delta_limit(5);
    let _ = sched.spawn_at(SimTime::from_ns(2), Spinner);
    let err = sched.run(RunLimit::For(SimTime::from_ns(100))).unwrap_err();
    assert!(matches!(
        err,
        SimError::DeltaLimitExceeded { time, limit: 5 } if time == SimTime::from_ns(2)
    ));
}

#[test]
fn delta_limit_error_keeps_the_pending_wakeup() {
    let mut sched = Scheduler::new(Journal::default()).with_delta_limit(3);
    let spinner = sched.spawn(Spinner);

    assert!(sched.run(RunLimit::Unbounded).is_err());
    assert_eq!(sched.pending(), 1);
    assert_eq!(
        sched.state(spinner),
        Some(ProcessState::Waiting(SimTime::ZERO))
    );
    assert_eq!(sched.process_name(spinner), Some("spinner"));

    let again = sched.run(RunLimit::For(SimTime::from_ns(1))).unwrap_err();
    assert!(matches!(again, SimError::DeltaLimitExceeded { limit: 3, .. }));
    assert_eq!(sched.pending(), 1);
}

#[test]
fn delta_limit_is_capped_below_counter_overflow() {
    let sched = Scheduler::new(Journal::default()).with_delta_limit(u32::MAX);
    assert_eq!(sched.delta_limit(), u32::MAX - 1);
    assert_eq!(sched.process_count(), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Run control
// ══════════════════════════════════════════════════════════

#[test]
fn zero_duration_runs_nothing() {
    let mut sched = Scheduler::new(Journal::default());
    let p = sched.spawn(Periodic::new("p", 1, 1));
    assert!(matches!(
        sched.run(RunLimit::For(SimTime::ZERO)),
        Err(SimError::ZeroDuration)
    ));
    assert!(sched.shared().entries.is_empty());
    assert_eq!(sched.state(p), Some(ProcessState::Runnable));
}

#[rstest]
#[case(10, 2)]
#[case(11, 3)]
#[case(25, 3)]
fn bounded_run_excludes_wakeups_at_the_end_time(#[case] run_ns: u64, #[case] resumed: usize) {
    let mut sched = Scheduler::new(Journal::default());
    let _ = sched.spawn(Periodic::new("p", 5, 2));
    let summary = sched.run(RunLimit::For(SimTime::from_ns(run_ns))).unwrap();
    assert_eq!(sched.shared().entries.len(), resumed);
    assert_eq!(summary.end, SimTime::from_ns(run_ns));
    assert_eq!(sched.now(), SimTime::from_ns(run_ns));
}

#[test]
fn runs_continue_where_the_previous_one_stopped() {
    let mut sched = Scheduler::new(Journal::default());
    let _ = sched.spawn(Periodic::new("p", 4, 100));
    let first = sched.run(RunLimit::For(SimTime::from_ns(10))).unwrap();
    let second = sched.run(RunLimit::For(SimTime::from_ns(10))).unwrap();

    assert_eq!(first.stop, StopReason::TimeLimit);
    assert_eq!(second.start, SimTime::from_ns(10));
    assert_eq!(second.end, SimTime::from_ns(20));
    assert_eq!(first.resumptions + second.resumptions, 5);
    assert_eq!(
        sched.shared().entries.last().map(|e| e.1),
        Some(SimTime::from_ns(16))
    );
}

#[test]
fn starved_bounded_run_still_advances_the_clock() {
    let mut sched = Scheduler::new(Journal::default());
    let p = sched.spawn(Raiser);
    let summary = sched.run(RunLimit::For(SimTime::from_ns(50))).unwrap();
    assert_eq!(summary.stop, StopReason::Starved);
    assert_eq!(sched.now(), SimTime::from_ns(50));
    assert_eq!(sched.state(p), Some(ProcessState::WaitingForever));
}

#[test]
fn unbounded_run_returns_once_the_queue_is_empty() {
    let mut sched = Scheduler::new(Journal::default());
    let _ = sched.spawn(Periodic::new("p", 3, 4));
    let summary = sched.run(RunLimit::Unbounded).unwrap();
    assert_eq!(summary.stop, StopReason::Starved);
    assert_eq!(summary.end, SimTime::from_ns(12));
    assert_eq!(summary.resumptions, 5);
    assert_eq!(sched.pending(), 0);
}
