//! Multi-Initiator Scenario Tests.
//!
//! Runs scripted and demo processes on the scheduler and checks the
//! observable memory traffic: causal ordering across decoupled initiators,
//! explicit waits, livelock detection, and the producer/consumer demo in both
//! timing modes.

use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::{config_with_quantum, init_tracing, memory_system};
use tlmsim_core::SimTime;
use tlmsim_core::common::SimError;
use tlmsim_core::config::Config;
use tlmsim_core::demo::{self, DemoMode};
use tlmsim_core::initiator::{Access, Initiator, Op, ProgramProcess};
use tlmsim_core::sim::{RunLimit, Scheduler, StopReason};
use tlmsim_core::soc::interconnect::PortId;
use tlmsim_core::tlm::{Command, GlobalQuantum, ResponseStatus};

fn quantum(ns: u64) -> GlobalQuantum {
    GlobalQuantum::new(SimTime::from_ns(ns)).unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Two decoupled initiators
// ══════════════════════════════════════════════════════════

#[test]
fn resynchronized_reader_observes_masked_write() {
    init_tracing();
    let mut system = memory_system(2, 5, 5);
    system
        .memory_mut()
        .unwrap()
        .load(&0xDEAD_BE00u32.to_le_bytes(), 0);
    let q = quantum(10);

    let writer = ProgramProcess::once(
        Initiator::decoupled("A", PortId(0), q),
        vec![
            Op::Compute(SimTime::from_ns(4)),
            Op::Access(Access::write_word(0x00, 0x0000_000A).with_word_mask(0x0000_00FF)),
            Op::Sync,
        ],
    );
    let reader = ProgramProcess::once(
        Initiator::decoupled("B", PortId(1), q),
        vec![
            Op::Sync,
            Op::Access(Access::read_word(0x00).with_word_mask(0xFFFF_FFFF)),
        ],
    );

    let mut sched = Scheduler::new(system);
    let _ = sched.spawn(writer);
    let _ = sched.spawn_at(SimTime::from_ns(10), reader);
    let summary = sched.run(RunLimit::Unbounded).unwrap();
    assert_eq!(summary.stop, StopReason::Starved);

    let system = sched.into_shared();
    let events: Vec<_> = system.trace.events().collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].initiator, "A");
    assert_eq!(events[0].local_offset, SimTime::from_ns(4));
    assert_eq!(events[1].initiator, "B");
    assert_eq!(events[1].command, Command::Read);
    assert_eq!(events[1].response, ResponseStatus::Ok);
    assert_eq!(events[1].data_word(), 0xDEAD_BE0A);
    assert!(events[0].effective_time() < events[1].effective_time());
    assert_eq!(system.memory().unwrap().read_word(0), 0xDEAD_BE0A);
}

// ══════════════════════════════════════════════════════════
// 2. Scripted programs
// ══════════════════════════════════════════════════════════

#[test]
fn explicit_wait_flushes_pending_offset_first() {
    let mut sched = Scheduler::new(memory_system(1, 5, 5));
    let program = ProgramProcess::once(
        Initiator::decoupled("cpu", PortId(0), quantum(100)),
        vec![
            Op::Compute(SimTime::from_ns(3)),
            Op::Wait(SimTime::from_ns(10)),
        ],
    );
    let _ = sched.spawn(program);
    let summary = sched.run(RunLimit::Unbounded).unwrap();
    assert_eq!(summary.end, SimTime::from_ns(13));
    let stats = &sched.shared().stats.initiators["cpu"];
    assert_eq!(stats.waited, SimTime::from_ns(3));
}

#[test]
fn immediate_program_waits_after_each_step() {
    let mut sched = Scheduler::new(memory_system(1, 5, 5));
    let program = ProgramProcess::once(
        Initiator::immediate("cpu", PortId(0)),
        vec![
            Op::Compute(SimTime::from_ns(2)),
            Op::Access(Access::write_word(0x8, 7)),
            Op::Access(Access::read_word(0x8)),
        ],
    );
    let _ = sched.spawn(program);
    let summary = sched.run(RunLimit::Unbounded).unwrap();

    assert_eq!(summary.end, SimTime::from_ns(12));
    let stamps: Vec<SimTime> = sched.shared().trace.events().map(|e| e.timestamp).collect();
    assert_eq!(stamps, vec![SimTime::from_ns(2), SimTime::from_ns(7)]);
    assert_eq!(sched.shared().trace.last().unwrap().data_word(), 7);
}

#[test]
fn zero_time_loop_is_detected() {
    let mut sched = Scheduler::new(memory_system(1, 5, 5)).with_delta_limit(50);
    let program = ProgramProcess::looping(
        Initiator::decoupled("spin", PortId(0), quantum(10)),
        vec![Op::Access(Access::ignore(0))],
    );
    let _ = sched.spawn(program);
    let err = sched.run(RunLimit::For(SimTime::from_ns(10))).unwrap_err();
    assert!(matches!(err, SimError::DeltaLimitExceeded { limit: 50, .. }));
    assert!(sched.shared().stats.ignored > 0);
}

// ══════════════════════════════════════════════════════════
// 3. Producer/consumer demo
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(DemoMode::Synchronous)]
#[case(DemoMode::Decoupled)]
fn consumer_reads_what_the_producer_wrote(#[case] mode: DemoMode) {
    let config = Config::default();
    let mut sched = demo::producer_consumer(&config, mode).unwrap();
    let _ = sched.run(RunLimit::For(SimTime::from_ns(100))).unwrap();
    let system = sched.into_shared();

    let received: Vec<u8> = system.trace.by_initiator("cpu1").map(|e| e.data[0]).collect();
    assert_eq!(received, vec![0, 1, 2]);
    assert_eq!(system.stats.writes, 4);
    assert_eq!(system.stats.errors, 0);
    assert_eq!(system.memory().unwrap().read_word(0), 0x0302_0100);
}

#[test]
fn decoupling_reduces_synchronizations() {
    let config = config_with_quantum(10);
    let duration = SimTime::from_ns(100);
    let sync = demo::run(&config, DemoMode::Synchronous, duration).unwrap();
    let decoupled = demo::run(&config, DemoMode::Decoupled, duration).unwrap();

    assert!(decoupled.stats.total_syncs() < sync.stats.total_syncs());
    assert!(decoupled.summary.resumptions < sync.summary.resumptions);
    assert_eq!(sync.summary.end, duration);
    assert_eq!(decoupled.memory[0], (0, 0x0302_0100));
}

#[test]
fn demo_needs_two_ports() {
    let mut config = Config::default();
    config.bus.ports = 1;
    assert!(matches!(
        demo::producer_consumer(&config, DemoMode::Synchronous),
        Err(SimError::Config(_))
    ));
}

#[rstest]
#[case("sync", DemoMode::Synchronous)]
#[case("Decoupled", DemoMode::Decoupled)]
fn demo_mode_parses(#[case] text: &str, #[case] mode: DemoMode) {
    assert_eq!(text.parse::<DemoMode>().unwrap(), mode);
    assert!("warp".parse::<DemoMode>().is_err());
}
