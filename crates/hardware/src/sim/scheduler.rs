//! Discrete-event scheduler with delta cycles.
//!
//! [`Scheduler`] owns the virtual clock, an arena of cooperative processes, and the shared
//! state they operate on. It provides:
//! 1. **Ordering:** Wakeups are kept in a min-heap keyed by `(time, delta, registration)`, so
//!    processes due together always resume in the order they were spawned.
//! 2. **Delta cycles:** A zero-length wait reschedules a process at the same time in the next
//!    delta; all deltas of a timestamp drain before the clock advances.
//! 3. **Livelock detection:** Too many deltas at one timestamp abort the run.
//! 4. **Run control:** Bounded (`RunLimit::For`) or unbounded runs, resumable across calls.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::common::{SimError, SimTime};

/// Default maximum number of delta cycles per timestamp.
pub const DEFAULT_MAX_DELTA: u32 = 10_000;

/// Handle to a process registered with a scheduler (its registration index).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProcessId(pub usize);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proc{}", self.0)
    }
}

/// What a process asks for when it yields control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Suspend {
    /// Resume after the given duration; zero means the next delta cycle.
    For(SimTime),
    /// Never resume.
    Forever,
    /// The process has finished.
    Done,
}

/// Lifecycle state of a registered process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    /// Scheduled to run at the current time and delta.
    Runnable,
    /// Waiting for a timed wakeup at the given time.
    Waiting(SimTime),
    /// Suspended with no wakeup.
    WaitingForever,
    /// Returned [`Suspend::Done`].
    Terminated,
}

/// View of the scheduler handed to a process while it runs.
#[derive(Debug)]
pub struct ProcessContext<'a, S> {
    now: SimTime,
    delta: u32,
    id: ProcessId,
    shared: &'a mut S,
}

impl<S> ProcessContext<'_, S> {
    /// Current global simulated time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Delta cycle index within the current timestamp.
    pub fn delta(&self) -> u32 {
        self.delta
    }

    /// Handle of the running process.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Shared state, read-only.
    pub fn shared(&self) -> &S {
        self.shared
    }

    /// Shared state, mutable.
    pub fn shared_mut(&mut self) -> &mut S {
        self.shared
    }
}

/// A cooperative logical execution context.
///
/// `resume` runs until the process needs virtual time to pass and then returns how long it
/// wants to wait. Processes are explicit state machines: anything that must survive a
/// suspension lives in `self`.
pub trait Process<S> {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Runs the process until its next suspension point.
    fn resume(&mut self, ctx: &mut ProcessContext<'_, S>) -> Suspend;
}

/// How far a call to [`Scheduler::run`] may advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunLimit {
    /// Run every wakeup strictly before `now + duration`, then set the clock to that time.
    For(SimTime),
    /// Run until no wakeup remains.
    Unbounded,
}

/// Why a run returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// The requested duration elapsed.
    TimeLimit,
    /// No wakeup was pending.
    Starved,
}

/// Outcome of one call to [`Scheduler::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Clock value when the run started.
    pub start: SimTime,
    /// Clock value when the run returned.
    pub end: SimTime,
    /// Number of process resumptions.
    pub resumptions: u64,
    /// Number of non-initial delta cycles executed.
    pub delta_cycles: u64,
    /// Why the run returned.
    pub stop: StopReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Wakeup {
    time: SimTime,
    delta: u32,
    process: ProcessId,
}

struct Slot<S> {
    process: Box<dyn Process<S>>,
    state: ProcessState,
}

/// Discrete-event scheduler over processes sharing a state value `S`.
pub struct Scheduler<S> {
    now: SimTime,
    queue: BinaryHeap<Reverse<Wakeup>>,
    processes: Vec<Slot<S>>,
    shared: S,
    max_delta: u32,
}

impl<S> Scheduler<S> {
    /// Creates a scheduler at time zero around the shared state.
    pub fn new(shared: S) -> Self {
        Self {
            now: SimTime::ZERO,
            queue: BinaryHeap::new(),
            processes: Vec::new(),
            shared,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Sets the maximum number of delta cycles allowed at one timestamp.
    ///
    /// The limit is capped one below `u32::MAX` so the delta counter can always exceed it.
    pub fn with_delta_limit(mut self, limit: u32) -> Self {
        self.max_delta = limit.min(u32::MAX - 1);
        self
    }

    /// Maximum number of delta cycles allowed at one timestamp.
    pub fn delta_limit(&self) -> u32 {
        self.max_delta
    }

    /// Registers a process that first runs at the current time.
    pub fn spawn(&mut self, process: impl Process<S> + 'static) -> ProcessId {
        self.spawn_at(SimTime::ZERO, process)
    }

    /// Registers a process that first runs after `delay`.
    pub fn spawn_at(&mut self, delay: SimTime, process: impl Process<S> + 'static) -> ProcessId {
        let id = ProcessId(self.processes.len());
        let state = if delay.is_zero() {
            ProcessState::Runnable
        } else {
            ProcessState::Waiting(self.now + delay)
        };
        debug!(process = process.name(), %id, %delay, "process spawned");
        self.processes.push(Slot {
            process: Box::new(process),
            state,
        });
        self.queue.push(Reverse(Wakeup {
            time: self.now + delay,
            delta: 0,
            process: id,
        }));
        id
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// State of a process, or `None` for an unknown handle.
    pub fn state(&self, id: ProcessId) -> Option<ProcessState> {
        self.processes.get(id.0).map(|s| s.state)
    }

    /// Name of a process, or `None` for an unknown handle.
    pub fn process_name(&self, id: ProcessId) -> Option<&str> {
        self.processes.get(id.0).map(|s| s.process.name())
    }

    /// Number of registered processes (including terminated ones).
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Number of pending wakeups.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Shared state, read-only.
    pub fn shared(&self) -> &S {
        &self.shared
    }

    /// Shared state, mutable (between runs).
    pub fn shared_mut(&mut self) -> &mut S {
        &mut self.shared
    }

    /// Consumes the scheduler and returns the shared state.
    pub fn into_shared(self) -> S {
        self.shared
    }

    /// Advances simulated time by executing due processes.
    ///
    /// # Arguments
    ///
    /// * `limit` - `RunLimit::For(d)` runs every wakeup strictly before `now + d` and leaves
    ///   the clock at `now + d`; `RunLimit::Unbounded` runs until the queue is empty.
    ///
    /// # Returns
    ///
    /// A [`RunSummary`], [`SimError::ZeroDuration`] for a zero bounded duration (nothing
    /// executes), or [`SimError::DeltaLimitExceeded`] when a timestamp needs more delta
    /// cycles than allowed. The offending wakeup stays queued.
    pub fn run(&mut self, limit: RunLimit) -> Result<RunSummary, SimError> {
        let end = match limit {
            RunLimit::For(d) if d.is_zero() => return Err(SimError::ZeroDuration),
            RunLimit::For(d) => Some(self.now + d),
            RunLimit::Unbounded => None,
        };
        let start = self.now;
        let mut resumptions = 0u64;
        let mut delta_cycles = 0u64;
        let mut last_slot: Option<(SimTime, u32)> = None;

        debug!(%start, end = ?end, pending = self.queue.len(), "run started");

        loop {
            let Some(&Reverse(next)) = self.queue.peek() else {
                break;
            };
            if let Some(end) = end {
                if next.time >= end {
                    break;
                }
            }
            if next.delta > self.max_delta {
                self.now = next.time;
                return Err(SimError::DeltaLimitExceeded {
                    time: next.time,
                    limit: self.max_delta,
                });
            }
            let _ = self.queue.pop();
            if next.delta > 0 && last_slot != Some((next.time, next.delta)) {
                delta_cycles += 1;
            }
            last_slot = Some((next.time, next.delta));
            self.now = next.time;

            let slot = &mut self.processes[next.process.0];
            slot.state = ProcessState::Runnable;
            let mut ctx = ProcessContext {
                now: next.time,
                delta: next.delta,
                id: next.process,
                shared: &mut self.shared,
            };
            let suspend = slot.process.resume(&mut ctx);
            resumptions += 1;
            trace!(
                process = slot.process.name(),
                time = %next.time,
                delta = next.delta,
                ?suspend,
                "process resumed"
            );

            match suspend {
                Suspend::For(d) => {
                    let wakeup = if d.is_zero() {
                        Wakeup {
                            time: next.time,
                            delta: next.delta.saturating_add(1),
                            process: next.process,
                        }
                    } else {
                        Wakeup {
                            time: next.time + d,
                            delta: 0,
                            process: next.process,
                        }
                    };
                    slot.state = ProcessState::Waiting(wakeup.time);
                    self.queue.push(Reverse(wakeup));
                }
                Suspend::Forever => slot.state = ProcessState::WaitingForever,
                Suspend::Done => slot.state = ProcessState::Terminated,
            }
        }

        let stop = if self.queue.is_empty() {
            StopReason::Starved
        } else {
            StopReason::TimeLimit
        };
        if let Some(end) = end {
            self.now = end;
        }

        debug!(end = %self.now, resumptions, delta_cycles, ?stop, "run finished");

        Ok(RunSummary {
            start,
            end: self.now,
            resumptions,
            delta_cycles,
            stop,
        })
    }
}

impl<S: fmt::Debug> fmt::Debug for Scheduler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.processes.iter().map(|s| s.process.name()).collect();
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("processes", &names)
            .field("pending", &self.queue.len())
            .field("max_delta", &self.max_delta)
            .field("shared", &self.shared)
            .finish()
    }
}
