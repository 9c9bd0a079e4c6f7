//! Transaction initiators.
//!
//! This module implements the initiator side of the transaction protocol. It provides:
//! 1. **Initiator:** Issues transactions through a router port and keeps its local time
//!    offset according to a [`TimingPolicy`].
//! 2. **Programs:** [`ProgramProcess`] drives an initiator from a scripted list of operations
//!    as a scheduler process.
//!
//! An initiator never blocks. Whenever its context has to let virtual time pass, the
//! operation returns the duration to wait and the calling process yields it to the
//! scheduler as `Suspend::For`.

/// Scripted initiator processes.
pub mod program;
/// Immediate and quantum-based timing policies.
pub mod timing;

use tracing::{debug, trace};

pub use program::{Access, Op, ProgramProcess};
pub use timing::TimingPolicy;

use crate::common::SimTime;
use crate::soc::System;
use crate::soc::interconnect::PortId;
use crate::stats::{InitiatorStats, SimStats};
use crate::tlm::{GlobalQuantum, ResponseStatus, Transaction};
use crate::trace::TransactionEvent;

/// Result of one [`Initiator::issue`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Issued {
    /// Final response status of the transaction.
    pub status: ResponseStatus,
    /// Annotated delay after the target returned.
    pub delay: SimTime,
    /// Time the calling context must wait before continuing, if any.
    pub wait: Option<SimTime>,
}

impl Issued {
    /// Returns `true` when the target answered `Ok`.
    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }

    /// Returns `0` on success and `-1` otherwise.
    pub fn result_code(&self) -> i32 {
        if self.is_ok() { 0 } else { -1 }
    }
}

/// A logical execution context issuing transactions through one router port.
#[derive(Clone, Debug)]
pub struct Initiator {
    name: String,
    port: PortId,
    policy: TimingPolicy,
    stats: InitiatorStats,
}

impl Initiator {
    /// Creates an initiator bound to `port`.
    pub fn new(name: impl Into<String>, port: PortId, policy: TimingPolicy) -> Self {
        Self {
            name: name.into(),
            port,
            policy,
            stats: InitiatorStats::default(),
        }
    }

    /// Creates an initiator that synchronizes on every time advance.
    pub fn immediate(name: impl Into<String>, port: PortId) -> Self {
        Self::new(name, port, TimingPolicy::Immediate)
    }

    /// Creates a temporally decoupled initiator.
    pub fn decoupled(name: impl Into<String>, port: PortId, quantum: GlobalQuantum) -> Self {
        Self::new(name, port, TimingPolicy::quantum(quantum))
    }

    /// Initiator name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Router port this initiator is bound to.
    pub fn port(&self) -> PortId {
        self.port
    }

    /// Timing policy in use.
    pub fn policy(&self) -> &TimingPolicy {
        &self.policy
    }

    /// How far this initiator currently runs ahead of global time.
    pub fn local_offset(&self) -> SimTime {
        self.policy.local_offset()
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> InitiatorStats {
        self.stats
    }

    /// Copies this initiator's counters into the system statistics.
    pub fn publish(&self, stats: &mut SimStats) {
        stats.update_initiator(&self.name, self.stats);
    }

    /// Accounts `duration` of local execution.
    ///
    /// # Returns
    ///
    /// The time the caller must wait before continuing, or `None` to keep running. With the
    /// immediate policy this is always `duration`; with a quantum it is the flushed offset
    /// once the quantum has been reached.
    pub fn advance_local(&mut self, duration: SimTime) -> Option<SimTime> {
        let wait = match &mut self.policy {
            TimingPolicy::Immediate => Some(duration),
            TimingPolicy::Quantum(keeper) => {
                keeper.inc(duration);
                keeper.need_sync().then(|| keeper.sync())
            }
        };
        wait.map(|w| self.hand_back(w))
    }

    /// Issues one blocking transaction through the router.
    ///
    /// The response status is reset to `Incomplete`, the annotated delay starts at the local
    /// offset, and the delay returned by the target becomes the new local offset. The
    /// completed transaction is logged, traced and counted in `system`.
    ///
    /// # Arguments
    ///
    /// * `now` - Current global time (from the process context).
    /// * `system` - Shared system state holding the router.
    /// * `txn` - Transaction to issue; its buffers stay owned by the caller.
    ///
    /// # Returns
    ///
    /// The outcome, including the wait the caller must yield before continuing.
    pub fn issue(
        &mut self,
        now: SimTime,
        system: &mut System,
        txn: &mut Transaction<'_>,
    ) -> Issued {
        txn.reset_response();
        let offset = self.local_offset();
        let mut delay = offset;
        system.router.forward(self.port, txn, &mut delay);
        let status = txn.response_status();

        let event = TransactionEvent {
            timestamp: now,
            local_offset: offset,
            initiator: self.name.clone(),
            port: self.port,
            command: txn.command(),
            address: txn.address(),
            data: txn.data_lanes().to_vec(),
            byte_enable: txn.byte_enable_lanes().map(<[u8]>::to_vec),
            response: status,
            delay,
        };
        debug!(
            initiator = %event.initiator,
            port = %event.port,
            time = %now,
            offset = %offset,
            command = ?event.command,
            address = format_args!("{:#010x}", event.address),
            data = ?event.data,
            response = ?event.response,
            "transaction completed"
        );
        system.record(event);

        self.stats.issued += 1;
        if status != ResponseStatus::Ok {
            self.stats.failed += 1;
        }

        let wait = match &mut self.policy {
            TimingPolicy::Immediate => Some(delay),
            TimingPolicy::Quantum(keeper) => {
                keeper.set(delay);
                keeper.need_sync().then(|| keeper.sync())
            }
        };
        let wait = wait.map(|w| self.hand_back(w));
        self.publish(&mut system.stats);

        Issued {
            status,
            delay,
            wait,
        }
    }

    /// Explicitly resynchronizes with global time.
    ///
    /// # Returns
    ///
    /// The pending local offset to wait for, or `None` if there is nothing to flush.
    pub fn sync(&mut self) -> Option<SimTime> {
        let wait = match &mut self.policy {
            TimingPolicy::Immediate => None,
            TimingPolicy::Quantum(keeper) => {
                (!keeper.local_time().is_zero()).then(|| keeper.sync())
            }
        };
        wait.map(|w| self.hand_back(w))
    }

    fn hand_back(&mut self, wait: SimTime) -> SimTime {
        self.stats.syncs += 1;
        self.stats.waited += wait;
        trace!(initiator = %self.name, %wait, "resynchronizing");
        wait
    }
}
