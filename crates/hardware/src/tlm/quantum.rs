//! Temporal decoupling bookkeeping.
//!
//! A decoupled initiator runs ahead of the scheduler's clock and records how far it
//! is ahead in a local time offset. The [`QuantumKeeper`] owns that offset and decides
//! when the drift has reached the [`GlobalQuantum`] and must be flushed back into
//! global time.

use crate::common::{SimError, SimTime};

/// Maximum drift an initiator may accumulate before it must resynchronize.
///
/// Passed by value into every decoupled initiator; there is no process-wide instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlobalQuantum(SimTime);

impl GlobalQuantum {
    /// Creates a quantum; zero is rejected because it would force a sync on every step.
    ///
    /// # Arguments
    ///
    /// * `quantum` - Maximum permitted local time offset.
    ///
    /// # Returns
    ///
    /// The quantum, or [`SimError::ZeroQuantum`].
    pub fn new(quantum: SimTime) -> Result<Self, SimError> {
        if quantum.is_zero() {
            return Err(SimError::ZeroQuantum);
        }
        Ok(Self(quantum))
    }

    /// Returns the quantum duration.
    #[inline]
    pub fn get(self) -> SimTime {
        self.0
    }
}

/// Per-initiator local time offset tracker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantumKeeper {
    quantum: SimTime,
    local: SimTime,
    syncs: u64,
}

impl QuantumKeeper {
    /// Creates a keeper with a zero local offset.
    pub fn new(quantum: GlobalQuantum) -> Self {
        Self {
            quantum: quantum.get(),
            local: SimTime::ZERO,
            syncs: 0,
        }
    }

    /// Returns the quantum this keeper enforces.
    pub fn quantum(&self) -> SimTime {
        self.quantum
    }

    /// Returns the current local time offset.
    #[inline]
    pub fn local_time(&self) -> SimTime {
        self.local
    }

    /// Advances the local offset by `duration`.
    #[inline]
    pub fn inc(&mut self, duration: SimTime) {
        self.local += duration;
    }

    /// Replaces the local offset, e.g. with the annotated delay returned by a target.
    #[inline]
    pub fn set(&mut self, local: SimTime) {
        self.local = local;
    }

    /// Returns `true` once the local offset has reached the quantum.
    #[inline]
    pub fn need_sync(&self) -> bool {
        self.local >= self.quantum
    }

    /// Flushes the local offset.
    ///
    /// # Returns
    ///
    /// The offset the owning context must now wait for in global time. The keeper's
    /// own offset is zero afterwards.
    pub fn sync(&mut self) -> SimTime {
        self.syncs += 1;
        std::mem::take(&mut self.local)
    }

    /// Drops any pending offset without waiting for it.
    pub fn reset(&mut self) {
        self.local = SimTime::ZERO;
    }

    /// Returns how many times [`QuantumKeeper::sync`] has run.
    pub fn sync_count(&self) -> u64 {
        self.syncs
    }
}
