//! Timing policies for initiators.
//!
//! An initiator either hands every advance of time straight back to the scheduler
//! (`Immediate`) or accumulates it in a quantum keeper and resynchronizes only once the
//! global quantum has been reached (`Quantum`).

use crate::common::SimTime;
use crate::tlm::{GlobalQuantum, QuantumKeeper};

/// How an initiator reconciles its local time with global simulated time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimingPolicy {
    /// No decoupling: every time advance becomes a wait on the scheduler.
    Immediate,
    /// Temporal decoupling bounded by a global quantum.
    Quantum(QuantumKeeper),
}

impl TimingPolicy {
    /// Builds a decoupled policy from a global quantum.
    pub fn quantum(quantum: GlobalQuantum) -> Self {
        Self::Quantum(QuantumKeeper::new(quantum))
    }

    /// Returns `true` for the decoupled policy.
    pub fn is_decoupled(&self) -> bool {
        matches!(self, Self::Quantum(_))
    }

    /// Current local offset (always zero for `Immediate`).
    pub fn local_offset(&self) -> SimTime {
        match self {
            Self::Immediate => SimTime::ZERO,
            Self::Quantum(keeper) => keeper.local_time(),
        }
    }

    /// Returns the keeper of a decoupled policy.
    pub fn keeper(&self) -> Option<&QuantumKeeper> {
        match self {
            Self::Immediate => None,
            Self::Quantum(keeper) => Some(keeper),
        }
    }
}
