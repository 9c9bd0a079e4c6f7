//! Simulation kernel.
//!
//! This module contains the discrete-event scheduler that interleaves processes in virtual
//! time, and the process/suspension vocabulary processes are written against.

/// Event scheduler, processes and run control.
pub mod scheduler;

pub use scheduler::{
    DEFAULT_MAX_DELTA, Process, ProcessContext, ProcessId, ProcessState, RunLimit, RunSummary,
    Scheduler, StopReason, Suspend,
};
