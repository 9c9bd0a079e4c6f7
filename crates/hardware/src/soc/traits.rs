//! Target trait for transaction-servicing components.
//!
//! This module defines the `Target` capability implemented by every component that can sit
//! behind a router port. It provides:
//! 1. **Identification:** `name` for logging and trace output.
//! 2. **Blocking transport:** `submit` services one transaction and annotates its service time.
//! 3. **Downcasting:** Optional casts to `Memory` or `LoggingTarget` for inspection after a run.

use crate::common::SimTime;
use crate::soc::devices::LoggingTarget;
use crate::soc::memory::Memory;
use crate::tlm::Transaction;

/// A component that services transactions.
///
/// `submit` must leave the response status at `Ok` or `Error` and must only ever add
/// to `delay`; it never waits on the scheduler itself.
pub trait Target {
    /// Returns a short name for this target (e.g., `"MEM"`).
    fn name(&self) -> &str;

    /// Services one transaction.
    ///
    /// # Arguments
    ///
    /// * `txn` - The transaction; its buffers are owned by the initiator.
    /// * `delay` - Annotated delay on entry (the initiator's local offset); the target adds
    ///   its service time.
    fn submit(&mut self, txn: &mut Transaction<'_>, delay: &mut SimTime);

    /// Returns a mutable reference as `Memory` if this target is a memory; otherwise `None`.
    fn as_memory_mut(&mut self) -> Option<&mut Memory> {
        None
    }

    /// Returns a shared reference as `Memory` if this target is a memory; otherwise `None`.
    fn as_memory(&self) -> Option<&Memory> {
        None
    }

    /// Returns a shared reference as `LoggingTarget` if this target is one; otherwise `None`.
    fn as_logger(&self) -> Option<&LoggingTarget> {
        None
    }
}
