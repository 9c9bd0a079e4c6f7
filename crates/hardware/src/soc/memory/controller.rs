//! Memory controller implementations for latency modeling.
//!
//! A controller decides how much virtual time a memory target charges per access. The
//! default [`SimpleController`] charges a fixed latency per command kind; `None` (ignore)
//! transactions are never charged.

use crate::common::SimTime;
use crate::tlm::Command;

/// Trait for memory controller implementations that report access latency.
///
/// Controllers are opaque to the memory that owns them; only their latency is observed.
pub trait MemoryController: Send + Sync {
    /// Returns the service time for one access.
    ///
    /// # Arguments
    ///
    /// * `command` - Access kind.
    /// * `addr` - Wrapped target offset being accessed.
    ///
    /// # Returns
    ///
    /// Latency added to the transaction's annotated delay.
    fn access_latency(&mut self, command: Command, addr: u64) -> SimTime;
}

/// Fixed-latency controller; reads and writes may differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimpleController {
    read: SimTime,
    write: SimTime,
}

impl SimpleController {
    /// Creates a controller with separate read and write latencies.
    pub fn new(read: SimTime, write: SimTime) -> Self {
        Self { read, write }
    }

    /// Creates a controller charging the same latency for reads and writes.
    pub fn uniform(latency: SimTime) -> Self {
        Self::new(latency, latency)
    }

    /// Returns the read latency.
    pub fn read_latency(&self) -> SimTime {
        self.read
    }

    /// Returns the write latency.
    pub fn write_latency(&self) -> SimTime {
        self.write
    }
}

impl MemoryController for SimpleController {
    fn access_latency(&mut self, command: Command, _addr: u64) -> SimTime {
        match command {
            Command::Read => self.read,
            Command::Write => self.write,
            Command::None => SimTime::ZERO,
        }
    }
}
