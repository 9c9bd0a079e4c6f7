//! Logging target.
//!
//! A target with no storage: it records every transaction it receives, emits a tracing
//! event for it, and completes it with `Ok` without charging time. Useful as a stand-in
//! target when wiring up initiators.

use tracing::info;

use crate::common::SimTime;
use crate::soc::traits::Target;
use crate::tlm::{Command, ResponseStatus, Transaction};

/// One transaction as seen by a [`LoggingTarget`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggedAccess {
    /// Command received.
    pub command: Command,
    /// Address received.
    pub address: u64,
    /// Data lanes at the time of the call (write payload, or stale read buffer).
    pub data: Vec<u8>,
    /// Byte-enable lanes, if attached.
    pub byte_enable: Option<Vec<u8>>,
    /// Annotated delay on entry.
    pub delay: SimTime,
}

/// Target that only records traffic.
#[derive(Debug)]
pub struct LoggingTarget {
    name: String,
    log: Vec<LoggedAccess>,
}

impl LoggingTarget {
    /// Creates a logging target with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log: Vec::new(),
        }
    }

    /// Returns every access received so far, oldest first.
    pub fn log(&self) -> &[LoggedAccess] {
        &self.log
    }

    /// Discards the recorded accesses.
    pub fn clear(&mut self) {
        self.log.clear();
    }
}

impl Target for LoggingTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&mut self, txn: &mut Transaction<'_>, delay: &mut SimTime) {
        let access = LoggedAccess {
            command: txn.command(),
            address: txn.address(),
            data: txn.data_lanes().to_vec(),
            byte_enable: txn.byte_enable_lanes().map(<[u8]>::to_vec),
            delay: *delay,
        };
        info!(
            target_name = %self.name,
            command = ?access.command,
            address = format_args!("{:#010x}", access.address),
            data = ?access.data,
            "logging transaction"
        );
        self.log.push(access);
        txn.set_response_status(ResponseStatus::Ok);
    }

    fn as_logger(&self) -> Option<&LoggingTarget> {
        Some(self)
    }
}
