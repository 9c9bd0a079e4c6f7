//! Simulator error definitions.
//!
//! This module defines the error types surfaced by the simulation core. It provides:
//! 1. **Build errors:** Invalid memory geometry and malformed routing tables.
//! 2. **Run errors:** Rejected run requests and zero-time livelock detection.
//! 3. **Configuration:** Conversion from [`ConfigError`] so `?` works across layers.
//!
//! Protocol failures (unsupported transaction shapes) are deliberately not errors here;
//! they travel back to the initiator through the transaction's response status.

use thiserror::Error;

use super::time::SimTime;
use crate::config::ConfigError;
use crate::soc::interconnect::{PortId, TargetId};

/// Errors raised while building or running a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// A run was requested for a zero-length interval.
    #[error("run duration must be greater than zero")]
    ZeroDuration,

    /// A run was requested with a negative duration (from an external driver).
    #[error("run duration must not be negative (got {0} ns)")]
    NegativeDuration(i64),

    /// Memory size is zero or not a power of two, so modulo wraparound cannot be a mask.
    #[error("memory size {0} is not a non-zero power of two")]
    InvalidMemorySize(usize),

    /// A decoupled initiator was configured with a zero quantum.
    #[error("global quantum must be greater than zero")]
    ZeroQuantum,

    /// The same inbound port was bound twice in a routing table.
    #[error("port {0} is bound more than once")]
    DuplicatePort(PortId),

    /// A routing entry refers to a target that was never registered.
    #[error("port {port} is bound to unknown target {target}")]
    UnknownTarget {
        /// Port whose binding is invalid.
        port: PortId,
        /// Target handle that does not exist.
        target: TargetId,
    },

    /// Too many delta cycles ran without virtual time advancing.
    #[error("delta cycle limit of {limit} exceeded at {time}")]
    DeltaLimitExceeded {
        /// Virtual time at which the livelock was detected.
        time: SimTime,
        /// Configured delta limit.
        limit: u32,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
