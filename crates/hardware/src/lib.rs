//! Transaction-level memory-system co-simulation library.
//!
//! This crate implements a discrete-event co-simulation core with the following:
//! 1. **Protocol:** A fixed-shape transaction (command, address, data, byte enables, response).
//! 2. **Targets:** A byte-addressable memory with byte-enable masking and a logging target.
//! 3. **Routing:** A static router from initiator ports to targets.
//! 4. **Initiators:** Transaction issuers with immediate or quantum-bounded temporal decoupling.
//! 5. **Simulation:** A delta-cycle event scheduler, configuration, tracing and statistics.

/// Common types (virtual time, errors).
pub mod common;
/// Simulator configuration (defaults, hierarchical config structures, validation).
pub mod config;
/// Two-processor producer/consumer demo.
pub mod demo;
/// Initiators, timing policies and scripted processes.
pub mod initiator;
/// Discrete-event scheduler.
pub mod sim;
/// Targets, router and system assembly.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Transaction protocol and temporal decoupling primitives.
pub mod tlm;
/// Transaction trace recording.
pub mod trace;

/// Virtual time and the crate error type.
pub use crate::common::{SimError, SimTime};
/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Transaction issuer; construct with `Initiator::immediate` or `Initiator::decoupled`.
pub use crate::initiator::Initiator;
/// Event scheduler over a shared `System`.
pub use crate::sim::Scheduler;
/// Shared system state (router, trace, stats); construct with `System::from_config`.
pub use crate::soc::System;
/// Transaction payload.
pub use crate::tlm::Transaction;
