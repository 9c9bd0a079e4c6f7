//! System components.
//!
//! This module organizes the components that make up the simulated system: the targets
//! (memory and auxiliary devices), the router connecting initiator ports to them, and the
//! builder that assembles everything into a shared `System`.

/// System builder and shared state.
pub mod builder;

/// Auxiliary targets.
pub mod devices;

/// Router between initiator ports and targets.
pub mod interconnect;

/// Memory target and its latency models.
pub mod memory;

/// Target trait definition.
pub mod traits;

pub use builder::System;
