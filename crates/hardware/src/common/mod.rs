//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks shared by all components:
//! 1. **Time:** The picosecond-resolution [`SimTime`] used by scheduler, initiators and targets.
//! 2. **Error Handling:** The [`SimError`] type for build-time and run-time failures.

/// Error types for building and running simulations.
pub mod error;

/// Virtual time representation.
pub mod time;

pub use error::SimError;
pub use time::SimTime;
