//! Auxiliary targets.
//!
//! Targets other than the main memory that can be bound behind a router port.

/// Transaction-recording target.
pub mod logger;

pub use logger::{LoggedAccess, LoggingTarget};

pub use crate::soc::traits::Target;
