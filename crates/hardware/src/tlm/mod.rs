//! Transaction-level protocol.
//!
//! This module holds the parts of the memory protocol shared by every initiator and target:
//! 1. **Payload:** The [`Transaction`] message and its command/response enums.
//! 2. **Quantum:** [`GlobalQuantum`] and [`QuantumKeeper`] for temporal decoupling.

/// Transaction payload and shape checking.
pub mod payload;

/// Local time offset tracking against a global quantum.
pub mod quantum;

pub use payload::{Command, MAX_TRANSFER_BYTES, ResponseStatus, ShapeViolation, Transaction};
pub use quantum::{GlobalQuantum, QuantumKeeper};
