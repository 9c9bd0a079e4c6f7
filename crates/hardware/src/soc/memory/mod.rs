//! Memory target.
//!
//! This module implements the shared byte-addressable memory. It provides:
//! 1. **Storage:** A power-of-two byte array; every lane offset is `address & (size - 1)`, so
//!    addresses wrap instead of faulting.
//! 2. **Transport:** Byte-enable masked reads and read-modify-write stores.
//! 3. **Controller:** Latency modeling through a [`MemoryController`].
//! 4. **Inspection:** Preload, peek and word dumps for drivers and tests.
//!
//! Wraparound is intentional. Out-of-range addresses alias into the array and are never
//! reported; only transaction shapes outside the protocol contract are rejected.

/// Memory controller implementations for access latency modeling.
pub mod controller;

use std::fmt;

use tracing::debug;

use self::controller::{MemoryController, SimpleController};
use crate::common::{SimError, SimTime};
use crate::soc::traits::Target;
use crate::tlm::{Command, ResponseStatus, Transaction};

/// Byte-addressable memory target.
pub struct Memory {
    name: String,
    storage: Vec<u8>,
    mask: u64,
    controller: Box<dyn MemoryController>,
}

impl Memory {
    /// Creates a zero-filled memory.
    ///
    /// # Arguments
    ///
    /// * `size` - Size in bytes; must be a non-zero power of two.
    /// * `controller` - Latency model.
    ///
    /// # Returns
    ///
    /// The memory, or [`SimError::InvalidMemorySize`].
    pub fn new(size: usize, controller: Box<dyn MemoryController>) -> Result<Self, SimError> {
        if !size.is_power_of_two() {
            return Err(SimError::InvalidMemorySize(size));
        }
        Ok(Self {
            name: "MEM".to_owned(),
            storage: vec![0; size],
            mask: size as u64 - 1,
            controller,
        })
    }

    /// Creates a memory with a [`SimpleController`] charging the given latencies.
    pub fn with_latency(size: usize, read: SimTime, write: SimTime) -> Result<Self, SimError> {
        Self::new(size, Box::new(SimpleController::new(read, write)))
    }

    /// Renames the memory (used in logs and trace output).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the size in bytes.
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    #[inline(always)]
    fn offset(&self, address: u64) -> usize {
        (address & self.mask) as usize
    }

    /// Sets every byte to `value`.
    pub fn fill(&mut self, value: u8) {
        self.storage.fill(value);
    }

    /// Copies `data` into storage starting at `address`, wrapping at the end of the array.
    pub fn load(&mut self, data: &[u8], address: u64) {
        for (i, byte) in data.iter().enumerate() {
            let idx = self.offset(address.wrapping_add(i as u64));
            self.storage[idx] = *byte;
        }
    }

    /// Reads one byte without charging time.
    pub fn peek(&self, address: u64) -> u8 {
        self.storage[self.offset(address)]
    }

    /// Reads a little-endian word without charging time (lanes wrap individually).
    pub fn read_word(&self, address: u64) -> u32 {
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.peek(address.wrapping_add(i as u64));
        }
        u32::from_le_bytes(bytes)
    }

    /// Snapshots the first `words` little-endian words as `(address, value)` pairs.
    ///
    /// The count is clamped to the memory size. Formatting is left to the caller.
    pub fn dump_words(&self, words: usize) -> Vec<(u64, u32)> {
        let words = words.min(self.storage.len() / 4);
        (0..words)
            .map(|w| {
                let addr = (w * 4) as u64;
                (addr, self.read_word(addr))
            })
            .collect()
    }

    /// Returns the whole storage array.
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("name", &self.name)
            .field("size", &self.storage.len())
            .finish_non_exhaustive()
    }
}

impl Target for Memory {
    fn name(&self) -> &str {
        &self.name
    }

    /// Services a read, write or ignore.
    ///
    /// Unsupported shapes are answered with `Error` before any lane is touched and
    /// without charging time.
    fn submit(&mut self, txn: &mut Transaction<'_>, delay: &mut SimTime) {
        if let Err(violation) = txn.check_shape() {
            debug!(
                memory = %self.name,
                address = format_args!("{:#x}", txn.address()),
                %violation,
                "rejecting unsupported transaction"
            );
            txn.set_response_status(ResponseStatus::Error);
            return;
        }

        let base = txn.address();
        let lanes = txn.length() as usize;
        match txn.command() {
            Command::Read => {
                for lane in 0..lanes {
                    let value = self.storage[self.offset(base.wrapping_add(lane as u64))];
                    let enable = txn.lane_mask(lane);
                    txn.data_mut()[lane] = value & enable;
                }
            }
            Command::Write => {
                for lane in 0..lanes {
                    let idx = self.offset(base.wrapping_add(lane as u64));
                    let enable = txn.lane_mask(lane);
                    let incoming = txn.data()[lane];
                    self.storage[idx] = (self.storage[idx] & !enable) | (incoming & enable);
                }
            }
            Command::None => {}
        }

        *delay += self
            .controller
            .access_latency(txn.command(), base & self.mask);
        txn.set_response_status(ResponseStatus::Ok);
    }

    fn as_memory_mut(&mut self) -> Option<&mut Memory> {
        Some(self)
    }

    fn as_memory(&self) -> Option<&Memory> {
        Some(self)
    }
}
