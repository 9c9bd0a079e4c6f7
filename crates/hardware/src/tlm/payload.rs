//! Transaction payload exchanged between initiators and targets.
//!
//! This module defines the single message shape of the memory protocol. It provides:
//! 1. **Commands and responses:** `Command` (none/read/write) and `ResponseStatus`.
//! 2. **Transaction:** Borrowed data and byte-enable buffers plus length, streaming width
//!    and response status.
//! 3. **Shape checking:** [`Transaction::check_shape`] reports why a transaction falls outside
//!    the supported single-beat, at-most-four-byte contract.
//!
//! The transaction never owns its buffers: the initiator lends them for one call and
//! inspects the response status afterwards.

use serde::Serialize;
use thiserror::Error;

/// Largest transfer, in bytes, a single transaction may carry.
pub const MAX_TRANSFER_BYTES: u32 = 4;

/// Transaction command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    /// No access; the target completes the transaction without touching storage.
    #[default]
    None,
    /// Copy bytes from the target into the data buffer.
    Read,
    /// Copy bytes from the data buffer into the target.
    Write,
}

/// Completion status written by the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    /// Not yet serviced; the mandatory value on entry to a target.
    #[default]
    Incomplete,
    /// Serviced successfully.
    Ok,
    /// Rejected by the target.
    Error,
}

/// Reason a transaction falls outside the supported protocol subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    /// `length` is zero.
    #[error("zero-length transfer")]
    ZeroLength,
    /// `length` exceeds [`MAX_TRANSFER_BYTES`].
    #[error("transfer length {0} exceeds {MAX_TRANSFER_BYTES} bytes")]
    TooLong(u32),
    /// `streaming_width` is smaller than `length` (a streaming burst).
    #[error("streaming width {width} is smaller than length {length}")]
    Streaming {
        /// Declared streaming width.
        width: u32,
        /// Declared length.
        length: u32,
    },
    /// The data buffer is shorter than `length`.
    #[error("data buffer holds {available} bytes, {length} required")]
    ShortData {
        /// Bytes actually lent.
        available: usize,
        /// Declared length.
        length: u32,
    },
    /// The byte-enable buffer is shorter than `length`.
    #[error("byte-enable buffer holds {available} bytes, {length} required")]
    ShortByteEnable {
        /// Bytes actually lent.
        available: usize,
        /// Declared length.
        length: u32,
    },
}

/// A single memory-access transaction.
///
/// Built by an initiator immediately before a call, finalized by the target during
/// that call. `length` and `streaming_width` default to the data buffer length, i.e.
/// a plain non-streaming access of the whole buffer.
#[derive(Debug)]
pub struct Transaction<'a> {
    command: Command,
    address: u64,
    data: &'a mut [u8],
    length: u32,
    streaming_width: u32,
    byte_enable: Option<&'a [u8]>,
    response_status: ResponseStatus,
}

impl<'a> Transaction<'a> {
    /// Creates a transaction covering the whole of `data`.
    ///
    /// # Arguments
    ///
    /// * `command` - Access kind.
    /// * `address` - Target-relative address.
    /// * `data` - Caller-owned buffer; source for writes, destination for reads.
    ///
    /// # Returns
    ///
    /// A transaction with `length == streaming_width == data.len()`, no byte enables,
    /// and an `Incomplete` response.
    pub fn new(command: Command, address: u64, data: &'a mut [u8]) -> Self {
        let length = u32::try_from(data.len()).unwrap_or(u32::MAX);
        Self {
            command,
            address,
            data,
            length,
            streaming_width: length,
            byte_enable: None,
            response_status: ResponseStatus::Incomplete,
        }
    }

    /// Creates a read of `data.len()` bytes at `address`.
    pub fn read(address: u64, data: &'a mut [u8]) -> Self {
        Self::new(Command::Read, address, data)
    }

    /// Creates a write of `data` at `address`.
    pub fn write(address: u64, data: &'a mut [u8]) -> Self {
        Self::new(Command::Write, address, data)
    }

    /// Attaches a byte-enable mask; each lane is applied bitwise to the matching data byte.
    #[must_use]
    pub fn with_byte_enable(mut self, byte_enable: &'a [u8]) -> Self {
        self.byte_enable = Some(byte_enable);
        self
    }

    /// Overrides the transfer length (and leaves streaming width untouched).
    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// Overrides the streaming width.
    #[must_use]
    pub fn with_streaming_width(mut self, width: u32) -> Self {
        self.streaming_width = width;
        self
    }

    /// Returns the command.
    pub fn command(&self) -> Command {
        self.command
    }

    /// Returns the target-relative address.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Returns the declared transfer length in bytes.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Returns the declared streaming width in bytes.
    pub fn streaming_width(&self) -> u32 {
        self.streaming_width
    }

    /// Returns the whole borrowed data buffer.
    pub fn data(&self) -> &[u8] {
        self.data
    }

    /// Returns the whole borrowed data buffer mutably.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Returns the byte-enable mask, if any.
    pub fn byte_enable(&self) -> Option<&[u8]> {
        self.byte_enable
    }

    /// Returns the first `length` data bytes, or the whole buffer if it is shorter.
    pub fn data_lanes(&self) -> &[u8] {
        let n = (self.length as usize).min(self.data.len());
        &self.data[..n]
    }

    /// Returns the byte-enable lanes matching [`Transaction::data_lanes`], if a mask is attached.
    pub fn byte_enable_lanes(&self) -> Option<&[u8]> {
        self.byte_enable.map(|be| {
            let n = (self.length as usize).min(be.len());
            &be[..n]
        })
    }

    /// Returns the enable mask for one lane; `0xFF` when no byte-enable is attached.
    #[inline]
    pub fn lane_mask(&self, lane: usize) -> u8 {
        self.byte_enable
            .map_or(0xFF, |be| be.get(lane).copied().unwrap_or(0))
    }

    /// Returns the response status.
    pub fn response_status(&self) -> ResponseStatus {
        self.response_status
    }

    /// Sets the response status.
    pub fn set_response_status(&mut self, status: ResponseStatus) {
        self.response_status = status;
    }

    /// Returns `true` if the target answered `Ok`.
    pub fn is_response_ok(&self) -> bool {
        self.response_status == ResponseStatus::Ok
    }

    /// Returns `true` if the target answered `Error`.
    pub fn is_response_error(&self) -> bool {
        self.response_status == ResponseStatus::Error
    }

    /// Puts the response status back to `Incomplete` before (re)issuing.
    pub fn reset_response(&mut self) {
        self.response_status = ResponseStatus::Incomplete;
    }

    /// Checks the transaction against the supported protocol subset.
    ///
    /// # Returns
    ///
    /// `Ok(())` for a single non-streaming access of one to four bytes whose buffers
    /// cover `length`; otherwise the first violated constraint.
    pub fn check_shape(&self) -> Result<(), ShapeViolation> {
        let length = self.length;
        if length == 0 {
            return Err(ShapeViolation::ZeroLength);
        }
        if length > MAX_TRANSFER_BYTES {
            return Err(ShapeViolation::TooLong(length));
        }
        if self.streaming_width < length {
            return Err(ShapeViolation::Streaming {
                width: self.streaming_width,
                length,
            });
        }
        if self.data.len() < length as usize {
            return Err(ShapeViolation::ShortData {
                available: self.data.len(),
                length,
            });
        }
        if let Some(be) = self.byte_enable {
            if be.len() < length as usize {
                return Err(ShapeViolation::ShortByteEnable {
                    available: be.len(),
                    length,
                });
            }
        }
        Ok(())
    }
}
