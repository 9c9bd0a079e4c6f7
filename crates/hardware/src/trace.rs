//! Transaction trace recording.
//!
//! Every completed transaction is summarized as a [`TransactionEvent`]. Events are emitted
//! through `tracing` by the initiator and retained here in a bounded ring so tests and the
//! demo driver can inspect the observable memory traffic after a run.

use std::collections::VecDeque;

use serde::Serialize;

use crate::common::SimTime;
use crate::soc::interconnect::PortId;
use crate::tlm::{Command, ResponseStatus};

/// One completed transaction as observed by its initiator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionEvent {
    /// Global simulated time when the transaction was issued.
    pub timestamp: SimTime,
    /// Initiator's local offset when the transaction was issued.
    pub local_offset: SimTime,
    /// Name of the issuing initiator.
    pub initiator: String,
    /// Router port the transaction entered on.
    pub port: PortId,
    /// Command carried by the transaction.
    pub command: Command,
    /// Target address.
    pub address: u64,
    /// Written bytes for a write, returned bytes for a read.
    pub data: Vec<u8>,
    /// Byte-enable lanes, if any.
    pub byte_enable: Option<Vec<u8>>,
    /// Final response status.
    pub response: ResponseStatus,
    /// Annotated delay after the target returned.
    pub delay: SimTime,
}

impl TransactionEvent {
    /// Returns the initiator-local time at which the transaction took effect.
    pub fn effective_time(&self) -> SimTime {
        self.timestamp + self.local_offset
    }

    /// Returns the data lanes as a little-endian word (missing lanes read as zero).
    pub fn data_word(&self) -> u32 {
        let mut bytes = [0u8; 4];
        for (dst, src) in bytes.iter_mut().zip(&self.data) {
            *dst = *src;
        }
        u32::from_le_bytes(bytes)
    }
}

/// Bounded, optionally disabled, ring of transaction events.
#[derive(Clone, Debug)]
pub struct TraceLog {
    events: VecDeque<TransactionEvent>,
    capacity: usize,
    enabled: bool,
    dropped: u64,
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl TraceLog {
    /// Creates an enabled log keeping at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            enabled: capacity > 0,
            dropped: 0,
        }
    }

    /// Creates a log that records nothing.
    pub fn disabled() -> Self {
        Self {
            events: VecDeque::new(),
            capacity: 0,
            enabled: false,
            dropped: 0,
        }
    }

    /// Returns `true` when events are being retained.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends an event, evicting the oldest one when the ring is full.
    pub fn record(&mut self, event: TransactionEvent) {
        if !self.enabled {
            return;
        }
        if self.events.len() == self.capacity {
            let _ = self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Iterates over retained events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &TransactionEvent> + '_ {
        self.events.iter()
    }

    /// Iterates over the events issued by one initiator.
    pub fn by_initiator<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a TransactionEvent> + 'a {
        self.events.iter().filter(move |e| e.initiator == name)
    }

    /// Returns the most recent event.
    pub fn last(&self) -> Option<&TransactionEvent> {
        self.events.back()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no event is retained.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events evicted because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Discards every retained event.
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }
}
