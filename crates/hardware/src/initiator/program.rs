//! Scripted initiator processes.
//!
//! A [`ProgramProcess`] runs a fixed list of [`Op`]s under one [`Initiator`], once or in a
//! loop, as a scheduler process. It is a small explicit state machine: the position in the
//! script survives every suspension.

use crate::common::SimTime;
use crate::initiator::{Initiator, Issued};
use crate::sim::{Process, ProcessContext, Suspend};
use crate::soc::System;
use crate::tlm::{Command, Transaction};

/// One memory access in a script.
///
/// `data` doubles as the transaction buffer: it is the payload of a write and receives the
/// bytes of a read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Access {
    /// Command to issue.
    pub command: Command,
    /// Target address.
    pub address: u64,
    /// Transaction buffer; its length is the transfer length.
    pub data: Vec<u8>,
    /// Byte-enable lanes, if any.
    pub byte_enable: Option<Vec<u8>>,
}

impl Access {
    /// Reads `len` bytes at `address`.
    pub fn read(address: u64, len: usize) -> Self {
        Self {
            command: Command::Read,
            address,
            data: vec![0; len],
            byte_enable: None,
        }
    }

    /// Writes `data` at `address`.
    pub fn write(address: u64, data: impl Into<Vec<u8>>) -> Self {
        Self {
            command: Command::Write,
            address,
            data: data.into(),
            byte_enable: None,
        }
    }

    /// Reads one little-endian 32-bit word.
    pub fn read_word(address: u64) -> Self {
        Self::read(address, 4)
    }

    /// Writes one little-endian 32-bit word.
    pub fn write_word(address: u64, value: u32) -> Self {
        Self::write(address, value.to_le_bytes())
    }

    /// A `None` command of one word; answered without touching storage.
    pub fn ignore(address: u64) -> Self {
        Self {
            command: Command::None,
            address,
            data: vec![0; 4],
            byte_enable: None,
        }
    }

    /// Attaches byte-enable lanes.
    #[must_use]
    pub fn with_byte_enable(mut self, byte_enable: impl Into<Vec<u8>>) -> Self {
        self.byte_enable = Some(byte_enable.into());
        self
    }

    /// Attaches a 32-bit byte-enable mask in little-endian lane order.
    #[must_use]
    pub fn with_word_mask(self, mask: u32) -> Self {
        self.with_byte_enable(mask.to_le_bytes())
    }

    /// Issues this access through `initiator`.
    pub fn issue(&mut self, initiator: &mut Initiator, now: SimTime, system: &mut System) -> Issued {
        let mut txn = Transaction::new(self.command, self.address, &mut self.data);
        if let Some(be) = &self.byte_enable {
            txn = txn.with_byte_enable(be);
        }
        initiator.issue(now, system, &mut txn)
    }
}

/// One step of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// Local execution of the given duration (an instruction-equivalent time advance).
    Compute(SimTime),
    /// Flush any pending local offset, then wait the given duration in global time.
    Wait(SimTime),
    /// Issue a memory access.
    Access(Access),
    /// Explicit resynchronization.
    Sync,
}

/// Scheduler process executing a script of operations under one initiator.
#[derive(Debug)]
pub struct ProgramProcess {
    initiator: Initiator,
    ops: Vec<Op>,
    pc: usize,
    repeat: bool,
    pass_advanced: bool,
}

impl ProgramProcess {
    /// Runs `ops` once, flushes any pending offset, then terminates.
    pub fn once(initiator: Initiator, ops: Vec<Op>) -> Self {
        Self {
            initiator,
            ops,
            pc: 0,
            repeat: false,
            pass_advanced: false,
        }
    }

    /// Runs `ops` in an endless loop.
    ///
    /// A pass that consumes no virtual time yields one delta cycle before starting over, so
    /// a zero-time loop is caught by the scheduler's delta limit instead of hanging.
    pub fn looping(initiator: Initiator, ops: Vec<Op>) -> Self {
        Self {
            repeat: true,
            ..Self::once(initiator, ops)
        }
    }

    /// The initiator driven by this program.
    pub fn initiator(&self) -> &Initiator {
        &self.initiator
    }

    fn suspend(&self, wait: SimTime, system: &mut System) -> Suspend {
        self.initiator.publish(&mut system.stats);
        Suspend::For(wait)
    }
}

impl Process<System> for ProgramProcess {
    fn name(&self) -> &str {
        self.initiator.name()
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, System>) -> Suspend {
        loop {
            if self.pc == self.ops.len() {
                if !self.repeat || self.ops.is_empty() {
                    if let Some(wait) = self.initiator.sync() {
                        return self.suspend(wait, ctx.shared_mut());
                    }
                    self.initiator.publish(&mut ctx.shared_mut().stats);
                    return Suspend::Done;
                }
                self.pc = 0;
                if !std::mem::take(&mut self.pass_advanced) {
                    return self.suspend(SimTime::ZERO, ctx.shared_mut());
                }
            }

            let now = ctx.now();
            let op = &mut self.ops[self.pc];
            self.pc += 1;
            let wait = match op {
                Op::Compute(d) => {
                    self.pass_advanced |= !d.is_zero();
                    self.initiator.advance_local(*d)
                }
                Op::Wait(d) => {
                    self.pass_advanced |= !d.is_zero();
                    let pending = self.initiator.sync().unwrap_or(SimTime::ZERO);
                    Some(pending + *d)
                }
                Op::Access(access) => {
                    let issued = access.issue(&mut self.initiator, now, ctx.shared_mut());
                    self.pass_advanced |= !issued.delay.is_zero();
                    issued.wait
                }
                Op::Sync => self.initiator.sync(),
            };

            if let Some(wait) = wait {
                return self.suspend(wait, ctx.shared_mut());
            }
        }
    }
}
