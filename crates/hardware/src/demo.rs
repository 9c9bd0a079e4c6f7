//! Two-processor producer/consumer demo.
//!
//! Two initiators share one memory through the router: `cpu0` on port 0 prepares a word
//! (a fixed number of instruction-time steps) and writes it with a low-byte enable mask to an
//! incrementing address; `cpu1` on port 1 starts a little later, reads the same addresses
//! back and spends the same instruction budget processing each word. The system runs either
//! fully synchronized or temporally decoupled with the configured global quantum.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use crate::common::{SimError, SimTime};
use crate::config::{Config, ConfigError};
use crate::initiator::Initiator;
use crate::sim::{Process, ProcessContext, RunLimit, RunSummary, Scheduler, Suspend};
use crate::soc::System;
use crate::soc::interconnect::PortId;
use crate::stats::SimStats;
use crate::tlm::Transaction;

/// Byte-enable mask used for every demo transfer (low byte only).
pub const DEMO_BYTE_MASK: u32 = 0x0000_00FF;

/// Timing mode of the demo initiators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DemoMode {
    /// Every instruction and transaction waits on the scheduler.
    Synchronous,
    /// Initiators run ahead by up to the global quantum.
    Decoupled,
}

impl fmt::Display for DemoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synchronous => write!(f, "sync"),
            Self::Decoupled => write!(f, "decoupled"),
        }
    }
}

impl FromStr for DemoMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sync" | "synchronous" => Ok(Self::Synchronous),
            "decoupled" | "decop" | "quantum" => Ok(Self::Decoupled),
            other => Err(ConfigError::Invalid(format!("unknown demo mode '{other}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Producer,
    Consumer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Compute { left: u32 },
    Transfer,
}

/// One demo processor: an initiator plus its position in the produce/consume loop.
#[derive(Debug)]
struct DemoCpu {
    initiator: Initiator,
    role: Role,
    phase: Phase,
    address: u64,
    instruction: SimTime,
    instructions: u32,
    value: u32,
}

impl DemoCpu {
    fn new(initiator: Initiator, role: Role, config: &Config) -> Self {
        let instructions = config.demo.instructions_per_word;
        let phase = match role {
            Role::Producer => Phase::Compute { left: instructions },
            Role::Consumer => Phase::Transfer,
        };
        Self {
            initiator,
            role,
            phase,
            address: config.demo.base_address,
            instruction: SimTime::from_ns(config.demo.instruction_ns),
            instructions,
            value: 0,
        }
    }

    fn transfer(&mut self, now: SimTime, system: &mut System) -> Option<SimTime> {
        let mut data = self.value.to_le_bytes();
        let mask = DEMO_BYTE_MASK.to_le_bytes();
        let address = self.address;
        let txn = match self.role {
            Role::Producer => Transaction::write(address, &mut data),
            Role::Consumer => Transaction::read(address, &mut data),
        };
        let mut txn = txn.with_byte_enable(&mask);
        let issued = self.initiator.issue(now, system, &mut txn);

        match (self.role, issued.is_ok()) {
            (Role::Producer, true) => {
                debug!(cpu = self.initiator.name(), %now, address, value = self.value, "write succeeded");
            }
            (Role::Consumer, true) => {
                let value = u32::from_le_bytes(data);
                debug!(cpu = self.initiator.name(), %now, address, value, "data received");
            }
            (_, false) => {
                info!(cpu = self.initiator.name(), %now, address, status = ?issued.status, "transfer failed");
            }
        }
        if self.role == Role::Producer {
            self.value = self.value.wrapping_add(1);
        }
        self.address = self.address.wrapping_add(1);
        issued.wait
    }
}

impl Process<System> for DemoCpu {
    fn name(&self) -> &str {
        self.initiator.name()
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, System>) -> Suspend {
        loop {
            let wait = match self.phase {
                Phase::Compute { left: 0 } => {
                    self.phase = Phase::Transfer;
                    None
                }
                Phase::Compute { left } => {
                    self.phase = Phase::Compute { left: left - 1 };
                    self.initiator.advance_local(self.instruction)
                }
                Phase::Transfer => {
                    self.phase = Phase::Compute {
                        left: self.instructions,
                    };
                    let now = ctx.now();
                    self.transfer(now, ctx.shared_mut())
                }
            };
            if let Some(wait) = wait {
                self.initiator.publish(&mut ctx.shared_mut().stats);
                return Suspend::For(wait);
            }
        }
    }
}

/// Builds the producer/consumer system and registers both processors.
///
/// # Arguments
///
/// * `config` - System and demo configuration; needs at least two bus ports.
/// * `mode` - Synchronous or decoupled timing.
///
/// # Returns
///
/// A scheduler ready to run, or the configuration error.
pub fn producer_consumer(config: &Config, mode: DemoMode) -> Result<Scheduler<System>, SimError> {
    if config.bus.ports < 2 {
        return Err(ConfigError::Invalid(format!(
            "the producer/consumer demo needs 2 bus ports, config has {}",
            config.bus.ports
        ))
        .into());
    }
    let system = System::from_config(config)?;
    let (cpu0, cpu1) = match mode {
        DemoMode::Synchronous => (
            Initiator::immediate("cpu0", PortId(0)),
            Initiator::immediate("cpu1", PortId(1)),
        ),
        DemoMode::Decoupled => {
            let quantum = config.global_quantum()?;
            (
                Initiator::decoupled("cpu0", PortId(0), quantum),
                Initiator::decoupled("cpu1", PortId(1), quantum),
            )
        }
    };

    let mut scheduler = Scheduler::new(system).with_delta_limit(config.timing.max_delta_cycles);
    let _ = scheduler.spawn(DemoCpu::new(cpu0, Role::Producer, config));
    let _ = scheduler.spawn_at(
        SimTime::from_ns(config.demo.consumer_start_ns),
        DemoCpu::new(cpu1, Role::Consumer, config),
    );
    Ok(scheduler)
}

/// Results of a demo run.
#[derive(Clone, Debug, Serialize)]
pub struct DemoReport {
    /// Timing mode used.
    pub mode: DemoMode,
    /// Scheduler run summary.
    pub summary: RunSummary,
    /// Transaction and initiator statistics.
    pub stats: SimStats,
    /// First memory words after the run as `(address, value)`.
    pub memory: Vec<(u64, u32)>,
}

/// Builds and runs the demo for `duration` of simulated time.
pub fn run(config: &Config, mode: DemoMode, duration: SimTime) -> Result<DemoReport, SimError> {
    let mut scheduler = producer_consumer(config, mode)?;
    let summary = scheduler.run(RunLimit::For(duration))?;
    let system = scheduler.into_shared();
    let memory = system.memory().map(|m| m.dump_words(4)).unwrap_or_default();
    info!(%mode, end = %summary.end, transactions = system.stats.transactions, "demo finished");
    Ok(DemoReport {
        mode,
        summary,
        stats: system.stats,
        memory,
    })
}
