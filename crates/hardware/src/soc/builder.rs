//! Top-level `System` type and construction from configuration.
//!
//! This module assembles the shared state every simulated process works against. It performs:
//! 1. **Memory setup:** Creates the memory target with configured size, latencies and preload.
//! 2. **Routing:** Builds a router whose `bus.ports` inbound ports all reach the memory.
//! 3. **Observability:** Attaches the transaction trace log and statistics collector.

use tracing::debug;

use crate::common::{SimError, SimTime};
use crate::config::Config;
use crate::soc::interconnect::{PortId, Router};
use crate::soc::memory::Memory;
use crate::stats::SimStats;
use crate::trace::{TraceLog, TransactionEvent};

/// Shared system state: the routing fabric with its targets, plus trace and statistics.
///
/// A `System` is the shared value handed to every process by the scheduler; only one process
/// holds it mutably at a time.
#[derive(Debug)]
pub struct System {
    /// Router owning every target.
    pub router: Router,
    /// Retained transaction events.
    pub trace: TraceLog,
    /// Aggregated counters.
    pub stats: SimStats,
}

impl System {
    /// Wraps an already built router with a default trace log and fresh statistics.
    pub fn new(router: Router) -> Self {
        Self {
            router,
            trace: TraceLog::default(),
            stats: SimStats::default(),
        }
    }

    /// Builds a system from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated (or default) configuration.
    ///
    /// # Returns
    ///
    /// A system with one memory target bound to ports `0..config.bus.ports`, or the
    /// configuration / construction error.
    pub fn from_config(config: &Config) -> Result<Self, SimError> {
        config.validate()?;

        let mut memory = Memory::with_latency(
            config.memory.size,
            SimTime::from_ns(config.memory.read_latency_ns),
            SimTime::from_ns(config.memory.write_latency_ns),
        )?;
        memory.fill(config.memory.fill);
        if !config.memory.image.is_empty() {
            memory.load(&config.memory.image, 0);
        }

        let mut builder = Router::builder();
        let mem = builder.add_target(Box::new(memory));
        for port in 0..config.bus.ports {
            let _ = builder.bind(PortId(port), mem);
        }
        let router = builder.build()?;

        let trace = if config.general.trace_transactions {
            TraceLog::new(config.general.trace_capacity)
        } else {
            TraceLog::disabled()
        };

        debug!(
            memory_size = config.memory.size,
            ports = config.bus.ports,
            trace = config.general.trace_transactions,
            "system built"
        );

        Ok(Self {
            router,
            trace,
            stats: SimStats::default(),
        })
    }

    /// Replaces the trace log.
    pub fn with_trace(mut self, trace: TraceLog) -> Self {
        self.trace = trace;
        self
    }

    /// Accounts a completed transaction in statistics and the trace log.
    pub fn record(&mut self, event: TransactionEvent) {
        self.stats.record_transaction(event.command, event.response);
        self.trace.record(event);
    }

    /// Returns the first memory target, if one is registered.
    pub fn memory(&self) -> Option<&Memory> {
        self.router.find_memory()
    }

    /// Returns the first memory target mutably, if one is registered.
    pub fn memory_mut(&mut self) -> Option<&mut Memory> {
        self.router.find_memory_mut()
    }
}
