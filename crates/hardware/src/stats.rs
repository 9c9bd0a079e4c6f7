//! Simulation statistics collection and reporting.
//!
//! This module tracks transaction-level metrics for a simulated system. It provides:
//! 1. **Traffic:** Completed transactions split by command and outcome.
//! 2. **Synchronization:** Per-initiator resynchronization counts and time handed back
//!    to the scheduler.
//! 3. **Reporting:** Text tables on stdout and `Serialize` for JSON output.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use crate::common::SimTime;
use crate::tlm::{Command, ResponseStatus};

/// Per-initiator counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InitiatorStats {
    /// Transactions issued.
    pub issued: u64,
    /// Transactions answered with anything but `Ok`.
    pub failed: u64,
    /// Times the initiator handed control back to the scheduler with a wait.
    pub syncs: u64,
    /// Total virtual time covered by those waits.
    pub waited: SimTime,
}

/// Simulation statistics structure tracking all transaction metrics.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Completed transactions of any command.
    pub transactions: u64,
    /// Completed read transactions.
    pub reads: u64,
    /// Completed write transactions.
    pub writes: u64,
    /// Completed `None` (ignore) transactions.
    pub ignored: u64,
    /// Transactions answered with `Error`.
    pub errors: u64,
    /// Snapshot of each initiator's counters, keyed by name.
    pub initiators: BTreeMap<String, InitiatorStats>,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            transactions: 0,
            reads: 0,
            writes: 0,
            ignored: 0,
            errors: 0,
            initiators: BTreeMap::new(),
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"traffic"`, `"initiators"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "traffic", "initiators"];

impl SimStats {
    /// Counts one completed transaction.
    pub fn record_transaction(&mut self, command: Command, status: ResponseStatus) {
        self.transactions += 1;
        match command {
            Command::Read => self.reads += 1,
            Command::Write => self.writes += 1,
            Command::None => self.ignored += 1,
        }
        if status == ResponseStatus::Error {
            self.errors += 1;
        }
    }

    /// Stores the latest counters published by an initiator.
    pub fn update_initiator(&mut self, name: &str, stats: InitiatorStats) {
        if let Some(slot) = self.initiators.get_mut(name) {
            *slot = stats;
        } else {
            let _ = self.initiators.insert(name.to_owned(), stats);
        }
    }

    /// Total resynchronizations across all initiators.
    pub fn total_syncs(&self) -> u64 {
        self.initiators.values().map(|s| s.syncs).sum()
    }

    /// Fraction of transactions answered with `Error` (0.0 when nothing ran).
    pub fn error_rate(&self) -> f64 {
        if self.transactions == 0 {
            0.0
        } else {
            self.errors as f64 / self.transactions as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    /// * `sim_time` - Virtual time reached by the run, used for throughput figures.
    pub fn print_sections(&self, sections: &[String], sim_time: SimTime) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();

        if want("summary") {
            let ns = sim_time.as_ns_f64();
            let per_us = if ns > 0.0 {
                self.transactions as f64 / (ns / 1_000.0)
            } else {
                0.0
            };
            println!("\n==========================================================");
            println!("TLM CO-SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_time                 {sim_time}");
            println!("sim_transactions         {}", self.transactions);
            println!("sim_txn_per_us           {per_us:.2}");
            println!("sim_syncs                {}", self.total_syncs());
            println!("----------------------------------------------------------");
        }
        if want("traffic") {
            let total = self.transactions.max(1) as f64;
            println!("TRAFFIC");
            println!(
                "  txn.read               {} ({:.2}%)",
                self.reads,
                self.reads as f64 / total * 100.0
            );
            println!(
                "  txn.write              {} ({:.2}%)",
                self.writes,
                self.writes as f64 / total * 100.0
            );
            println!(
                "  txn.ignore             {} ({:.2}%)",
                self.ignored,
                self.ignored as f64 / total * 100.0
            );
            println!(
                "  txn.error              {} ({:.2}%)",
                self.errors,
                self.error_rate() * 100.0
            );
            println!("----------------------------------------------------------");
        }
        if want("initiators") {
            println!("INITIATORS");
            for (name, s) in &self.initiators {
                println!(
                    "  {name:<22} issued={} failed={} syncs={} waited={}",
                    s.issued, s.failed, s.syncs, s.waited
                );
            }
            println!("==========================================================");
        }
    }

    /// Prints every statistics section.
    pub fn print(&self, sim_time: SimTime) {
        self.print_sections(&[], sim_time);
    }
}
