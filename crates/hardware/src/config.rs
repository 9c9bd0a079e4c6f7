//! Configuration system for the co-simulation core.
//!
//! This module defines the configuration structures used to parameterize a simulated system.
//! It provides:
//! 1. **Defaults:** Baseline constants (memory geometry, latencies, quantum, bus width).
//! 2. **Structures:** Hierarchical config for general, memory, timing, bus and demo settings.
//! 3. **Loading:** JSON parsing from strings or files plus semantic validation.
//!
//! Configuration is supplied as JSON (`Config::from_file`) or built with `Config::default()`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::common::{SimError, SimTime};
use crate::tlm::GlobalQuantum;

/// Default configuration constants for the simulator.
///
/// These values define the baseline system when not explicitly overridden in JSON.
mod defaults {
    /// Size of the memory target in bytes (256 B).
    ///
    /// Must be a power of two; addresses wrap modulo this size.
    pub const MEM_SIZE: usize = 256;

    /// Memory read latency in nanoseconds.
    pub const READ_LATENCY_NS: u64 = 5;

    /// Memory write latency in nanoseconds.
    pub const WRITE_LATENCY_NS: u64 = 5;

    /// Global quantum for decoupled initiators in nanoseconds.
    pub const QUANTUM_NS: u64 = 10;

    /// Delta cycles allowed at a single timestamp before the run is aborted.
    pub const MAX_DELTA_CYCLES: u32 = 10_000;

    /// Number of inbound router ports bound to the memory.
    pub const BUS_PORTS: usize = 2;

    /// Transaction events retained by the trace ring.
    pub const TRACE_CAPACITY: usize = 4096;

    /// Time charged per modeled instruction in the demo programs (ns).
    pub const INSTRUCTION_NS: u64 = 2;

    /// Instructions the demo producer/consumer executes per word.
    pub const INSTRUCTIONS_PER_WORD: u32 = 10;

    /// Delay before the demo consumer issues its first read (ns).
    pub const CONSUMER_START_NS: u64 = 25;

    /// First address used by the demo producer and consumer.
    pub const DEMO_BASE_ADDRESS: u64 = 0xFF00_0000;
}

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The JSON text is malformed or has wrong field types.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but describes an impossible system.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration structure.
///
/// Every section and field has a default, so `{}` is a valid configuration.
///
/// # Examples
///
/// ```
/// use tlmsim_core::config::Config;
///
/// let json = r#"{
///     "general": { "trace_transactions": true, "trace_capacity": 64 },
///     "memory": {
///         "size": 1024,
///         "read_latency_ns": 3,
///         "write_latency_ns": 7,
///         "fill": 0
///     },
///     "timing": { "quantum_ns": 20 },
///     "bus": { "ports": 4 }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.memory.size, 1024);
/// assert_eq!(config.timing.quantum_ns, 20);
/// assert_eq!(config.timing.max_delta_cycles, 10_000);
/// assert_eq!(config.bus.ports, 4);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory target configuration
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Scheduler and quantum settings
    #[serde(default)]
    pub timing: TimingConfig,
    /// Router configuration
    #[serde(default)]
    pub bus: BusConfig,
    /// Producer/consumer demo parameters
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Config {
    /// Parses and validates a configuration from JSON text.
    ///
    /// # Arguments
    ///
    /// * `json` - JSON document; missing sections and fields take their defaults.
    ///
    /// # Returns
    ///
    /// The validated configuration, or a `ConfigError` describing the first problem found.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks semantic constraints that the type system cannot express.
    ///
    /// The memory size must be a non-zero power of two, the quantum and delta limit must be
    /// non-zero, at least one bus port must exist, a preload image must fit in memory, and
    /// the demo programs must charge time for every instruction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.size == 0 || !self.memory.size.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "memory.size {} is not a non-zero power of two",
                self.memory.size
            )));
        }
        if self.memory.image.len() > self.memory.size {
            return Err(ConfigError::Invalid(format!(
                "memory.image ({} bytes) does not fit in memory.size {}",
                self.memory.image.len(),
                self.memory.size
            )));
        }
        if self.timing.quantum_ns == 0 {
            return Err(ConfigError::Invalid("timing.quantum_ns must be non-zero".into()));
        }
        if self.timing.max_delta_cycles == 0 {
            return Err(ConfigError::Invalid(
                "timing.max_delta_cycles must be non-zero".into(),
            ));
        }
        if self.bus.ports == 0 {
            return Err(ConfigError::Invalid("bus.ports must be at least 1".into()));
        }
        if self.demo.instruction_ns == 0 || self.demo.instructions_per_word == 0 {
            return Err(ConfigError::Invalid(
                "demo.instruction_ns and demo.instructions_per_word must be non-zero".into(),
            ));
        }
        if self.general.trace_transactions && self.general.trace_capacity == 0 {
            return Err(ConfigError::Invalid(
                "general.trace_capacity must be non-zero when tracing is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Returns the configured global quantum.
    pub fn global_quantum(&self) -> Result<GlobalQuantum, SimError> {
        GlobalQuantum::new(SimTime::from_ns(self.timing.quantum_ns))
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Record every completed transaction in the system trace log
    #[serde(default = "GeneralConfig::default_trace_transactions")]
    pub trace_transactions: bool,

    /// Number of events the trace log keeps before dropping the oldest
    #[serde(default = "GeneralConfig::default_trace_capacity")]
    pub trace_capacity: usize,
}

impl GeneralConfig {
    /// Tracing is on unless explicitly disabled.
    fn default_trace_transactions() -> bool {
        true
    }

    /// Returns the default trace ring capacity.
    fn default_trace_capacity() -> usize {
        defaults::TRACE_CAPACITY
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_transactions: true,
            trace_capacity: defaults::TRACE_CAPACITY,
        }
    }
}

/// Memory target configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Memory size in bytes (power of two)
    #[serde(default = "MemoryConfig::default_size")]
    pub size: usize,

    /// Latency charged for a read (ns)
    #[serde(default = "MemoryConfig::default_read_latency")]
    pub read_latency_ns: u64,

    /// Latency charged for a write (ns)
    #[serde(default = "MemoryConfig::default_write_latency")]
    pub write_latency_ns: u64,

    /// Byte every cell holds before the image is loaded
    #[serde(default)]
    pub fill: u8,

    /// Bytes preloaded at address zero
    #[serde(default)]
    pub image: Vec<u8>,
}

impl MemoryConfig {
    /// Returns the default memory size.
    fn default_size() -> usize {
        defaults::MEM_SIZE
    }

    /// Returns the default read latency.
    fn default_read_latency() -> u64 {
        defaults::READ_LATENCY_NS
    }

    /// Returns the default write latency.
    fn default_write_latency() -> u64 {
        defaults::WRITE_LATENCY_NS
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size: defaults::MEM_SIZE,
            read_latency_ns: defaults::READ_LATENCY_NS,
            write_latency_ns: defaults::WRITE_LATENCY_NS,
            fill: 0,
            image: Vec::new(),
        }
    }
}

/// Scheduler and temporal decoupling settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Global quantum shared by every decoupled initiator (ns)
    #[serde(default = "TimingConfig::default_quantum")]
    pub quantum_ns: u64,

    /// Delta cycles allowed at one timestamp before the run fails
    #[serde(default = "TimingConfig::default_max_delta")]
    pub max_delta_cycles: u32,
}

impl TimingConfig {
    /// Returns the default global quantum.
    fn default_quantum() -> u64 {
        defaults::QUANTUM_NS
    }

    /// Returns the default delta-cycle limit.
    fn default_max_delta() -> u32 {
        defaults::MAX_DELTA_CYCLES
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            quantum_ns: defaults::QUANTUM_NS,
            max_delta_cycles: defaults::MAX_DELTA_CYCLES,
        }
    }
}

/// Router configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Number of inbound ports, all bound to the memory target
    #[serde(default = "BusConfig::default_ports")]
    pub ports: usize,
}

impl BusConfig {
    /// Returns the default port count.
    fn default_ports() -> usize {
        defaults::BUS_PORTS
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            ports: defaults::BUS_PORTS,
        }
    }
}

/// Parameters of the two-processor producer/consumer demo.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    /// Time per modeled instruction (ns)
    #[serde(default = "DemoConfig::default_instruction")]
    pub instruction_ns: u64,

    /// Instructions executed to prepare or process one word
    #[serde(default = "DemoConfig::default_instructions_per_word")]
    pub instructions_per_word: u32,

    /// Delay before the consumer starts reading (ns)
    #[serde(default = "DemoConfig::default_consumer_start")]
    pub consumer_start_ns: u64,

    /// First address written by the producer and read by the consumer
    #[serde(default = "DemoConfig::default_base_address")]
    pub base_address: u64,
}

impl DemoConfig {
    /// Returns the default instruction time.
    fn default_instruction() -> u64 {
        defaults::INSTRUCTION_NS
    }

    /// Returns the default instruction count per word.
    fn default_instructions_per_word() -> u32 {
        defaults::INSTRUCTIONS_PER_WORD
    }

    /// Returns the default consumer start delay.
    fn default_consumer_start() -> u64 {
        defaults::CONSUMER_START_NS
    }

    /// Returns the default base address.
    fn default_base_address() -> u64 {
        defaults::DEMO_BASE_ADDRESS
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            instruction_ns: defaults::INSTRUCTION_NS,
            instructions_per_word: defaults::INSTRUCTIONS_PER_WORD,
            consumer_start_ns: defaults::CONSUMER_START_NS,
            base_address: defaults::DEMO_BASE_ADDRESS,
        }
    }
}
