//! Configuration system for the SCore simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! machine. It provides:
//! 1. **Defaults:** baseline hardware constants (lanes, ports, periods,
//!    bank geometry, fabric buffering).
//! 2. **Structures:** hierarchical config for the core, the functional-unit
//!    periods, the LSU banks, and the connection fabric.
//! 3. **Validation:** the misuse-class checks that make a machine
//!    unconstructible (zero lanes, zero periods, zero-capacity buffers).
//!
//! Configuration is supplied as JSON ([`Config::from_json`]) or built in
//! code from `Config::default()`.

use serde::Deserialize;

use crate::common::{Cycle, SimError};

/// Default configuration constants for the simulator.
///
/// These values define the baseline machine when not explicitly overridden.
mod defaults {
    use crate::common::Cycle;

    /// Dispatch lanes (and integer ALU instances).
    pub const NUM_LANES: usize = 2;

    /// Architectural registers.
    pub const NUM_REGISTERS: usize = 32;

    /// Declared register-file read ports.
    pub const NUM_READ_PORTS: usize = 16;

    /// Declared register-file write ports.
    pub const NUM_WRITE_PORTS: usize = 8;

    /// Fetch-buffer depth in instructions.
    pub const FETCH_BUFFER_DEPTH: usize = 8;

    /// First-tick time for every component.
    pub const START_TIME: Cycle = 0;

    /// Integer ALU tick period.
    pub const ALU_PERIOD: Cycle = 1;

    /// Branch unit tick period.
    pub const BRU_PERIOD: Cycle = 1;

    /// Multiplier tick period.
    pub const MLU_PERIOD: Cycle = 3;

    /// Divider tick period.
    pub const DVU_PERIOD: Cycle = 8;

    /// Load/store unit tick period.
    pub const LSU_PERIOD: Cycle = 1;

    /// Register-file tick period (commit boundary).
    pub const REGFILE_PERIOD: Cycle = 1;

    /// Connection tick period.
    pub const WIRE_PERIOD: Cycle = 1;

    /// Connection delivery latency.
    pub const CONNECTION_LATENCY: Cycle = 0;

    /// Ready/valid FIFO capacity.
    pub const BUFFER_SIZE: usize = 2;

    /// LSU interleaved banks.
    pub const NUM_BANKS: usize = 8;

    /// Words per LSU bank.
    pub const BANK_CAPACITY: usize = 1024;

    /// Per-bank access latency in cycles.
    pub const BANK_LATENCY: Cycle = 2;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use scsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.core.num_lanes, 2);
/// assert_eq!(config.lsu.num_banks, 8);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use scsim_core::config::Config;
///
/// let config = Config::from_json(r#"{
///     "core": { "num_lanes": 1, "regfile_forwarding": false },
///     "units": { "mlu_period": 1 },
///     "lsu": { "num_banks": 4 }
/// }"#).unwrap();
/// assert_eq!(config.core.num_lanes, 1);
/// assert_eq!(config.units.mlu_period, 1);
/// assert_eq!(config.lsu.num_banks, 4);
/// assert_eq!(config.fabric.buffer_size, 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Core shape: lanes, registers, ports, fetch depth, start time.
    #[serde(default)]
    pub core: CoreConfig,
    /// Per-component tick periods.
    #[serde(default)]
    pub units: UnitConfig,
    /// LSU bank geometry and timing.
    #[serde(default)]
    pub lsu: LsuConfig,
    /// Connection fabric parameters.
    #[serde(default)]
    pub fabric: FabricConfig,
}

impl Config {
    /// Deserializes a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] when the JSON does not parse.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        serde_json::from_str(json).map_err(|e| SimError::InvalidConfig(e.to_string()))
    }

    /// Checks the misuse-class constraints.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first offending knob.
    pub fn validate(&self) -> Result<(), SimError> {
        fn bad(what: &str) -> Result<(), SimError> {
            Err(SimError::InvalidConfig(format!("{what} must be non-zero")))
        }
        if self.core.num_lanes == 0 {
            return bad("core.num_lanes");
        }
        if self.core.num_registers == 0 {
            return bad("core.num_registers");
        }
        if self.core.fetch_buffer_depth == 0 {
            return bad("core.fetch_buffer_depth");
        }
        if self.units.alu_period == 0
            || self.units.bru_period == 0
            || self.units.mlu_period == 0
            || self.units.dvu_period == 0
            || self.units.lsu_period == 0
            || self.units.regfile_period == 0
        {
            return bad("units.*_period");
        }
        if self.fabric.wire_period == 0 {
            return bad("fabric.wire_period");
        }
        if self.fabric.buffer_size == 0 {
            return bad("fabric.buffer_size");
        }
        if self.lsu.num_banks == 0 {
            return bad("lsu.num_banks");
        }
        if self.lsu.bank_capacity == 0 {
            return bad("lsu.bank_capacity");
        }
        Ok(())
    }
}

/// Core shape: dispatch width, register file, fetch buffer, start time.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Dispatch lanes per cycle (one integer ALU per lane).
    #[serde(default = "CoreConfig::default_num_lanes")]
    pub num_lanes: usize,

    /// Architectural register count.
    #[serde(default = "CoreConfig::default_num_registers")]
    pub num_registers: usize,

    /// Declared register-file read ports (exhaustion counted, not enforced).
    #[serde(default = "CoreConfig::default_num_read_ports")]
    pub num_read_ports: usize,

    /// Declared register-file write ports.
    #[serde(default = "CoreConfig::default_num_write_ports")]
    pub num_write_ports: usize,

    /// Write-through forwarding: a write is visible to a same-cycle read.
    #[serde(default = "CoreConfig::default_regfile_forwarding")]
    pub regfile_forwarding: bool,

    /// Fetch-buffer depth in instructions.
    #[serde(default = "CoreConfig::default_fetch_buffer_depth")]
    pub fetch_buffer_depth: usize,

    /// Cycle at which every component takes its first tick.
    #[serde(default = "CoreConfig::default_start_time")]
    pub start_time: Cycle,
}

impl CoreConfig {
    fn default_num_lanes() -> usize {
        defaults::NUM_LANES
    }
    fn default_num_registers() -> usize {
        defaults::NUM_REGISTERS
    }
    fn default_num_read_ports() -> usize {
        defaults::NUM_READ_PORTS
    }
    fn default_num_write_ports() -> usize {
        defaults::NUM_WRITE_PORTS
    }
    fn default_regfile_forwarding() -> bool {
        true
    }
    fn default_fetch_buffer_depth() -> usize {
        defaults::FETCH_BUFFER_DEPTH
    }
    fn default_start_time() -> Cycle {
        defaults::START_TIME
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            num_lanes: defaults::NUM_LANES,
            num_registers: defaults::NUM_REGISTERS,
            num_read_ports: defaults::NUM_READ_PORTS,
            num_write_ports: defaults::NUM_WRITE_PORTS,
            regfile_forwarding: true,
            fetch_buffer_depth: defaults::FETCH_BUFFER_DEPTH,
            start_time: defaults::START_TIME,
        }
    }
}

/// Per-component tick periods.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    /// Integer ALU period.
    #[serde(default = "UnitConfig::default_alu_period")]
    pub alu_period: Cycle,
    /// Branch unit period.
    #[serde(default = "UnitConfig::default_bru_period")]
    pub bru_period: Cycle,
    /// Multiplier period.
    #[serde(default = "UnitConfig::default_mlu_period")]
    pub mlu_period: Cycle,
    /// Divider period.
    #[serde(default = "UnitConfig::default_dvu_period")]
    pub dvu_period: Cycle,
    /// Load/store unit period.
    #[serde(default = "UnitConfig::default_lsu_period")]
    pub lsu_period: Cycle,
    /// Register-file period (write-commit boundary).
    #[serde(default = "UnitConfig::default_regfile_period")]
    pub regfile_period: Cycle,
}

impl UnitConfig {
    fn default_alu_period() -> Cycle {
        defaults::ALU_PERIOD
    }
    fn default_bru_period() -> Cycle {
        defaults::BRU_PERIOD
    }
    fn default_mlu_period() -> Cycle {
        defaults::MLU_PERIOD
    }
    fn default_dvu_period() -> Cycle {
        defaults::DVU_PERIOD
    }
    fn default_lsu_period() -> Cycle {
        defaults::LSU_PERIOD
    }
    fn default_regfile_period() -> Cycle {
        defaults::REGFILE_PERIOD
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            alu_period: defaults::ALU_PERIOD,
            bru_period: defaults::BRU_PERIOD,
            mlu_period: defaults::MLU_PERIOD,
            dvu_period: defaults::DVU_PERIOD,
            lsu_period: defaults::LSU_PERIOD,
            regfile_period: defaults::REGFILE_PERIOD,
        }
    }
}

/// LSU bank geometry and timing.
#[derive(Debug, Clone, Deserialize)]
pub struct LsuConfig {
    /// Number of interleaved banks.
    #[serde(default = "LsuConfig::default_num_banks")]
    pub num_banks: usize,
    /// Words per bank.
    #[serde(default = "LsuConfig::default_bank_capacity")]
    pub bank_capacity: usize,
    /// Per-bank access latency in cycles.
    #[serde(default = "LsuConfig::default_bank_latency")]
    pub bank_latency: Cycle,
}

impl LsuConfig {
    fn default_num_banks() -> usize {
        defaults::NUM_BANKS
    }
    fn default_bank_capacity() -> usize {
        defaults::BANK_CAPACITY
    }
    fn default_bank_latency() -> Cycle {
        defaults::BANK_LATENCY
    }
}

impl Default for LsuConfig {
    fn default() -> Self {
        Self {
            num_banks: defaults::NUM_BANKS,
            bank_capacity: defaults::BANK_CAPACITY,
            bank_latency: defaults::BANK_LATENCY,
        }
    }
}

/// Connection fabric parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct FabricConfig {
    /// Delivery latency on the writeback wires.
    #[serde(default = "FabricConfig::default_connection_latency")]
    pub connection_latency: Cycle,
    /// Ready/valid FIFO capacity.
    #[serde(default = "FabricConfig::default_buffer_size")]
    pub buffer_size: usize,
    /// Connection tick period.
    #[serde(default = "FabricConfig::default_wire_period")]
    pub wire_period: Cycle,
}

impl FabricConfig {
    fn default_connection_latency() -> Cycle {
        defaults::CONNECTION_LATENCY
    }
    fn default_buffer_size() -> usize {
        defaults::BUFFER_SIZE
    }
    fn default_wire_period() -> Cycle {
        defaults::WIRE_PERIOD
    }
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            connection_latency: defaults::CONNECTION_LATENCY,
            buffer_size: defaults::BUFFER_SIZE,
            wire_period: defaults::WIRE_PERIOD,
        }
    }
}
