//! Simulation statistics collection and reporting.
//!
//! This module tracks performance counters for the SCore simulator:
//! 1. **Throughput:** cycles, instructions dispatched and retired.
//! 2. **Dispatch denials:** RAW hazards, slot restrictions, per-cycle unit
//!    exclusivity, full input ports, invalid decodes.
//! 3. **Per-unit work:** operation counts for the ALU lanes, BRU, MLU, DVU,
//!    and LSU (loads/stores split).
//! 4. **Soft events:** divisions by zero, bank conflicts, out-of-range
//!    accesses, wire overflow drops, register-port overflows.
//!
//! The core-owned counters live in this struct directly; the per-component
//! counters are folded in when [`ScalarCore::stats`](crate::ScalarCore::stats)
//! assembles a snapshot.

/// Simulation statistics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Core tick cycles completed.
    pub cycles: u64,
    /// Instructions dispatched into functional units.
    pub instructions_dispatched: u64,
    /// Instructions retired (result written back, scoreboard cleared).
    pub instructions_retired: u64,

    /// Dispatch denials: busy source register.
    pub deny_raw_hazard: u64,
    /// Dispatch denials: CSR/FENCE outside slot 0.
    pub deny_special_slot: u64,
    /// Dispatch denials: unit already dispatched this cycle.
    pub deny_unit_busy: u64,
    /// Dispatch denials: unit input port still full.
    pub deny_port_busy: u64,
    /// Dispatch denials: invalid decode at the buffer front.
    pub deny_invalid: u64,

    /// Integer ALU operations executed (all lanes).
    pub alu_ops: u64,
    /// Branch operations resolved.
    pub bru_ops: u64,
    /// Multiplications completed.
    pub mlu_ops: u64,
    /// Divisions completed.
    pub dvu_ops: u64,
    /// LSU loads issued.
    pub lsu_loads: u64,
    /// LSU stores issued.
    pub lsu_stores: u64,

    /// Divisions with a zero divisor (defined-result path).
    pub div_by_zero: u64,
    /// Back-to-back same-bank LSU requests.
    pub bank_conflicts: u64,
    /// LSU accesses outside the bank storage.
    pub lsu_out_of_range: u64,
    /// Packets lost to wire-slot overflow.
    pub wire_drops: u64,
    /// Register reads beyond the declared read ports in one cycle.
    pub regfile_read_overflows: u64,
    /// Register writes beyond the declared write ports in one cycle.
    pub regfile_write_overflows: u64,

    /// Stall cycles across all unit pipelines (by any cause).
    pub pipeline_stalls: u64,
}

/// Section names for selective stats output.
///
/// Valid identifiers: `"summary"`, `"dispatch"`, `"units"`, `"soft"`. Pass
/// an empty slice to [`SimStats::print_sections`] to print everything.
pub const STATS_SECTIONS: &[&str] = &["summary", "dispatch", "units", "soft"];

impl SimStats {
    /// Instructions retired per cycle, or 0 for an idle run.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_retired as f64 / self.cycles as f64
        }
    }

    /// Total dispatch denials across all causes.
    pub fn total_denials(&self) -> u64 {
        self.deny_raw_hazard
            + self.deny_special_slot
            + self.deny_unit_busy
            + self.deny_port_busy
            + self.deny_invalid
    }

    /// Prints every section to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }

    /// Prints the requested sections to stdout; an empty slice prints all.
    pub fn print_sections(&self, sections: &[&str]) {
        let wants = |name: &str| sections.is_empty() || sections.contains(&name);
        if wants("summary") {
            println!("=== Summary ===");
            println!("cycles:                {:>12}", self.cycles);
            println!("dispatched:            {:>12}", self.instructions_dispatched);
            println!("retired:               {:>12}", self.instructions_retired);
            println!("ipc:                   {:>12.3}", self.ipc());
        }
        if wants("dispatch") {
            println!("=== Dispatch ===");
            println!("raw hazard denials:    {:>12}", self.deny_raw_hazard);
            println!("special-slot denials:  {:>12}", self.deny_special_slot);
            println!("unit-busy denials:     {:>12}", self.deny_unit_busy);
            println!("port-busy denials:     {:>12}", self.deny_port_busy);
            println!("invalid denials:       {:>12}", self.deny_invalid);
        }
        if wants("units") {
            println!("=== Units ===");
            println!("alu ops:               {:>12}", self.alu_ops);
            println!("bru ops:               {:>12}", self.bru_ops);
            println!("mlu ops:               {:>12}", self.mlu_ops);
            println!("dvu ops:               {:>12}", self.dvu_ops);
            println!("lsu loads:             {:>12}", self.lsu_loads);
            println!("lsu stores:            {:>12}", self.lsu_stores);
            println!("pipeline stalls:       {:>12}", self.pipeline_stalls);
        }
        if wants("soft") {
            println!("=== Soft events ===");
            println!("div by zero:           {:>12}", self.div_by_zero);
            println!("bank conflicts:        {:>12}", self.bank_conflicts);
            println!("lsu out of range:      {:>12}", self.lsu_out_of_range);
            println!("wire drops:            {:>12}", self.wire_drops);
            println!("read-port overflows:   {:>12}", self.regfile_read_overflows);
            println!("write-port overflows:  {:>12}", self.regfile_write_overflows);
        }
    }
}
